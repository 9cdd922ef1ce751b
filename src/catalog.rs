//! Model catalog aggregation
//!
//! Builds the list of models available to the system by merging a builtin
//! vendor registry with user-declared custom providers, deduplicating by a
//! normalized `(provider, id)` key and producing a deterministically sorted
//! list. Aggregation fails soft: a discovery failure yields whatever was
//! collected (logged once per aggregator), and a malformed custom-providers
//! document is ignored entirely.
//!
//! This module never performs network calls; the registry trait is a pure
//! data source and the only filesystem access is reading the
//! custom-providers document.

use crate::config::load_custom_providers;
use crate::error::RoutingResult;
use crate::logging::{log_debug, log_warn};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Input modality a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputModality {
    Text,
    Image,
}

/// One entry in the aggregated model catalog.
///
/// Identity is `(provider, id)`, case-insensitively normalized; unique
/// within a catalog. Immutable once produced - a fresh entry list is built
/// on every successful aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCatalogEntry {
    pub id: String,
    pub name: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<InputModality>>,
}

impl ModelCatalogEntry {
    /// Lowercase `provider/id` deduplication key.
    pub fn key(&self) -> String {
        catalog_key(&self.provider, &self.id)
    }
}

/// Build the lowercase `provider/id` key used for deduplication and
/// availability lookups.
pub fn catalog_key(provider: &str, model_id: &str) -> String {
    format!("{}/{}", provider, model_id).to_lowercase()
}

/// Raw model record as exposed by the builtin registry.
///
/// Fields are lenient; the aggregator skips records it cannot use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredModel {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<InputModality>>,
}

/// Builtin model registry data source.
///
/// Constructed on demand by its implementation and consulted fresh on every
/// aggregation, so a transient failure is never memoized.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// All builtin models known to the vendor catalog.
    async fn get_all(&self) -> RoutingResult<Vec<DiscoveredModel>>;
}

/// Credential lookup collaborator keyed by provider name.
///
/// Implemented by the external auth layer; the catalog only asks whether a
/// provider has credentials configured.
pub trait AuthLookup: Send + Sync {
    fn has_credentials(&self, provider: &str) -> bool;
}

/// Result of one aggregation pass.
///
/// `complete` is false when the builtin source failed partway; the catalog
/// cache returns such a load to callers but never keeps it.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub entries: Vec<ModelCatalogEntry>,
    pub complete: bool,
}

/// Merges the builtin registry with custom-provider declarations.
pub struct ModelCatalogAggregator {
    registry: Arc<dyn ModelRegistry>,
    custom_providers_path: Option<PathBuf>,
    // One diagnostic per aggregator lifetime; resolutions are frequent and a
    // broken install would otherwise flood the log.
    logged_discovery_error: AtomicBool,
}

impl ModelCatalogAggregator {
    pub fn new(registry: Arc<dyn ModelRegistry>, custom_providers_path: Option<PathBuf>) -> Self {
        Self {
            registry,
            custom_providers_path,
            logged_discovery_error: AtomicBool::new(false),
        }
    }

    /// Run one aggregation pass over both sources.
    ///
    /// Sources are consulted sequentially because the custom-provider merge
    /// must see the deduplication set built from the builtin list. Never
    /// returns an error; failures degrade to a partial (possibly empty)
    /// incomplete load.
    pub async fn aggregate(&self) -> CatalogLoad {
        let mut models: Vec<ModelCatalogEntry> = Vec::new();

        let discovered = match self.registry.get_all().await {
            Ok(discovered) => discovered,
            Err(error) => {
                if !self.logged_discovery_error.swap(true, Ordering::Relaxed) {
                    log_warn!(
                        error = %error,
                        "Failed to load model catalog from builtin registry"
                    );
                }
                return CatalogLoad {
                    entries: sort_catalog(models),
                    complete: false,
                };
            }
        };

        for entry in discovered {
            let id = entry.id.trim();
            if id.is_empty() {
                continue;
            }
            let provider = entry.provider.trim();
            if provider.is_empty() {
                continue;
            }
            let name = normalize_name(entry.name.as_deref(), id);
            models.push(ModelCatalogEntry {
                id: id.to_string(),
                name,
                provider: provider.to_string(),
                context_window: positive_context_window(entry.context_window),
                reasoning: entry.reasoning,
                input: entry.input,
            });
        }

        // Custom providers supplement the builtin catalog; the builtin entry
        // wins on a (provider, id) collision.
        let mut existing_keys: HashSet<String> = models.iter().map(ModelCatalogEntry::key).collect();
        if let Some(path) = &self.custom_providers_path {
            match load_custom_providers(path).await {
                Ok(config) => {
                    for (provider_name, provider_config) in &config.providers {
                        for model in &provider_config.models {
                            let model_id = model.id.as_deref().unwrap_or("").trim();
                            if model_id.is_empty() {
                                continue;
                            }
                            let key = catalog_key(provider_name, model_id);
                            if !existing_keys.insert(key) {
                                continue;
                            }
                            models.push(ModelCatalogEntry {
                                id: model_id.to_string(),
                                name: normalize_name(model.name.as_deref(), model_id),
                                provider: provider_name.clone(),
                                context_window: positive_context_window(model.context_window),
                                reasoning: model.reasoning,
                                input: model.input.clone(),
                            });
                        }
                    }
                }
                Err(_) => {
                    // Custom providers are optional; the builtin portion of
                    // the catalog is still returned.
                }
            }
        }

        let entries = sort_catalog(models);
        log_debug!(model_count = entries.len(), "Model catalog aggregated");
        CatalogLoad {
            entries,
            complete: true,
        }
    }
}

fn normalize_name(name: Option<&str>, id: &str) -> String {
    let trimmed = name.unwrap_or(id).trim();
    if trimmed.is_empty() {
        id.to_string()
    } else {
        trimmed.to_string()
    }
}

fn positive_context_window(raw: Option<i64>) -> Option<u32> {
    match raw {
        Some(value) if value > 0 => u32::try_from(value).ok(),
        _ => None,
    }
}

/// Sort by provider name, then by model name, case-insensitively.
///
/// Ordering is a presentation contract: stable and deterministic for
/// identical inputs regardless of input order.
fn sort_catalog(mut entries: Vec<ModelCatalogEntry>) -> Vec<ModelCatalogEntry> {
    entries.sort_by(|a, b| {
        let provider_order = a.provider.to_lowercase().cmp(&b.provider.to_lowercase());
        provider_order.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    entries
}

/// Find a model in the catalog by provider and model ID.
///
/// Case-insensitive exact match on both fields.
pub fn find_model_in_catalog<'a>(
    catalog: &'a [ModelCatalogEntry],
    provider: &str,
    model_id: &str,
) -> Option<&'a ModelCatalogEntry> {
    let normalized_provider = provider.trim().to_lowercase();
    let normalized_model_id = model_id.trim().to_lowercase();
    catalog.iter().find(|entry| {
        entry.provider.to_lowercase() == normalized_provider
            && entry.id.to_lowercase() == normalized_model_id
    })
}

/// Check if a model supports image input based on its catalog entry.
pub fn model_supports_vision(entry: Option<&ModelCatalogEntry>) -> bool {
    entry
        .and_then(|e| e.input.as_ref())
        .is_some_and(|input| input.contains(&InputModality::Image))
}

/// Keys of catalog entries whose provider has credentials configured.
///
/// Membership-testable with [`catalog_key`].
pub fn available_model_keys(
    catalog: &[ModelCatalogEntry],
    auth: &dyn AuthLookup,
) -> HashSet<String> {
    catalog
        .iter()
        .filter(|entry| auth.has_credentials(&entry.provider))
        .map(ModelCatalogEntry::key)
        .collect()
}
