//! Custom-provider configuration document
//!
//! User-declared providers and models live in a persisted JSON document with
//! the shape:
//!
//! ```json
//! {
//!   "providers": {
//!     "wisdom-gate": {
//!       "baseUrl": "https://api.example.com/v1",
//!       "models": [
//!         { "id": "claude-opus-4-5", "name": "Claude Opus", "contextWindow": 200000 }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Parsing is deliberately lenient - the document is hand-edited, so every
//! field is optional and unknown fields are ignored. The catalog aggregator
//! skips entries it cannot use rather than failing the whole load.

use crate::catalog::InputModality;
use crate::error::{RoutingError, RoutingResult};
use crate::logging::log_debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Root of the custom-providers document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomProvidersConfig {
    /// Provider name to declaration. A `BTreeMap` keeps iteration order
    /// deterministic for identical documents.
    #[serde(default)]
    pub providers: BTreeMap<String, CustomProviderEntry>,
}

/// A single user-declared provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProviderEntry {
    /// Endpoint override for this provider, unused by the catalog itself
    /// but carried for the request-sending collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Models served by this provider.
    #[serde(default)]
    pub models: Vec<CustomModelEntry>,
}

/// A model declared under a custom provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomModelEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<InputModality>>,
}

/// Load and parse the custom-providers document at `path`.
///
/// # Errors
///
/// Returns [`RoutingError::InvalidCustomProviders`] if the file cannot be
/// read or does not parse as the expected schema. The aggregator treats
/// either case as "no custom providers" rather than a hard failure.
pub async fn load_custom_providers(path: &Path) -> RoutingResult<CustomProvidersConfig> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        RoutingError::invalid_custom_providers(format!(
            "failed to read {}: {}",
            path.display(),
            e
        ))
    })?;

    let config: CustomProvidersConfig = serde_json::from_str(&raw).map_err(|e| {
        RoutingError::invalid_custom_providers(format!(
            "failed to parse {}: {}",
            path.display(),
            e
        ))
    })?;

    log_debug!(
        path = %path.display(),
        provider_count = config.providers.len(),
        "Loaded custom-providers document"
    );

    Ok(config)
}
