//! Helper utilities for llm-routing unit tests
//!
//! Stub data sources and builders shared across the test modules. The
//! catalog and cache are wired against these stubs instead of real
//! registry/filesystem state, so tests inject behavior rather than
//! monkey-patching globals.

use crate::catalog::{CatalogLoad, DiscoveredModel, ModelCatalogEntry, ModelRegistry};
use crate::cache::CatalogLoader;
use crate::error::{RoutingError, RoutingResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted response from the stub registry.
pub enum RegistryOutcome {
    Models(Vec<DiscoveredModel>),
    Failure(String),
}

/// Stub builtin registry driven by a script of outcomes.
///
/// Each `get_all` call consumes the next scripted outcome; once the script
/// is exhausted, calls keep returning the last outcome. A call counter lets
/// tests assert single-flight and retry behavior.
pub struct ScriptedRegistry {
    script: Mutex<VecDeque<RegistryOutcome>>,
    last: Mutex<Option<RegistryOutcome>>,
    calls: AtomicUsize,
}

impl ScriptedRegistry {
    pub fn new(script: Vec<RegistryOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Registry that always returns the same model list.
    pub fn with_models(models: Vec<DiscoveredModel>) -> Self {
        Self::new(vec![RegistryOutcome::Models(models)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> RoutingResult<Vec<DiscoveredModel>> {
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(outcome) = script.pop_front() {
            *last = Some(clone_outcome(&outcome));
            resolve_outcome(&outcome)
        } else if let Some(outcome) = last.as_ref() {
            resolve_outcome(outcome)
        } else {
            Ok(Vec::new())
        }
    }
}

fn clone_outcome(outcome: &RegistryOutcome) -> RegistryOutcome {
    match outcome {
        RegistryOutcome::Models(models) => RegistryOutcome::Models(models.clone()),
        RegistryOutcome::Failure(message) => RegistryOutcome::Failure(message.clone()),
    }
}

fn resolve_outcome(outcome: &RegistryOutcome) -> RoutingResult<Vec<DiscoveredModel>> {
    match outcome {
        RegistryOutcome::Models(models) => Ok(models.clone()),
        RegistryOutcome::Failure(message) => Err(RoutingError::DiscoveryFailed {
            message: message.clone(),
            source: None,
        }),
    }
}

#[async_trait]
impl ModelRegistry for ScriptedRegistry {
    async fn get_all(&self) -> RoutingResult<Vec<DiscoveredModel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.next_outcome()
    }
}

/// Stub catalog loader driven by a script of loads, for cache-level tests
/// that bypass the aggregator.
pub struct ScriptedLoader {
    script: Mutex<VecDeque<CatalogLoad>>,
    last: Mutex<Option<CatalogLoad>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedLoader {
    pub fn new(script: Vec<CatalogLoad>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogLoader for ScriptedLoader {
    async fn load(&self) -> CatalogLoad {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let mut script = self.script.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(load) = script.pop_front() {
            *last = Some(load.clone());
            load
        } else if let Some(load) = last.as_ref() {
            load.clone()
        } else {
            CatalogLoad {
                entries: Vec::new(),
                complete: true,
            }
        }
    }
}

/// Builder for a minimal discovered model record.
pub fn discovered(provider: &str, id: &str) -> DiscoveredModel {
    DiscoveredModel {
        id: id.to_string(),
        name: None,
        provider: provider.to_string(),
        context_window: None,
        reasoning: None,
        input: None,
    }
}

/// Builder for a minimal catalog entry.
pub fn entry(provider: &str, id: &str) -> ModelCatalogEntry {
    ModelCatalogEntry {
        id: id.to_string(),
        name: id.to_string(),
        provider: provider.to_string(),
        context_window: None,
        reasoning: None,
        input: None,
    }
}

/// A complete load carrying the given entries.
pub fn complete_load(entries: Vec<ModelCatalogEntry>) -> CatalogLoad {
    CatalogLoad {
        entries,
        complete: true,
    }
}

/// An incomplete load: a source failed partway through aggregation.
pub fn partial_load(entries: Vec<ModelCatalogEntry>) -> CatalogLoad {
    CatalogLoad {
        entries,
        complete: false,
    }
}
