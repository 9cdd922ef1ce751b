//! # llm-routing
//!
//! Transcript policy resolution and model catalog aggregation for
//! heterogeneous LLM backends.
//!
//! ## Key Features
//!
//! - **Transcript Policies**: One declarative record per request describing
//!   how a conversation transcript must be sanitized, repaired, and
//!   validated, with provider quirks handled consistently
//! - **Proxy Awareness**: Claude and Gemini models behind OpenAI-compatible
//!   relays get their family's handling without native-transport rules
//! - **Model Catalog**: Builtin vendor registry merged with user-declared
//!   custom providers, deduplicated and deterministically sorted
//! - **Resilient Caching**: Single-flight catalog resolution that never
//!   caches an empty or failed result
//!
//! ## Example
//!
//! ```rust
//! use llm_routing::{resolve_transcript_policy, SanitizeMode};
//!
//! let policy = resolve_transcript_policy(
//!     Some("openai-completions"),
//!     Some("wisdom-gate"),
//!     Some("claude-opus-4-5"),
//! );
//!
//! // Proxied Claude gets Anthropic-style transcript repair, but no native
//! // turn validation: the relay transport already normalized turn shape.
//! assert_eq!(policy.sanitize_mode, SanitizeMode::Full);
//! assert!(policy.repair_tool_use_result_pairing);
//! assert!(!policy.validate_anthropic_turns);
//! ```
//!
//! This crate never talks to a model provider; it classifies identifiers and
//! shapes configuration data for the layers that do.

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

pub mod cache;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod policy;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use cache::{install_shared_cache, shared_catalog_cache, CatalogCache, CatalogLoader};
pub use catalog::{
    available_model_keys, catalog_key, find_model_in_catalog, model_supports_vision, AuthLookup,
    CatalogLoad, DiscoveredModel, InputModality, ModelCatalogAggregator, ModelCatalogEntry,
    ModelRegistry,
};
pub use classify::{
    classify, classify_with, normalize_provider_id, AntigravityDetector,
    DefaultAntigravityDetector, ModelFamily, ModelTraits, NativeFamily, ProxiedFamily,
};
pub use config::{
    load_custom_providers, CustomModelEntry, CustomProviderEntry, CustomProvidersConfig,
};
pub use error::{RoutingError, RoutingResult};
pub use policy::{
    compose, resolve_transcript_policy, resolve_transcript_policy_with, SanitizeMode,
    ThoughtSignaturePolicy, ToolCallIdMode, TranscriptPolicy,
};
