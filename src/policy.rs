//! Transcript policy composition
//!
//! Combines the classification traits from [`crate::classify`] into an
//! immutable [`TranscriptPolicy`] describing exactly how a conversation
//! transcript must be sanitized, repaired, and validated before being sent
//! to a backend. The policy is a pure function of
//! `(model_api, provider, model_id)` - no hidden state, no ordering
//! dependency on prior calls - so the external transcript sanitizer can
//! resolve it per request without coordination.
//!
//! Precedence, highest first:
//! 1. Native OpenAI suppresses everything down to the minimal policy.
//! 2. Family-driven flags come from the *effective* family (native or
//!    proxied), so a proxied Claude model still gets Anthropic-style repair.
//! 3. Native-only turn ordering/validation never applies to proxied models;
//!    the proxy transport already normalized turn shape.

use crate::classify::{classify, classify_with, AntigravityDetector, ModelTraits};
use serde::{Deserialize, Serialize};

/// Breadth of transcript cleanup applied before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SanitizeMode {
    /// Full sanitization: tool pairing, signatures, ids, turn shape.
    Full,
    /// Only strip image payloads the backend cannot accept.
    ImagesOnly,
}

/// Rewrite format applied when tool-call identifiers must be sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallIdMode {
    /// Alphanumeric ids of bounded length.
    Strict,
    /// Exactly nine alphanumeric characters, required by Mistral backends.
    Strict9,
}

/// Normalization rule for opaque "thought signature" metadata attached to
/// reasoning content by Gemini models behind OpenRouter-style relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtSignaturePolicy {
    /// Drop signatures that are not valid base64.
    pub allow_base64_only: bool,
    /// Also normalize the camelCase field spelling some relays emit.
    pub include_camel_case: bool,
}

/// Declarative per-request transcript handling policy.
///
/// Consumed by an external transcript-sanitization collaborator that must
/// honor every field. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptPolicy {
    /// Breadth of transcript cleanup applied.
    pub sanitize_mode: SanitizeMode,
    /// Whether tool-call identifiers must be rewritten.
    pub sanitize_tool_call_ids: bool,
    /// Rewrite format when `sanitize_tool_call_ids` is set.
    pub tool_call_id_mode: Option<ToolCallIdMode>,
    /// Whether orphaned tool-call/tool-result pairs are reconciled.
    pub repair_tool_use_result_pairing: bool,
    /// Whether opaque provider signature blocks must be kept verbatim.
    pub preserve_signatures: bool,
    /// Normalization rule for thought-signature metadata, when needed.
    pub sanitize_thought_signatures: Option<ThoughtSignaturePolicy>,
    /// Special-case thinking-block normalization for the antigravity Claude
    /// access variant.
    pub normalize_antigravity_thinking_blocks: bool,
    /// Reorder turns per Google's native turn convention.
    pub apply_google_turn_ordering: bool,
    /// Enforce Gemini native turn-shape invariants.
    pub validate_gemini_turns: bool,
    /// Enforce Anthropic native turn-shape invariants.
    pub validate_anthropic_turns: bool,
    /// Permit inserting synthetic tool-result entries to satisfy pairing.
    pub allow_synthetic_tool_results: bool,
}

/// Compose the transcript policy for a classified backend.
///
/// Total and side-effect-free; see the module docs for precedence.
pub fn compose(traits: &ModelTraits) -> TranscriptPolicy {
    let effective_anthropic = traits.effective_anthropic();
    let effective_google = traits.effective_google();

    let needs_non_image_sanitize = effective_google
        || effective_anthropic
        || traits.is_mistral
        || traits.is_openrouter_gemini;

    let sanitize_tool_call_ids = effective_google || traits.is_mistral;
    let tool_call_id_mode = if traits.is_mistral {
        Some(ToolCallIdMode::Strict9)
    } else if sanitize_tool_call_ids {
        Some(ToolCallIdMode::Strict)
    } else {
        None
    };

    // Tool use/result pairing repairs for Claude and Gemini models, native
    // or proxied.
    let repair_tool_use_result_pairing = effective_google || effective_anthropic;

    let sanitize_thought_signatures = if traits.is_openrouter_gemini || traits.is_proxied_gemini {
        Some(ThoughtSignaturePolicy {
            allow_base64_only: true,
            include_camel_case: true,
        })
    } else {
        None
    };

    // The single override point: native OpenAI zeroes out the flags computed
    // above instead of skipping their computation, so this stays one visible
    // branch rather than scattered conditionals.
    let is_native_openai =
        traits.is_openai && !traits.is_proxied_claude && !traits.is_proxied_gemini;

    TranscriptPolicy {
        sanitize_mode: if !is_native_openai && needs_non_image_sanitize {
            SanitizeMode::Full
        } else {
            SanitizeMode::ImagesOnly
        },
        sanitize_tool_call_ids: !is_native_openai && sanitize_tool_call_ids,
        tool_call_id_mode,
        repair_tool_use_result_pairing: !is_native_openai && repair_tool_use_result_pairing,
        preserve_signatures: traits.is_antigravity_claude,
        sanitize_thought_signatures: if is_native_openai {
            None
        } else {
            sanitize_thought_signatures
        },
        normalize_antigravity_thinking_blocks: traits.is_antigravity_claude,
        // Turn ordering/validation only applies to the native transports.
        // Proxied models use OpenAI transport format which handles turn
        // ordering differently.
        apply_google_turn_ordering: !traits.is_openai && traits.is_google,
        validate_gemini_turns: !traits.is_openai && traits.is_google,
        validate_anthropic_turns: !traits.is_openai && traits.is_anthropic,
        allow_synthetic_tool_results: !is_native_openai
            && (effective_google || effective_anthropic),
    }
}

/// Resolve the transcript policy for a raw backend triple.
///
/// Classification plus composition with the default antigravity detector.
/// Never fails: unclassifiable input yields the minimal policy.
pub fn resolve_transcript_policy(
    model_api: Option<&str>,
    provider: Option<&str>,
    model_id: Option<&str>,
) -> TranscriptPolicy {
    compose(&classify(model_api, provider, model_id))
}

/// [`resolve_transcript_policy`] with a caller-supplied antigravity detector.
pub fn resolve_transcript_policy_with(
    detector: &dyn AntigravityDetector,
    model_api: Option<&str>,
    provider: Option<&str>,
    model_id: Option<&str>,
) -> TranscriptPolicy {
    compose(&classify_with(detector, model_api, provider, model_id))
}
