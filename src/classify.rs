//! Provider and model-family classification
//!
//! Maps raw backend identifiers (transport API name, provider name, model id)
//! onto a set of traits describing which model family is actually behind the
//! wire. Backends differ along three independent axes:
//!
//! - the wire-level transport API (messages-style vs. completions-style)
//! - the underlying model family (Anthropic, Google, Mistral, generic)
//! - the routing path (native vendor endpoint vs. an OpenAI-compatible proxy)
//!
//! Classification is total and side-effect-free: absent or empty identifiers
//! simply never match a hint. The resulting [`ModelTraits`] is consumed by
//! the policy composer in [`crate::policy`].

use std::fmt::Debug;

/// Model-id substrings that identify Mistral-family models even behind
/// generic providers.
const MISTRAL_MODEL_HINTS: &[&str] = &[
    "mistral",
    "mixtral",
    "codestral",
    "pixtral",
    "devstral",
    "ministral",
    "mistralai",
];

// Hints to detect Claude models even when accessed via OpenAI-compatible APIs
// (e.g., Wisdom Gate, OpenRouter).
const CLAUDE_MODEL_HINTS: &[&str] = &["claude", "anthropic", "opus", "sonnet", "haiku"];

// Hints to detect Gemini models even when accessed via OpenAI-compatible APIs.
const GEMINI_MODEL_HINTS: &[&str] = &["gemini"];

const OPENAI_MODEL_APIS: &[&str] = &[
    "openai",
    "openai-completions",
    "openai-responses",
    "openai-codex-responses",
];

const OPENAI_PROVIDERS: &[&str] = &["openai", "openai-codex"];

const GOOGLE_MODEL_APIS: &[&str] = &["google-generative-ai", "google-antigravity"];

/// Providers that proxy multiple model families and should use model-based
/// policy detection. Matched by prefix so suffixed variants like
/// "wisdom-gate-claude" are covered.
const PROXY_PROVIDER_PREFIXES: &[&str] =
    &["wisdom-gate", "openrouter", "opencode", "lmstudio", "ollama"];

/// Multi-model relays whose Gemini routes need thought-signature
/// normalization on top of the generic proxy handling.
const OPENROUTER_STYLE_PROVIDERS: &[&str] = &["openrouter", "opencode"];

/// Normalize a provider identifier for comparison: case-fold and trim.
///
/// Every provider comparison in this module goes through this first, so
/// `" OpenRouter "` and `"openrouter"` classify identically.
pub fn normalize_provider_id(provider: &str) -> String {
    provider.trim().to_lowercase()
}

fn contains_hint(model_id: &str, hints: &[&str]) -> bool {
    if model_id.is_empty() {
        return false;
    }
    hints.iter().any(|hint| model_id.contains(hint))
}

/// Native model family behind a directly-accessed vendor endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFamily {
    Anthropic,
    Google,
    OpenAi,
    Other,
}

/// Underlying model family behind an OpenAI-compatible proxy/relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxiedFamily {
    Claude,
    Gemini,
    Other,
}

/// Closed classification of how a request reaches its model family.
///
/// Computed once by [`classify`] and consumed exhaustively by the policy
/// composer, so adding a new proxy or family forces every consumer to
/// handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Backend accessed directly through its own transport API.
    Native(NativeFamily),
    /// Backend reached through an OpenAI-compatible relay that forwards to
    /// a different underlying family.
    Proxied(ProxiedFamily),
}

impl ModelFamily {
    /// Whether transcripts for this family need Anthropic-style handling
    /// (tool use/result pairing, synthetic tool results).
    pub fn anthropic_style(&self) -> bool {
        matches!(
            self,
            Self::Native(NativeFamily::Anthropic) | Self::Proxied(ProxiedFamily::Claude)
        )
    }

    /// Whether transcripts for this family need Google-style handling
    /// (tool-call id rewriting, pairing repair).
    pub fn google_style(&self) -> bool {
        matches!(
            self,
            Self::Native(NativeFamily::Google) | Self::Proxied(ProxiedFamily::Gemini)
        )
    }
}

/// Classification traits for a `(model_api, provider, model_id)` triple.
///
/// Derived fresh per call; never cached (cheap, deterministic,
/// order-independent). The individual booleans preserve the full
/// transport/provider matrix; [`ModelTraits::family`] is the collapsed
/// tagged view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelTraits {
    /// Transport API is the native Google transport.
    pub is_google: bool,
    /// Native Anthropic transport, or the Anthropic provider id routed
    /// through another transport field.
    pub is_anthropic: bool,
    /// Native OpenAI provider, or no provider with an OpenAI-compatible
    /// transport API.
    pub is_openai: bool,
    /// Mistral provider or a Mistral-family model id hint.
    pub is_mistral: bool,
    /// Claude model reached through a proxy/relay provider.
    pub is_proxied_claude: bool,
    /// Gemini model reached through a proxy/relay provider.
    pub is_proxied_gemini: bool,
    /// Gemini model on one of the OpenRouter-style relays specifically.
    pub is_openrouter_gemini: bool,
    /// Claude access variant that requires signature preservation.
    pub is_antigravity_claude: bool,
    /// Collapsed family classification, Proxied detection takes precedence.
    pub family: ModelFamily,
}

impl ModelTraits {
    /// Anthropic-style handling applies: native Anthropic or proxied Claude.
    pub fn effective_anthropic(&self) -> bool {
        self.is_anthropic || self.is_proxied_claude
    }

    /// Google-style handling applies: native Google or proxied Gemini.
    pub fn effective_google(&self) -> bool {
        self.is_google || self.is_proxied_gemini
    }
}

/// Detector for the antigravity Claude access variant.
///
/// The exact heuristic is access-channel specific, so callers that front a
/// different channel can inject their own implementation via
/// [`classify_with`]. The shipped [`DefaultAntigravityDetector`] covers the
/// Google antigravity transport.
pub trait AntigravityDetector: Send + Sync + Debug {
    /// Whether the triple identifies a Claude model served through the
    /// antigravity channel.
    fn is_antigravity_claude(
        &self,
        model_api: Option<&str>,
        provider: &str,
        model_id: &str,
    ) -> bool;
}

/// Default antigravity detection: the antigravity transport or a provider id
/// carrying the antigravity marker, with a Claude model hint.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAntigravityDetector;

impl AntigravityDetector for DefaultAntigravityDetector {
    fn is_antigravity_claude(
        &self,
        model_api: Option<&str>,
        provider: &str,
        model_id: &str,
    ) -> bool {
        let channel_match =
            model_api == Some("google-antigravity") || provider.contains("antigravity");
        channel_match && contains_hint(&model_id.to_lowercase(), CLAUDE_MODEL_HINTS)
    }
}

fn is_openai_api(model_api: Option<&str>) -> bool {
    match model_api {
        Some(api) => OPENAI_MODEL_APIS.contains(&api),
        None => false,
    }
}

fn is_google_model_api(model_api: Option<&str>) -> bool {
    match model_api {
        Some(api) => GOOGLE_MODEL_APIS.contains(&api),
        None => false,
    }
}

fn is_openai_provider(provider: &str) -> bool {
    OPENAI_PROVIDERS.contains(&provider)
}

fn is_proxy_provider(provider: &str) -> bool {
    if provider.is_empty() {
        return false;
    }
    // Prefix matching handles variants like "wisdom-gate-claude".
    PROXY_PROVIDER_PREFIXES
        .iter()
        .any(|prefix| provider.starts_with(prefix))
}

fn is_anthropic_api(model_api: Option<&str>, provider: &str) -> bool {
    if model_api == Some("anthropic-messages") {
        return true;
    }
    // Some integrations route native Anthropic calls through an OpenAI-named
    // transport field before this layer runs; the provider id still marks
    // them as native Anthropic.
    provider == "anthropic"
}

fn is_mistral_model(provider: &str, model_id: &str) -> bool {
    if provider == "mistral" {
        return true;
    }
    contains_hint(model_id, MISTRAL_MODEL_HINTS)
}

/// Classify a backend triple using the default antigravity detector.
///
/// Total over its input domain: absent or empty identifiers are treated as
/// non-matching at every hint comparison.
pub fn classify(
    model_api: Option<&str>,
    provider: Option<&str>,
    model_id: Option<&str>,
) -> ModelTraits {
    classify_with(&DefaultAntigravityDetector, model_api, provider, model_id)
}

/// Classify a backend triple with a caller-supplied antigravity detector.
pub fn classify_with(
    detector: &dyn AntigravityDetector,
    model_api: Option<&str>,
    provider: Option<&str>,
    model_id: Option<&str>,
) -> ModelTraits {
    let raw_provider = provider.unwrap_or("");
    let provider = normalize_provider_id(raw_provider);
    let model_id_lower = model_id.unwrap_or("").to_lowercase();

    let is_google = is_google_model_api(model_api);
    let is_anthropic = is_anthropic_api(model_api, &provider);
    let is_openai =
        is_openai_provider(&provider) || (provider.is_empty() && is_openai_api(model_api));
    let is_mistral = is_mistral_model(&provider, &model_id_lower);

    // Proxied models keep an OpenAI-compatible transport but forward to a
    // different underlying family, so detection rests on the model id.
    let proxy_routed = is_proxy_provider(&provider);
    let is_proxied_claude = proxy_routed && contains_hint(&model_id_lower, CLAUDE_MODEL_HINTS);
    let is_proxied_gemini = proxy_routed && contains_hint(&model_id_lower, GEMINI_MODEL_HINTS);

    let is_openrouter_gemini = OPENROUTER_STYLE_PROVIDERS.contains(&provider.as_str())
        && model_id_lower.contains("gemini");

    let is_antigravity_claude =
        detector.is_antigravity_claude(model_api, &provider, &model_id_lower);

    // Proxied detection takes precedence over native when collapsing to
    // the tagged family.
    let family = if is_proxied_claude {
        ModelFamily::Proxied(ProxiedFamily::Claude)
    } else if is_proxied_gemini {
        ModelFamily::Proxied(ProxiedFamily::Gemini)
    } else if is_anthropic {
        ModelFamily::Native(NativeFamily::Anthropic)
    } else if is_google {
        ModelFamily::Native(NativeFamily::Google)
    } else if is_openai {
        ModelFamily::Native(NativeFamily::OpenAi)
    } else if proxy_routed {
        ModelFamily::Proxied(ProxiedFamily::Other)
    } else {
        ModelFamily::Native(NativeFamily::Other)
    };

    ModelTraits {
        is_google,
        is_anthropic,
        is_openai,
        is_mistral,
        is_proxied_claude,
        is_proxied_gemini,
        is_openrouter_gemini,
        is_antigravity_claude,
        family,
    }
}
