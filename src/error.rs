//! Error types for routing and catalog operations.
//!
//! This module provides structured error handling for llm-routing operations,
//! including categorization, severity levels, and retry guidance.
//!
//! Policy resolution is total and never produces an error; the variants here
//! cover the catalog side of the crate:
//! - Configuration errors (invalid cache wiring, bad paths)
//! - Discovery failures (builtin model source temporarily unavailable)
//! - Malformed custom-provider documents
//! - Timeouts during catalog resolution
//!
//! # Error Handling Example
//!
//! ```rust,no_run
//! use llm_routing::RoutingError;
//!
//! fn handle_error(err: RoutingError) {
//!     if err.is_retryable() {
//!         println!("Retryable error: {}", err);
//!     }
//!
//!     let user_msg = err.user_message();
//!     println!("Tell user: {}", user_msg);
//! }
//! ```
//!
//! # Result Type
//!
//! Use [`RoutingResult<T>`] as a convenient alias for `Result<T, RoutingError>`:
//!
//! ```rust
//! use llm_routing::RoutingResult;
//!
//! fn my_function() -> RoutingResult<String> {
//!     Ok("Success".to_string())
//! }
//! ```

use crate::logging::{log_debug, log_error, log_warn};
use thiserror::Error;

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
///
/// Use [`RoutingError::category()`] to get the category for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// External data source failures (builtin registry, filesystem).
    ///
    /// The model discovery source had an issue. May be transient or
    /// indicate a broken installation.
    External,

    /// Client errors (invalid input, configuration).
    ///
    /// The caller made a mistake that they can fix (bad path, malformed
    /// custom-provider document, etc.).
    Client,

    /// Temporary failures that should be retried.
    ///
    /// Timeouts and other transient issues. The catalog cache never keeps
    /// a result produced under one of these.
    Transient,
}

/// Severity level for logging and alerting decisions.
///
/// Use [`RoutingError::severity()`] to get the severity for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Action failed but system is stable.
    ///
    /// Should be logged and investigated but not urgent.
    Error,

    /// Unexpected but recoverable situation.
    ///
    /// Worth logging for monitoring but may not require action.
    Warning,

    /// Expected failure (e.g., optional document missing).
    ///
    /// Normal operation, log at info/debug level.
    Info,
}

// ============================================================================
// Routing error types
// ============================================================================

/// Convenient result type for routing operations.
///
/// Alias for `Result<T, RoutingError>`. Use this throughout your application
/// for consistent error handling.
pub type RoutingResult<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur during catalog aggregation and configuration loading.
///
/// Each variant can be:
/// - Categorized via [`category()`](Self::category)
/// - Assessed for severity via [`severity()`](Self::severity)
/// - Checked for retryability via [`is_retryable()`](Self::is_retryable)
/// - Converted to user-friendly messages via [`user_message()`](Self::user_message)
///
/// # Creating Errors
///
/// Use the constructor methods which automatically log the error:
///
/// ```rust
/// use llm_routing::RoutingError;
///
/// let err = RoutingError::configuration_error("Missing models path");
/// let err = RoutingError::timeout(30);
/// ```
///
/// # Error Categories
///
/// | Variant | Category | Retryable |
/// |---------|----------|-----------|
/// | `ConfigurationError` | Client | No |
/// | `DiscoveryFailed` | External | Yes |
/// | `InvalidCustomProviders` | Client | No |
/// | `Timeout` | Transient | Yes |
#[derive(Error, Debug)]
pub enum RoutingError {
    /// Catalog or cache configuration is invalid or incomplete.
    ///
    /// Common causes:
    /// - Missing custom-providers document path
    /// - Cache wired without a loader
    #[error("Routing configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The builtin model discovery source failed.
    ///
    /// This is usually transient (e.g. the registry backing store was being
    /// rewritten by an installer). The catalog cache treats it as retryable
    /// and never keeps a result produced under it.
    #[error("Model discovery failed: {message}")]
    DiscoveryFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The custom-providers document could not be read or parsed.
    ///
    /// The aggregator isolates this failure: the builtin portion of the
    /// catalog is still returned.
    #[error("Invalid custom-providers document: {message}")]
    InvalidCustomProviders {
        /// Details about the read/parse failure.
        message: String,
    },

    /// Catalog resolution timed out.
    ///
    /// Treated as a failure: nothing is cached and the next call retries.
    #[error("Catalog resolution timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout_seconds: u64,
    },
}

impl RoutingError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::DiscoveryFailed { .. } => ErrorCategory::External,
            Self::InvalidCustomProviders { .. } => ErrorCategory::Client,
            Self::Timeout { .. } => ErrorCategory::Transient,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigurationError { .. } => ErrorSeverity::Error,
            Self::DiscoveryFailed { .. } => ErrorSeverity::Warning,
            Self::InvalidCustomProviders { .. } => ErrorSeverity::Info,
            Self::Timeout { .. } => ErrorSeverity::Warning,
        }
    }

    /// Whether this error is transient and should trigger a retry.
    ///
    /// The catalog cache relies on this to decide that a failed load must
    /// not poison subsequent calls.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DiscoveryFailed { .. } | Self::Timeout { .. })
    }

    /// Convert to a user-friendly message suitable for display.
    ///
    /// Returns a message that's safe to show to end users - technical
    /// details and internal information are stripped or generalized.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigurationError { .. } => {
                "Model routing configuration issue. Please check your settings".to_string()
            }
            Self::DiscoveryFailed { .. } => {
                "Unable to discover available models. Please try again".to_string()
            }
            Self::InvalidCustomProviders { .. } => {
                "Your custom provider configuration could not be read".to_string()
            }
            Self::Timeout { .. } => "Model discovery timed out. Please try again".to_string(),
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================
    //
    // These methods automatically log the error at the appropriate level.
    // Use them instead of constructing variants directly.

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Routing configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn discovery_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "discovery_failed",
            message = %message,
            has_source = source.is_some(),
            "Model discovery source failed"
        );
        Self::DiscoveryFailed { message, source }
    }

    pub fn invalid_custom_providers(message: impl Into<String>) -> Self {
        let message = message.into();
        // Custom providers are optional; a missing or malformed document is
        // normal operation, so keep this off the warn path.
        log_debug!(
            error_type = "invalid_custom_providers",
            message = %message,
            "Custom-providers document invalid"
        );
        Self::InvalidCustomProviders { message }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        log_warn!(
            error_type = "timeout",
            timeout_seconds = timeout_seconds,
            "Catalog resolution timed out"
        );
        Self::Timeout { timeout_seconds }
    }
}
