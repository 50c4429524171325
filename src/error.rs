//! Error types for Foundry operations.
//!
//! Every failure in a run falls into one of three kinds:
//! - Configuration errors (missing environment variables, unusable settings)
//! - Credential errors (no identity source produced a token)
//! - Request errors (network failures, rejected credentials, non-success
//!   statuses, undecodable payloads)
//!
//! A fourth kind, output errors, covers a report that could not be written.
//!
//! None of them are recovered locally. They travel up to the binary, which
//! prints the message to stderr and exits with [`FoundryError::exit_code`].
//!
//! # Error Handling Example
//!
//! ```rust,no_run
//! use foundry_responses::{FoundryError, error::ErrorKind};
//!
//! fn describe(err: &FoundryError) -> &'static str {
//!     match err.kind() {
//!         ErrorKind::Configuration => "check your environment variables",
//!         ErrorKind::Credential => "sign in with `az login` or configure a service principal",
//!         ErrorKind::Request => "the service rejected or failed the call",
//!         ErrorKind::Output => "stdout is closed",
//!     }
//! }
//! ```

use crate::logging::{log_debug, log_error, log_warn};
use thiserror::Error;

/// The failure families a run can abort with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input was absent or unusable.
    Configuration,
    /// Identity resolution failed.
    Credential,
    /// The remote call failed.
    Request,
    /// The report could not be written.
    Output,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Credential => write!(f, "credential"),
            ErrorKind::Request => write!(f, "request"),
            ErrorKind::Output => write!(f, "output"),
        }
    }
}

/// Convenient result type for Foundry operations.
pub type FoundryResult<T> = std::result::Result<T, FoundryError>;

/// Errors that can occur while configuring, authenticating or calling the service.
///
/// # Creating Errors
///
/// Use the constructor methods which automatically log the error:
///
/// ```rust
/// use foundry_responses::FoundryError;
///
/// let err = FoundryError::configuration_error("AZURE_AI_API_KEY must be set.");
/// let err = FoundryError::response_parsing_error("missing usage");
/// ```
///
/// | Variant | Kind |
/// |---------|------|
/// | `ConfigurationError` | Configuration |
/// | `CredentialError` | Credential |
/// | `RequestFailed` | Request |
/// | `AuthenticationFailed` | Request |
/// | `ResponseParsingError` | Request |
/// | `OutputFailed` | Output |
#[derive(Error, Debug)]
pub enum FoundryError {
    /// Required configuration is missing or invalid.
    #[error("{message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// No credential source could produce a token.
    #[error("Failed to get token: {message}")]
    CredentialError {
        /// Description of what every attempted source reported.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The HTTP call failed or the service answered with a non-success status.
    #[error("Request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The service rejected the credential.
    #[error("Authentication failed ({status}): {message}")]
    AuthenticationFailed {
        /// HTTP status returned by the service.
        status: u16,
        /// Details reported by the service.
        message: String,
    },

    /// The service answered but the body could not be decoded.
    #[error("Response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },

    /// Writing the report to stdout failed.
    #[error("Failed to write output: {source}")]
    OutputFailed {
        #[from]
        source: std::io::Error,
    },
}

impl FoundryError {
    /// Which failure family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationError { .. } => ErrorKind::Configuration,
            Self::CredentialError { .. } => ErrorKind::Credential,
            Self::RequestFailed { .. } => ErrorKind::Request,
            Self::AuthenticationFailed { .. } => ErrorKind::Request,
            Self::ResponseParsingError { .. } => ErrorKind::Request,
            Self::OutputFailed { .. } => ErrorKind::Output,
        }
    }

    /// Process exit code for this error. Every abort exits with 1.
    pub fn exit_code(&self) -> i32 {
        1
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn credential_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "credential_error",
            message = %message,
            has_source = source.is_some(),
            "Credential resolution failed"
        );
        Self::CredentialError { message, source }
    }

    /// One source in a credential chain could not produce a token.
    ///
    /// Logged at DEBUG; the chain reports the aggregate at ERROR.
    pub fn credential_unavailable(source_name: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        log_debug!(
            error_type = "credential_unavailable",
            credential = source_name,
            message = %message,
            "Credential source unavailable"
        );
        Self::CredentialError {
            message,
            source: None,
        }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "Responses request failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn authentication_failed(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "authentication_failed",
            status = status,
            message = %message,
            "Service rejected the credential"
        );
        Self::AuthenticationFailed { status, message }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Response format invalid"
        );
        Self::ResponseParsingError { message }
    }
}
