//! Credential resolution
//!
//! Two ways to authorise a run, selected once at startup:
//!
//! - **static**: a pre-supplied API key passed through unchanged
//! - **entra**: a bearer token for a fixed scope, obtained from the first
//!   Entra ID source in [`DefaultAzureCredential`] that can produce one
//!
//! ```text
//! CredentialSource ── Static(StaticKeyCredential) ──────────────► Credential::ApiKey
//!                  └─ Entra { TokenCredential, scope } ─────────► Credential::Bearer
//!                                 │
//!            DefaultAzureCredential: Environment → WorkloadIdentity
//!                                    → ManagedIdentity → AzureCli
//! ```

pub mod azure_cli;
pub mod chain;
pub mod entra;
pub mod managed_identity;
pub mod static_key;

pub use azure_cli::AzureCliCredential;
pub use chain::DefaultAzureCredential;
pub use entra::{EnvironmentCredential, WorkloadIdentityCredential};
pub use managed_identity::ManagedIdentityCredential;
pub use static_key::StaticKeyCredential;

use crate::error::FoundryResult;
use crate::logging::log_debug;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// A short-lived bearer token and the instant it stops being valid.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_on <= Utc::now()
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// The secret presented to the inference service.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Static key from the environment.
    ApiKey(String),
    /// Entra ID access token.
    Bearer(AccessToken),
}

impl Credential {
    /// The string placed after `Bearer ` in the authorization header.
    pub fn secret(&self) -> &str {
        match self {
            Credential::ApiKey(key) => key,
            Credential::Bearer(token) => &token.token,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api_key",
            Credential::Bearer(_) => "bearer",
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Credential::Bearer(token) => f.debug_tuple("Bearer").field(token).finish(),
        }
    }
}

/// An identity source able to mint a token for one scope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Source name used in logs and chained error messages.
    fn name(&self) -> &'static str;

    /// Request a token for `scope` (e.g. `https://ai.azure.com/.default`).
    async fn get_token(&self, scope: &str) -> FoundryResult<AccessToken>;
}

/// The credential pathway chosen for a run.
pub enum CredentialSource {
    Static(StaticKeyCredential),
    Entra {
        credential: Box<dyn TokenCredential>,
        scope: String,
    },
}

impl CredentialSource {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::Static(StaticKeyCredential::new(key))
    }

    pub fn entra(credential: Box<dyn TokenCredential>, scope: impl Into<String>) -> Self {
        Self::Entra {
            credential,
            scope: scope.into(),
        }
    }

    /// Produce the credential for this run. Only the Entra pathway does I/O.
    pub async fn resolve(&self) -> FoundryResult<Credential> {
        match self {
            Self::Static(key) => Ok(key.credential()),
            Self::Entra { credential, scope } => {
                log_debug!(source = credential.name(), scope = %scope, "Requesting access token");
                let token = credential.get_token(scope).await?;
                log_debug!(
                    source = credential.name(),
                    expires_on = %token.expires_on,
                    "Access token acquired"
                );
                Ok(Credential::Bearer(token))
            }
        }
    }
}

impl Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(key) => f.debug_tuple("Static").field(key).finish(),
            Self::Entra { credential, scope } => f
                .debug_struct("Entra")
                .field("credential", &credential.name())
                .field("scope", scope)
                .finish(),
        }
    }
}

/// `https://ai.azure.com/.default` → `https://ai.azure.com`
///
/// Managed identity endpoints take a resource rather than a scope.
pub(crate) fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}
