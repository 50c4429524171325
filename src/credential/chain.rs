//! Ordered chain of Entra ID credential sources

use super::{
    AccessToken, AzureCliCredential, EnvironmentCredential, ManagedIdentityCredential,
    TokenCredential, WorkloadIdentityCredential,
};
use crate::config::IdentityConfig;
use crate::error::{FoundryError, FoundryResult};
use crate::logging::{log_debug, log_info};
use async_trait::async_trait;
use std::fmt::Debug;

/// Tries each source in order and returns the first token obtained.
///
/// Sources whose inputs are missing from [`IdentityConfig`] are left out of
/// the chain entirely rather than attempted.
pub struct DefaultAzureCredential {
    sources: Vec<Box<dyn TokenCredential>>,
}

impl DefaultAzureCredential {
    /// Environment → WorkloadIdentity → ManagedIdentity → AzureCli
    pub fn new(config: &IdentityConfig) -> Self {
        let mut sources: Vec<Box<dyn TokenCredential>> = Vec::new();

        if let Some(credential) = EnvironmentCredential::from_config(config) {
            sources.push(Box::new(credential));
        }
        if let Some(credential) = WorkloadIdentityCredential::from_config(config) {
            sources.push(Box::new(credential));
        }
        sources.push(Box::new(ManagedIdentityCredential::from_config(config)));
        sources.push(Box::new(
            AzureCliCredential::new().with_tenant(config.tenant_id.clone()),
        ));

        let chain = Self::with_sources(sources);
        log_debug!(sources = ?chain.source_names(), "Credential chain assembled");
        chain
    }

    pub fn with_sources(sources: Vec<Box<dyn TokenCredential>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }
}

impl Debug for DefaultAzureCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultAzureCredential")
            .field("sources", &self.source_names())
            .finish()
    }
}

#[async_trait]
impl TokenCredential for DefaultAzureCredential {
    fn name(&self) -> &'static str {
        "DefaultAzureCredential"
    }

    async fn get_token(&self, scope: &str) -> FoundryResult<AccessToken> {
        if self.sources.is_empty() {
            return Err(FoundryError::credential_error(
                "DefaultAzureCredential has no credential sources configured",
                None,
            ));
        }

        let mut failures = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.get_token(scope).await {
                Ok(token) => {
                    log_info!(credential = source.name(), "Acquired access token");
                    return Ok(token);
                }
                Err(FoundryError::CredentialError { message, .. }) => {
                    failures.push(format!("{}: {}", source.name(), message));
                }
                Err(other) => {
                    failures.push(format!("{}: {}", source.name(), other));
                }
            }
        }

        Err(FoundryError::credential_error(
            format!(
                "DefaultAzureCredential failed to retrieve a token from the included credentials.\n  - {}",
                failures.join("\n  - ")
            ),
            None,
        ))
    }
}
