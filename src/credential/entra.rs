//! Entra ID token endpoint credentials
//!
//! Both credentials here post an OAuth2 client-credentials grant to
//! `{authority}/{tenant}/oauth2/v2.0/token`; they differ only in how the
//! client proves its identity (a secret, or a federated assertion file).

use super::{AccessToken, TokenCredential};
use crate::config::IdentityConfig;
use crate::error::{FoundryError, FoundryResult};
use crate::logging::log_debug;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::fmt::Debug;
use std::path::PathBuf;

const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    )
}

/// Post a token request form and decode the answer.
async fn exchange(
    http: &reqwest::Client,
    source_name: &'static str,
    url: &str,
    form: &[(&str, &str)],
) -> FoundryResult<AccessToken> {
    log_debug!(credential = source_name, url = %url, "Requesting token from Entra ID");

    let response = http.post(url).form(form).send().await.map_err(|e| {
        FoundryError::credential_unavailable(source_name, format!("token request failed: {e}"))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        FoundryError::credential_unavailable(source_name, format!("failed to read token response: {e}"))
    })?;

    if !status.is_success() {
        let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            },
            Err(_) => body,
        };
        return Err(FoundryError::credential_unavailable(
            source_name,
            format!("authentication failed ({status}): {detail}"),
        ));
    }

    let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
        FoundryError::credential_unavailable(source_name, format!("invalid token response: {e}"))
    })?;

    let expires_in = parsed.expires_in.unwrap_or(3600);
    Ok(AccessToken::new(
        parsed.access_token,
        Utc::now() + Duration::seconds(expires_in),
    ))
}

/// Service principal with a client secret, configured through
/// `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`.
pub struct EnvironmentCredential {
    http: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl EnvironmentCredential {
    pub fn new(
        authority_host: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority_host: authority_host.into(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// `None` unless tenant, client id and secret are all configured.
    pub fn from_config(config: &IdentityConfig) -> Option<Self> {
        match (&config.tenant_id, &config.client_id, &config.client_secret) {
            (Some(tenant), Some(client), Some(secret)) => Some(Self::new(
                config.authority_host.clone(),
                tenant.clone(),
                client.clone(),
                secret.clone(),
            )),
            _ => None,
        }
    }
}

impl Debug for EnvironmentCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentCredential")
            .field("authority_host", &self.authority_host)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &'static str {
        "EnvironmentCredential"
    }

    async fn get_token(&self, scope: &str) -> FoundryResult<AccessToken> {
        let url = token_url(&self.authority_host, &self.tenant_id);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];
        exchange(&self.http, self.name(), &url, &form).await
    }
}

/// Federated workload identity (e.g. Kubernetes), configured through
/// `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_FEDERATED_TOKEN_FILE`.
///
/// The assertion file is re-read on every request since it is rotated
/// underneath the process.
#[derive(Debug)]
pub struct WorkloadIdentityCredential {
    http: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    token_file: PathBuf,
}

impl WorkloadIdentityCredential {
    pub fn new(
        authority_host: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        token_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority_host: authority_host.into(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            token_file: token_file.into(),
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Option<Self> {
        match (
            &config.tenant_id,
            &config.client_id,
            &config.federated_token_file,
        ) {
            (Some(tenant), Some(client), Some(file)) => Some(Self::new(
                config.authority_host.clone(),
                tenant.clone(),
                client.clone(),
                file.clone(),
            )),
            _ => None,
        }
    }
}

#[async_trait]
impl TokenCredential for WorkloadIdentityCredential {
    fn name(&self) -> &'static str {
        "WorkloadIdentityCredential"
    }

    async fn get_token(&self, scope: &str) -> FoundryResult<AccessToken> {
        let assertion = tokio::fs::read_to_string(&self.token_file)
            .await
            .map_err(|e| {
                FoundryError::credential_unavailable(
                    self.name(),
                    format!(
                        "failed to read federated token file {}: {e}",
                        self.token_file.display()
                    ),
                )
            })?;

        let url = token_url(&self.authority_host, &self.tenant_id);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_assertion_type", CLIENT_ASSERTION_TYPE),
            ("client_assertion", assertion.trim()),
            ("scope", scope),
        ];
        exchange(&self.http, self.name(), &url, &form).await
    }
}
