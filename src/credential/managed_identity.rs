//! Managed identity on Azure hosts
//!
//! App Service, Functions and Container Apps expose `IDENTITY_ENDPOINT` and
//! `IDENTITY_HEADER`; virtual machines expose the instance metadata service
//! (IMDS) at a fixed link-local address instead.

use super::{scope_to_resource, AccessToken, TokenCredential};
use crate::config::IdentityConfig;
use crate::error::{FoundryError, FoundryResult};
use crate::logging::{log_debug, log_warn};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::HeaderValue;
use serde::Deserialize;
use std::fmt::Debug;

pub const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

/// Hosts without IMDS drop the connection silently; give up quickly so the
/// chain can reach the Azure CLI.
const IMDS_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);

/// Upper bound for a whole IMDS request, for hosts that accept the
/// connection but never answer.
pub const IMDS_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(3);

/// Where the managed identity token comes from.
#[derive(Clone)]
pub enum ManagedIdentityEndpoint {
    AppService { endpoint: String, header: String },
    Imds { endpoint: String },
}

impl Debug for ManagedIdentityEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AppService { endpoint, .. } => f
                .debug_struct("AppService")
                .field("endpoint", endpoint)
                .finish_non_exhaustive(),
            Self::Imds { endpoint } => f.debug_struct("Imds").field("endpoint", endpoint).finish(),
        }
    }
}

/// `expires_on` arrives as epoch seconds, sometimes quoted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EpochSeconds {
    Number(i64),
    Text(String),
}

impl EpochSeconds {
    fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = match self {
            EpochSeconds::Number(n) => *n,
            EpochSeconds::Text(s) => s.trim().parse().ok()?,
        };
        DateTime::from_timestamp(secs, 0)
    }
}

#[derive(Debug, Deserialize)]
struct ManagedIdentityTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_on: Option<EpochSeconds>,
}

#[derive(Debug)]
pub struct ManagedIdentityCredential {
    http: reqwest::Client,
    endpoint: ManagedIdentityEndpoint,
    /// Selects a user-assigned identity when set.
    client_id: Option<String>,
}

impl ManagedIdentityCredential {
    pub fn new(endpoint: ManagedIdentityEndpoint, client_id: Option<String>) -> Self {
        let http = match &endpoint {
            ManagedIdentityEndpoint::AppService { .. } => reqwest::Client::new(),
            ManagedIdentityEndpoint::Imds { .. } => bounded_client(IMDS_REQUEST_TIMEOUT),
        };

        Self {
            http,
            endpoint,
            client_id,
        }
    }

    /// Bound every request by `timeout` instead of the default.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.http = bounded_client(timeout);
        self
    }

    /// App Service endpoint when its variables are set, IMDS otherwise.
    pub fn from_config(config: &IdentityConfig) -> Self {
        let endpoint = match (&config.identity_endpoint, &config.identity_header) {
            (Some(endpoint), Some(header)) => ManagedIdentityEndpoint::AppService {
                endpoint: endpoint.clone(),
                header: header.clone(),
            },
            _ => ManagedIdentityEndpoint::Imds {
                endpoint: IMDS_ENDPOINT.to_string(),
            },
        };
        Self::new(endpoint, config.client_id.clone())
    }

    pub fn endpoint(&self) -> &ManagedIdentityEndpoint {
        &self.endpoint
    }

    fn build_request(&self, resource: &str) -> FoundryResult<reqwest::RequestBuilder> {
        let mut query = vec![("resource", resource.to_string())];
        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.clone()));
        }

        let request = match &self.endpoint {
            ManagedIdentityEndpoint::AppService { endpoint, header } => {
                query.push(("api-version", APP_SERVICE_API_VERSION.to_string()));
                let mut value = HeaderValue::from_str(header).map_err(|e| {
                    FoundryError::credential_unavailable(
                        self.name(),
                        format!("invalid IDENTITY_HEADER: {e}"),
                    )
                })?;
                value.set_sensitive(true);
                self.http
                    .get(endpoint)
                    .header("X-IDENTITY-HEADER", value)
                    .query(&query)
            }
            ManagedIdentityEndpoint::Imds { endpoint } => {
                query.push(("api-version", IMDS_API_VERSION.to_string()));
                self.http
                    .get(endpoint)
                    .header("Metadata", "true")
                    .query(&query)
            }
        };

        Ok(request)
    }
}

fn bounded_client(timeout: std::time::Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(IMDS_CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            log_warn!(error = %e, "Falling back to default HTTP client for managed identity");
            reqwest::Client::new()
        })
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &'static str {
        "ManagedIdentityCredential"
    }

    async fn get_token(&self, scope: &str) -> FoundryResult<AccessToken> {
        let resource = scope_to_resource(scope);
        log_debug!(
            credential = self.name(),
            endpoint = ?self.endpoint,
            resource = %resource,
            "Requesting managed identity token"
        );

        let response = self.build_request(resource)?.send().await.map_err(|e| {
            FoundryError::credential_unavailable(
                self.name(),
                format!("managed identity endpoint unreachable: {e}"),
            )
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            FoundryError::credential_unavailable(
                self.name(),
                format!("failed to read managed identity response: {e}"),
            )
        })?;

        if !status.is_success() {
            return Err(FoundryError::credential_unavailable(
                self.name(),
                format!("managed identity endpoint returned {status}: {body}"),
            ));
        }

        let parsed: ManagedIdentityTokenResponse = serde_json::from_str(&body).map_err(|e| {
            FoundryError::credential_unavailable(
                self.name(),
                format!("invalid managed identity response: {e}"),
            )
        })?;

        let expires_on = parsed
            .expires_on
            .as_ref()
            .and_then(EpochSeconds::to_datetime)
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        Ok(AccessToken::new(parsed.access_token, expires_on))
    }
}
