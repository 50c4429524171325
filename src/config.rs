//! Configuration loaded from the process environment.
//!
//! This is the ONLY module that reads environment variables. Every program
//! loads its configuration once at start and passes it down explicitly.

use crate::error::{FoundryError, FoundryResult};
use crate::logging::log_debug;
use std::fmt::Debug;
use std::path::PathBuf;

/// Endpoint of the Foundry resource used by the API key program.
pub const FOUNDRY_ENDPOINT_VAR: &str = "AZURE_AI_FOUNDRY_ENDPOINT";
/// Static API key for the Foundry resource.
pub const API_KEY_VAR: &str = "AZURE_AI_API_KEY";
/// Project endpoint used by the Entra ID program.
pub const PROJECT_ENDPOINT_VAR: &str = "AZURE_AI_PROJECT_ENDPOINT";
/// Optional deployment name for the first (OpenAI) model.
pub const PRIMARY_MODEL_VAR: &str = "AZURE_MODEL_2_DEPLOYMENT_NAME";
/// Optional deployment name for the second (non-OpenAI) model.
pub const SECONDARY_MODEL_VAR: &str = "AZURE_MODEL_DEPLOYMENT_NAME";

pub const DEFAULT_PRIMARY_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_SECONDARY_MODEL: &str = "DeepSeek-R1-0528";

/// Preview API version tag sent by the Entra ID program.
pub const API_VERSION: &str = "2025-11-15-preview";

/// Token audience for Foundry inference.
pub const INFERENCE_SCOPE: &str = "https://ai.azure.com/.default";
/// Token audience for the Azure Resource Manager control plane.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Look up every name and fail with one error naming all that are missing.
///
/// A variable counts as missing when it is unset, empty, or only whitespace.
/// Values are returned trimmed, in the order of `names`.
pub fn require_vars<F>(names: &[&str], lookup: F) -> FoundryResult<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut values = Vec::with_capacity(names.len());
    let mut missing = Vec::new();

    for name in names {
        match present(lookup(name)) {
            Some(value) => values.push(value),
            None => missing.push(*name),
        }
    }

    if !missing.is_empty() {
        return Err(FoundryError::configuration_error(format!(
            "{} must be set.",
            join_names(&missing)
        )));
    }

    Ok(values)
}

/// [`require_vars`] against the process environment.
pub fn require_env(names: &[&str]) -> FoundryResult<Vec<String>> {
    require_vars(names, env_lookup)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// "A", "A and B", "A, B and C"
fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Configuration for the static API key program.
#[derive(Clone)]
pub struct ApiKeyConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl ApiKeyConfig {
    pub fn from_env() -> FoundryResult<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> FoundryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = require_vars(&[FOUNDRY_ENDPOINT_VAR, API_KEY_VAR], lookup)?.into_iter();
        let endpoint = values.next().unwrap_or_default();
        let api_key = values.next().unwrap_or_default();

        log_debug!(endpoint = %endpoint, "API key configuration loaded");

        Ok(Self { endpoint, api_key })
    }
}

impl Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Configuration for the Entra ID program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub endpoint: String,
    /// Model for the first call.
    pub primary_model: String,
    /// Model for the second call.
    pub secondary_model: String,
}

impl ProjectConfig {
    pub fn from_env() -> FoundryResult<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> FoundryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = require_vars(&[PROJECT_ENDPOINT_VAR], &lookup)?
            .into_iter()
            .next()
            .unwrap_or_default();

        let primary_model = present(lookup(PRIMARY_MODEL_VAR))
            .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string());
        let secondary_model = present(lookup(SECONDARY_MODEL_VAR))
            .unwrap_or_else(|| DEFAULT_SECONDARY_MODEL.to_string());

        log_debug!(
            endpoint = %endpoint,
            primary_model = %primary_model,
            secondary_model = %secondary_model,
            "Project configuration loaded"
        );

        Ok(Self {
            endpoint,
            primary_model,
            secondary_model,
        })
    }
}

/// Inputs for the Entra ID credential chain.
///
/// Every field is optional; a source whose inputs are absent is skipped.
#[derive(Clone)]
pub struct IdentityConfig {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub federated_token_file: Option<PathBuf>,
    pub authority_host: String,
    /// App Service / Container Apps managed identity endpoint.
    pub identity_endpoint: Option<String>,
    pub identity_header: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret: None,
            federated_token_file: None,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            identity_endpoint: None,
            identity_header: None,
        }
    }
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            tenant_id: present(lookup("AZURE_TENANT_ID")),
            client_id: present(lookup("AZURE_CLIENT_ID")),
            client_secret: present(lookup("AZURE_CLIENT_SECRET")),
            federated_token_file: present(lookup("AZURE_FEDERATED_TOKEN_FILE")).map(PathBuf::from),
            authority_host: present(lookup("AZURE_AUTHORITY_HOST"))
                .map(|h| h.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            identity_endpoint: present(lookup("IDENTITY_ENDPOINT")),
            identity_header: present(lookup("IDENTITY_HEADER")),
        };

        log_debug!(
            has_tenant_id = config.tenant_id.is_some(),
            has_client_id = config.client_id.is_some(),
            has_client_secret = config.client_secret.is_some(),
            has_federated_token_file = config.federated_token_file.is_some(),
            has_identity_endpoint = config.identity_endpoint.is_some(),
            authority_host = %config.authority_host,
            "Identity configuration loaded"
        );

        config
    }
}

impl Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("federated_token_file", &self.federated_token_file)
            .field("authority_host", &self.authority_host)
            .field("identity_endpoint", &self.identity_endpoint)
            .field(
                "identity_header",
                &self.identity_header.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
