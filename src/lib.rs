//! # foundry-responses
//!
//! Minimal Responses API programs for Microsoft Foundry.
//!
//! ## Key Features
//!
//! - **Two auth pathways**: a static API key, or an Entra ID bearer token
//!   from the [`DefaultAzureCredential`] chain
//! - **OpenAI-compatible v1 surface**: `{endpoint}/openai/v1/responses`
//! - **Model catalog**: list which models support the Responses API per region
//!
//! ## Example
//!
//! ```rust,no_run
//! use foundry_responses::{
//!     ConnectionConfig, CredentialSource, FoundryClient, InferenceRequest,
//! };
//! use std::collections::BTreeMap;
//!
//! # async fn example() -> foundry_responses::FoundryResult<()> {
//! let credential = CredentialSource::api_key("your-api-key").resolve().await?;
//! let config = ConnectionConfig::new(
//!     "https://my-resource.services.ai.azure.com",
//!     credential,
//!     BTreeMap::new(),
//! )?;
//! let client = FoundryClient::new(config)?;
//!
//! let request = InferenceRequest::new("gpt-4.1-mini", "Hello!", 500)?;
//! let response = client.create_response(&request).await?;
//! println!("{}", response.output_text);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming)
pub mod logging;

pub mod catalog;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod report;
pub mod runner;
pub mod types;

#[cfg(test)]
mod tests;

pub use catalog::{run_catalog, ArmClient, CatalogFilter, CatalogOptions, ModelCatalog};
pub use client::{resolve_base_url, ConnectionConfig, FoundryClient};
pub use config::{ApiKeyConfig, IdentityConfig, ProjectConfig};
pub use credential::{
    AccessToken, AzureCliCredential, Credential, CredentialSource, DefaultAzureCredential,
    TokenCredential,
};
pub use error::{FoundryError, FoundryResult};
pub use report::{format_report, write_report};
pub use runner::{execute, RunPlan};
pub use types::{InferenceRequest, InferenceResponse, ResponseStatus};
