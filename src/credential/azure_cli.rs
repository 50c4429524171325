//! Azure CLI credential
//!
//! Shells out to `az account get-access-token`, reusing whatever session
//! `az login` left behind. Also answers "which subscription is active" for
//! the model catalog.

use super::{AccessToken, TokenCredential};
use crate::error::{FoundryError, FoundryResult};
use crate::logging::log_debug;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::process::Command;

pub const DEFAULT_PROGRAM: &str = "az";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    /// Local wall-clock time, e.g. `2025-01-01 12:00:00.000000`.
    #[serde(default)]
    expires_on: Option<String>,
    /// Epoch seconds, only emitted by newer CLI releases.
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

impl CliToken {
    fn expiry(&self) -> FoundryResult<DateTime<Utc>> {
        if let Some(epoch) = self.expires_on_epoch {
            if let Some(at) = DateTime::from_timestamp(epoch, 0) {
                return Ok(at);
            }
        }

        let raw = self.expires_on.as_deref().unwrap_or_default();
        parse_local_expiry(raw).ok_or_else(|| {
            FoundryError::credential_unavailable(
                "AzureCliCredential",
                format!("unrecognised token expiry '{raw}'"),
            )
        })
    }
}

fn parse_local_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Arguments end up on a command line; only allow URI-ish characters.
fn validate_arg(what: &str, value: &str) -> FoundryResult<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '/'));
    if valid {
        Ok(())
    } else {
        Err(FoundryError::credential_unavailable(
            "AzureCliCredential",
            format!("invalid {what} '{value}'"),
        ))
    }
}

fn validate_scope(scope: &str) -> FoundryResult<()> {
    validate_arg("scope", scope)
}

fn validate_tenant(tenant: &str) -> FoundryResult<()> {
    validate_arg("tenant", tenant)
}

#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    program: String,
    tenant_id: Option<String>,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            tenant_id: None,
        }
    }

    /// Use a different executable instead of `az` on the `PATH`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_tenant(mut self, tenant_id: Option<String>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    /// Subscription selected by `az account set`, as printed by
    /// `az account show --query id -o tsv`.
    pub async fn default_subscription(&self) -> FoundryResult<String> {
        let stdout = self
            .run(&["account", "show", "--query", "id", "-o", "tsv"])
            .await?;
        let id = stdout.trim();
        if id.is_empty() {
            return Err(FoundryError::credential_unavailable(
                self.name(),
                "az account show returned no subscription",
            ));
        }
        Ok(id.to_string())
    }

    async fn run(&self, args: &[&str]) -> FoundryResult<String> {
        log_debug!(program = %self.program, args = ?args, "Invoking Azure CLI");

        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.program);
            c
        } else {
            Command::new(&self.program)
        };

        let output = command.args(args).output().await.map_err(|e| {
            FoundryError::credential_unavailable(
                self.name(),
                format!("Azure CLI not found on path ({e}); run 'az login' after installing it"),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.contains("az login") || stderr.contains("az account set") {
                "please run 'az login' to set up an account".to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(FoundryError::credential_unavailable(self.name(), message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &'static str {
        "AzureCliCredential"
    }

    async fn get_token(&self, scope: &str) -> FoundryResult<AccessToken> {
        validate_scope(scope)?;

        let mut args = vec![
            "account",
            "get-access-token",
            "--output",
            "json",
            "--scope",
            scope,
        ];
        if let Some(tenant) = &self.tenant_id {
            validate_tenant(tenant)?;
            args.push("--tenant");
            args.push(tenant.as_str());
        }

        let stdout = self.run(&args).await?;
        let token: CliToken = serde_json::from_str(&stdout).map_err(|e| {
            FoundryError::credential_unavailable(
                self.name(),
                format!("unexpected output from az account get-access-token: {e}"),
            )
        })?;

        let expires_on = token.expiry()?;
        Ok(AccessToken::new(token.access_token, expires_on))
    }
}
