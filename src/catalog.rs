//! Model catalog listing over Azure Resource Manager
//!
//! The control plane is location-scoped, so every known location is queried
//! in turn and the results are folded into one table keyed by
//! `(format, name)`.
//!
//! The control plane only tags OpenAI-format models with the `responses`
//! capability. Non-OpenAI chat models also work with the Responses API at
//! runtime, which is what [`CatalogFilter::NonOpenAiChat`] lists.

use crate::credential::{AzureCliCredential, TokenCredential};
use crate::config::MANAGEMENT_SCOPE;
use crate::error::{FoundryError, FoundryResult};
use crate::logging::{log_debug, log_info, log_warn};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::Write;

pub const ARM_ENDPOINT: &str = "https://management.azure.com";
pub const ARM_API_VERSION: &str = "2024-10-01";

/// Locations known to host AI Services model catalogs.
pub const LOCATIONS: [&str; 23] = [
    "australiaeast",
    "brazilsouth",
    "canadacentral",
    "canadaeast",
    "eastus",
    "eastus2",
    "francecentral",
    "germanywestcentral",
    "japaneast",
    "koreacentral",
    "northcentralus",
    "norwayeast",
    "polandcentral",
    "southafricanorth",
    "southcentralus",
    "southeastasia",
    "southindia",
    "swedencentral",
    "switzerlandnorth",
    "uksouth",
    "westeurope",
    "westus",
    "westus3",
];

/// Which catalog entries to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogFilter {
    /// Models tagged with the `responses` capability.
    #[default]
    Responses,
    /// Non-OpenAI models with `chatCompletion` support.
    NonOpenAiChat,
}

impl CatalogFilter {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogFilter::Responses => "OpenAI models with Responses API support",
            CatalogFilter::NonOpenAiChat => {
                "non-OpenAI chat-capable models (work with Responses API)"
            }
        }
    }

    pub fn matches(&self, model: &CatalogModel) -> bool {
        match self {
            CatalogFilter::Responses => model.has_capability("responses"),
            CatalogFilter::NonOpenAiChat => {
                model.format.as_deref() != Some("OpenAI") && model.has_capability("chatCompletion")
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ModelListPage {
    #[serde(default)]
    value: Vec<ModelEntry>,
    #[serde(default, rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    #[serde(default)]
    pub model: Option<CatalogModel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogModel {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Values are strings such as `"true"` or `"128000"`.
    #[serde(default)]
    pub capabilities: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub skus: Vec<ModelSku>,
}

impl CatalogModel {
    pub fn has_capability(&self, capability: &str) -> bool {
        match self.capabilities.get(capability) {
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            Some(serde_json::Value::Bool(b)) => *b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSku {
    #[serde(default)]
    pub name: Option<String>,
}

/// Authenticated Resource Manager client for the model listing call.
#[derive(Debug)]
pub struct ArmClient {
    http: reqwest::Client,
    base_url: String,
    auth: HeaderValue,
}

impl ArmClient {
    pub fn new(base_url: impl Into<String>, token: &str) -> FoundryResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            FoundryError::configuration_error(format!("Invalid management token format: {e}"))
        })?;
        auth.set_sensitive(true);

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Every catalog entry for one location, following `nextLink` pages.
    pub async fn list_models(
        &self,
        subscription_id: &str,
        location: &str,
    ) -> FoundryResult<Vec<ModelEntry>> {
        let mut url = format!(
            "{}/subscriptions/{}/providers/Microsoft.CognitiveServices/locations/{}/models?api-version={}",
            self.base_url, subscription_id, location, ARM_API_VERSION
        );
        let mut entries = Vec::new();
        let mut visited = HashSet::new();

        loop {
            let page = self.fetch_page(&url).await?;
            entries.extend(page.value);
            visited.insert(url);
            match page.next_link {
                Some(next) if !next.is_empty() && !visited.contains(&next) => url = next,
                Some(next) if !next.is_empty() => {
                    log_warn!(location = %location, next_link = %next, "Page link repeats; stopping");
                    break;
                }
                _ => break,
            }
        }

        Ok(entries)
    }

    async fn fetch_page(&self, url: &str) -> FoundryResult<ModelListPage> {
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.auth.clone())
            .send()
            .await
            .map_err(|e| {
                FoundryError::request_failed(format!("could not reach {url}"), Some(Box::new(e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => FoundryError::authentication_failed(status.as_u16(), body),
                _ => FoundryError::request_failed(format!("API error {status}: {body}"), None),
            });
        }

        response.json().await.map_err(|e| {
            FoundryError::response_parsing_error(format!("Invalid model list: {e}"))
        })
    }
}

/// Versions and SKUs of one model across locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSummary {
    /// version → locations offering it
    pub versions: BTreeMap<String, BTreeSet<String>>,
    pub skus: BTreeSet<String>,
}

impl ModelSummary {
    pub fn locations(&self) -> BTreeSet<&str> {
        self.versions
            .values()
            .flat_map(|locs| locs.iter().map(String::as_str))
            .collect()
    }

    fn available_everywhere(&self, all_locations: &[String]) -> bool {
        let locations = self.locations();
        all_locations.iter().all(|l| locations.contains(l.as_str()))
    }
}

/// Aggregated catalog keyed by `(format, name)`.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: BTreeMap<(String, String), ModelSummary>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one location's entries in, keeping those `filter` accepts.
    pub fn add(&mut self, location: &str, entries: &[ModelEntry], filter: CatalogFilter) {
        for model in entries.iter().filter_map(|e| e.model.as_ref()) {
            if !filter.matches(model) {
                continue;
            }

            let key = (
                model.format.clone().unwrap_or_default(),
                model.name.clone().unwrap_or_default(),
            );
            let version = model
                .version
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "(default)".to_string());

            let summary = self.models.entry(key).or_default();
            summary
                .versions
                .entry(version)
                .or_default()
                .insert(location.to_string());
            summary
                .skus
                .extend(model.skus.iter().filter_map(|s| s.name.clone()));
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn get(&self, format: &str, name: &str) -> Option<&ModelSummary> {
        self.models.get(&(format.to_string(), name.to_string()))
    }

    /// The table (and optional location breakdown) through the total line.
    pub fn render(&self, all_locations: &[String], show_locations: bool) -> String {
        let total = all_locations.len();
        let mut out = String::new();

        out.push_str(&format!("Found {} model(s):\n\n", self.models.len()));
        out.push_str(&format!(
            "  {:<35} {:<15} {:<20} {}\n",
            "Model", "Format", "Versions", "Locations"
        ));
        out.push_str(&format!(
            "  {} {} {} {}\n",
            "-".repeat(35),
            "-".repeat(15),
            "-".repeat(20),
            "-".repeat(20)
        ));

        for ((format, name), summary) in &self.models {
            let versions = summary
                .versions
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            let location_summary = if summary.available_everywhere(all_locations) {
                "All regions".to_string()
            } else {
                format!("{}/{} regions", summary.locations().len(), total)
            };
            out.push_str(&format!(
                "  {:<35} {:<15} {:<20} {}\n",
                name, format, versions, location_summary
            ));
        }

        if show_locations {
            out.push_str(&format!("\n{}\n", "=".repeat(90)));
            out.push_str("Detailed location breakdown (models not available in all regions):\n\n");

            let mut any_printed = false;
            for ((format, name), summary) in &self.models {
                if summary.available_everywhere(all_locations) {
                    continue;
                }
                any_printed = true;
                out.push_str(&format!("  {name} ({format})\n"));
                for (version, locations) in &summary.versions {
                    let joined = locations.iter().cloned().collect::<Vec<_>>().join(", ");
                    out.push_str(&format!("    {version}: {joined}\n"));
                }
            }

            if !any_printed {
                out.push_str("  All models are available in every region.\n");
            }
        }

        out.push_str(&format!(
            "\nTotal: {} model(s) across {} locations\n",
            self.models.len(),
            total
        ));
        out
    }
}

/// Inputs for one catalog scan.
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Falls back to the Azure CLI's active subscription.
    pub subscription: Option<String>,
    pub show_locations: bool,
    pub filter: CatalogFilter,
    pub arm_endpoint: String,
    pub locations: Vec<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            subscription: None,
            show_locations: false,
            filter: CatalogFilter::default(),
            arm_endpoint: ARM_ENDPOINT.to_string(),
            locations: LOCATIONS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Resolve the subscription, scan every location and print the catalog.
///
/// A location that fails is skipped; credential and subscription failures
/// abort the scan.
pub async fn run_catalog<W: Write>(
    options: &CatalogOptions,
    credential: &dyn TokenCredential,
    cli: &AzureCliCredential,
    out: &mut W,
) -> FoundryResult<ModelCatalog> {
    let subscription = match &options.subscription {
        Some(id) => id.clone(),
        None => cli.default_subscription().await.map_err(|_| {
            FoundryError::configuration_error(
                "could not resolve a subscription. Pass --subscription or sign in with 'az login'.",
            )
        })?,
    };

    let label = options.filter.label();
    writeln!(out, "Subscription: {subscription}\n")?;
    writeln!(
        out,
        "Scanning {} locations for {label}...\n",
        options.locations.len()
    )?;
    out.flush()?;

    let token = credential.get_token(MANAGEMENT_SCOPE).await?;
    let arm = ArmClient::new(options.arm_endpoint.clone(), &token.token)?;

    let mut catalog = ModelCatalog::new();
    for location in &options.locations {
        match arm.list_models(&subscription, location).await {
            Ok(entries) => {
                log_debug!(location = %location, entries = entries.len(), "Fetched model list");
                catalog.add(location, &entries, options.filter);
            }
            Err(e) => {
                log_debug!(location = %location, error = %e, "Skipping location");
            }
        }
    }

    if catalog.is_empty() {
        writeln!(out, "No {label} found.")?;
        return Ok(catalog);
    }

    log_info!(models = catalog.len(), "Catalog scan complete");
    write!(out, "{}", catalog.render(&options.locations, options.show_locations))?;
    out.flush()?;

    Ok(catalog)
}
