//! The example programs as data plus one sequential executor
//!
//! ```text
//! Start → ConfigLoaded → CredentialResolved → ClientReady
//!       → (Invoking → ResponseReady)* → Done
//! any failure ─────────────────────────────► Aborted
//! ```
//!
//! Configuration is loaded by the caller (the binary) which makes
//! `ConfigLoaded` the entry state here.
//!
//! Only the reports are written to `out`. Banners, headings and progress
//! lines go to the INFO log.

use crate::client::{ConnectionConfig, FoundryClient};
use crate::config::{ApiKeyConfig, ProjectConfig, API_VERSION};
use crate::credential::CredentialSource;
use crate::error::FoundryResult;
use crate::logging::{log_debug, log_info, log_warn};
use crate::report::write_report;
use crate::types::{InferenceRequest, InferenceResponse};
use std::collections::BTreeMap;
use std::io::Write;

pub const MAX_OUTPUT_TOKENS: u32 = 500;
pub const QUANTUM_PROMPT: &str = "Explain quantum computing in 3 sentences.";
pub const CLOUD_PROMPT: &str = "What are the top 3 benefits of cloud computing? Be concise.";

const WAITING: &str = "Waiting for response...";
const WAITING_REASONING: &str = "Waiting for response (reasoning models can take 30-60s)...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    ConfigLoaded,
    CredentialResolved,
    ClientReady,
    Invoking(usize),
    ResponseReady(usize),
    Done,
    Aborted,
}

fn enter(state: RunState) {
    log_debug!(state = ?state, "Run state");
}

/// One call and the heading printed above it.
#[derive(Debug, Clone)]
pub struct RunStep {
    pub heading: String,
    pub waiting: &'static str,
    pub request: InferenceRequest,
}

/// Everything a program does after configuration is loaded.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub banner: String,
    pub endpoint: String,
    pub query: BTreeMap<String, String>,
    pub steps: Vec<RunStep>,
}

impl RunPlan {
    /// Single call to an OpenAI model with the static key.
    pub fn api_key(config: &ApiKeyConfig) -> FoundryResult<Self> {
        let model = crate::config::DEFAULT_PRIMARY_MODEL;
        Ok(Self {
            banner: "Microsoft Foundry Models - Responses API (API Key Auth - Rust)".to_string(),
            endpoint: config.endpoint.clone(),
            query: BTreeMap::new(),
            steps: vec![RunStep {
                heading: format!("Model: {model}"),
                waiting: WAITING,
                request: InferenceRequest::new(model, QUANTUM_PROMPT, MAX_OUTPUT_TOKENS)?,
            }],
        })
    }

    /// An OpenAI model then a non-OpenAI model, both through one client.
    pub fn project(config: &ProjectConfig) -> FoundryResult<Self> {
        let mut query = BTreeMap::new();
        query.insert("api-version".to_string(), API_VERSION.to_string());

        Ok(Self {
            banner: "Microsoft Foundry Models - Responses API (Plain OpenAI SDK - Rust)".to_string(),
            endpoint: config.endpoint.clone(),
            query,
            steps: vec![
                RunStep {
                    heading: format!("Example 1: OpenAI model ({})", config.primary_model),
                    waiting: WAITING,
                    request: InferenceRequest::new(
                        config.primary_model.clone(),
                        QUANTUM_PROMPT,
                        MAX_OUTPUT_TOKENS,
                    )?,
                },
                RunStep {
                    heading: format!("Example 2: Non-OpenAI model ({})", config.secondary_model),
                    waiting: WAITING_REASONING,
                    request: InferenceRequest::new(
                        config.secondary_model.clone(),
                        CLOUD_PROMPT,
                        MAX_OUTPUT_TOKENS,
                    )?,
                },
            ],
        })
    }
}

/// Run the plan top to bottom, writing each report to `out`.
///
/// Stops at the first error; later steps are never attempted.
pub async fn execute<W: Write>(
    plan: &RunPlan,
    source: &CredentialSource,
    out: &mut W,
) -> FoundryResult<Vec<InferenceResponse>> {
    enter(RunState::ConfigLoaded);
    match execute_steps(plan, source, out).await {
        Ok(responses) => {
            enter(RunState::Done);
            Ok(responses)
        }
        Err(e) => {
            enter(RunState::Aborted);
            log_warn!(kind = %e.kind(), "Run aborted");
            Err(e)
        }
    }
}

async fn execute_steps<W: Write>(
    plan: &RunPlan,
    source: &CredentialSource,
    out: &mut W,
) -> FoundryResult<Vec<InferenceResponse>> {
    log_info!("{}", plan.banner);

    let credential = source.resolve().await?;
    enter(RunState::CredentialResolved);

    let connection = ConnectionConfig::new(plan.endpoint.clone(), credential, plan.query.clone())?;
    let client = FoundryClient::new(connection)?;
    enter(RunState::ClientReady);
    log_info!(base_url = %client.base_url(), steps = plan.steps.len(), "Starting run");

    let mut responses = Vec::with_capacity(plan.steps.len());
    for (index, step) in plan.steps.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        log_info!("{}", step.heading);
        log_info!("{}", step.waiting);

        enter(RunState::Invoking(index));
        let response = client.create_response(&step.request).await?;
        enter(RunState::ResponseReady(index));

        write_report(out, &response)?;
        responses.push(response);
    }

    Ok(responses)
}
