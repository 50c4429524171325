//! One Responses API call authenticated with a static API key.
//!
//! Usage:
//!   AZURE_AI_FOUNDRY_ENDPOINT=https://<resource>.services.ai.azure.com \
//!   AZURE_AI_API_KEY=... cargo run --bin responses-apikey

use foundry_responses::logging::init_tracing;
use foundry_responses::{execute, ApiKeyConfig, CredentialSource, FoundryError, RunPlan};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<FoundryError>()
                .map_or(1, FoundryError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ApiKeyConfig::from_env()?;
    let plan = RunPlan::api_key(&config)?;
    let source = CredentialSource::api_key(config.api_key.clone());

    let mut stdout = std::io::stdout().lock();
    execute(&plan, &source, &mut stdout).await?;
    Ok(())
}
