//! Two Responses API calls (an OpenAI model, then a non-OpenAI model)
//! authenticated with an Entra ID token.
//!
//! Usage:
//!   az login
//!   AZURE_AI_PROJECT_ENDPOINT=https://<resource>.services.ai.azure.com/api/projects/<project> \
//!   cargo run --bin responses-example

use foundry_responses::config::INFERENCE_SCOPE;
use foundry_responses::logging::init_tracing;
use foundry_responses::{
    execute, CredentialSource, DefaultAzureCredential, FoundryError, IdentityConfig,
    ProjectConfig, RunPlan,
};
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
    let config = ProjectConfig::from_env()?;
    let plan = RunPlan::project(&config)?;

    let chain = DefaultAzureCredential::new(&IdentityConfig::from_env());
    let source = CredentialSource::entra(Box::new(chain), INFERENCE_SCOPE);

    let mut stdout = std::io::stdout().lock();
    execute(&plan, &source, &mut stdout).await?;
    Ok(())
}
