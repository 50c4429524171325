//! List models that support the Responses API via the ARM control plane.
//!
//! Usage:
//!   az login
//!   cargo run --bin list-models
//!   cargo run --bin list-models -- --locations
//!   cargo run --bin list-models -- --non-openai --subscription <id>

use clap::Parser;
use foundry_responses::logging::init_tracing;
use foundry_responses::{
    run_catalog, AzureCliCredential, CatalogFilter, CatalogOptions, DefaultAzureCredential,
    FoundryError, IdentityConfig,
};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "list-models",
    about = "List models that support the Responses API via the ARM control plane."
)]
struct Cli {
    /// Azure subscription ID (defaults to your active subscription)
    #[arg(long, short = 's')]
    subscription: Option<String>,

    /// Show per-region breakdown for models not available in all regions
    #[arg(long, short = 'l')]
    locations: bool,

    /// List non-OpenAI models (DeepSeek, Meta, xAI, etc.) that support chat
    /// completion and work with the Responses API
    #[arg(long)]
    non_openai: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
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

async fn run(cli: Cli) -> anyhow::Result<()> {
    let identity = IdentityConfig::from_env();
    let options = CatalogOptions {
        subscription: cli.subscription.filter(|s| !s.trim().is_empty()),
        show_locations: cli.locations,
        filter: if cli.non_openai {
            CatalogFilter::NonOpenAiChat
        } else {
            CatalogFilter::Responses
        },
        ..CatalogOptions::default()
    };

    let credential = DefaultAzureCredential::new(&identity);
    let cli_credential = AzureCliCredential::new().with_tenant(identity.tenant_id.clone());

    let mut stdout = std::io::stdout().lock();
    run_catalog(&options, &credential, &cli_credential, &mut stdout).await?;
    Ok(())
}
