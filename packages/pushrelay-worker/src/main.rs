use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use pushrelay_sdk::ProviderClient;
use pushrelay_worker::{run_relay, SystemSink};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod bootstrap;

#[derive(Parser)]
#[command(name = "pushrelay-worker")]
#[command(about = "Pushrelay background notification worker")]
struct Cli {
    /// Provider endpoint override (defaults to https://{auth_domain})
    #[arg(short, long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register with the provider and relay background messages (default)
    Run,
    /// Resolve and validate the provider configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = bootstrap::provider_config_from_env()?;
    let endpoint = bootstrap::resolve_endpoint(cli.endpoint.as_deref(), &config);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::CheckConfig => {
            config.validate().map_err(|e| anyhow::Error::new(e))?;
            println!("✅ Configuration OK");
            println!("   Endpoint: {}", endpoint);
            println!("   Project: {}", config.project_id);
            println!("   Sender: {}", config.messaging_sender_id);
            println!("   App: {}", config.app_id);
            println!("   Storage bucket: {}", config.storage_bucket);
            println!("   API key: {}", bootstrap::mask(&config.api_key));
        }
        Commands::Run => {
            let client = ProviderClient::initialize(&endpoint, config)
                .context("invalid provider configuration")?;
            let registration = client
                .register()
                .await
                .context("provider registration failed")?;
            info!(
                "registered with provider, token issued at {}",
                registration.issued_at
            );

            let rx = client
                .subscribe(&registration)
                .await
                .context("push subscription failed")?;

            info!("relay running on {}", endpoint);
            run_relay(rx, &SystemSink).await;
            info!("relay stopped");
        }
    }

    Ok(())
}
