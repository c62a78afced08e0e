mod api;
mod credentials;
mod error;
mod router;
mod state;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "notebox", version, about = "Note gateway over a secret store and a durable queue")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Print the resolved configuration with secrets redacted
    Config,
}

fn load_config() -> notebox_core::Config {
    notebox_core::config::load_dotenv();
    notebox_core::Config::from_env()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn serve(config: &notebox_core::Config) -> anyhow::Result<()> {
    config.validate()?;
    config.log_summary();

    let state = Arc::new(state::AppState::from_config(config).await?);
    let app = router::build_router(state, &config.server.cors_origin);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await?,
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted_summary())?);
        }
    }

    Ok(())
}
