use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notekeeper::{api, config::ServeArgs};
use notekeeper_core::{Database, SystemClock};

#[derive(Parser)]
#[command(name = "notekeeper")]
#[command(about = "Notes API with ranked search, soft deletes and per-key rate limiting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Notekeeper server
    Serve(ServeArgs),
    /// Check server status
    Status {
        /// Base URL of a running server
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "notekeeper=debug,notekeeper_core=debug,tower_http=debug".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => serve(args).await?,
        Some(Commands::Status { url }) => status(&url).await?,
        None => {
            // Default: serve with settings from the environment
            let args = ServeArgs::from_env().map_err(|e| {
                anyhow::anyhow!("cannot serve without a subcommand: {e}")
            })?;
            serve(args).await?
        }
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.service_config()?;

    let db = match &args.database {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    let state = api::AppState::new(db, &config, Arc::new(SystemClock));
    let app = api::create_router(state);

    let address = args.bind_address();
    tracing::info!("Starting Notekeeper server on {}", address);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Notekeeper server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Notekeeper server stopped");
    Ok(())
}

async fn status(url: &str) -> anyhow::Result<()> {
    let endpoint = format!("{}/health", url.trim_end_matches('/'));
    println!("Checking Notekeeper server status at {}...", endpoint);

    match reqwest::get(&endpoint).await {
        Ok(response) if response.status().is_success() => {
            let body: serde_json::Value = response.json().await?;
            println!("Server is up: {}", body);
        }
        Ok(response) => {
            anyhow::bail!("Server responded with {}", response.status());
        }
        Err(e) => {
            anyhow::bail!("Server is not reachable: {}", e);
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
