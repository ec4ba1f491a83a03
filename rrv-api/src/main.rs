//! rrv-api - Restaurant review ingestion service
//!
//! Startup sequence:
//! 1. Tracing
//! 2. Configuration (CLI > env > TOML file > defaults)
//! 3. Database open + migration ledger (failure aborts startup)
//! 4. Sentiment client, router, listener

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rrv_common::api::auth::{issue_token, AuthError};
use rrv_common::config::ServiceConfig;
use rrv_common::db::init_database;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rrv_api::services::HttpSentimentClient;
use rrv_api::{build_router, AppState};

/// Command-line arguments for rrv-api
#[derive(Parser, Debug)]
#[command(name = "rrv-api")]
#[command(about = "Restaurant review ingestion service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "RRV_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "RRV_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// SQLite database file
    #[arg(long, env = "RRV_DATABASE_PATH")]
    database_path: Option<PathBuf>,

    /// Sentiment service endpoint
    #[arg(long, env = "RRV_SENTIMENT_ENDPOINT")]
    sentiment_endpoint: Option<String>,

    /// Sentiment call deadline in seconds
    #[arg(long, env = "RRV_SENTIMENT_TIMEOUT_SECS")]
    sentiment_timeout_secs: Option<u64>,

    /// End-to-end request deadline in seconds
    #[arg(long, env = "RRV_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    /// Token signing key
    #[arg(long, env = "RRV_JWT_SIGNING_KEY", hide_env_values = true)]
    jwt_signing_key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a signed token for the given identity and exit
    IssueToken {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "user")]
        role: String,
        #[arg(long, default_value = "24")]
        ttl_hours: i64,
    },
}

impl Args {
    /// Layer CLI/env values over the file configuration
    fn apply_to(&self, config: &mut ServiceConfig) {
        if let Some(bind_address) = &self.bind_address {
            config.bind_address = bind_address.clone();
        }
        if let Some(database_path) = &self.database_path {
            config.database_path = database_path.clone();
        }
        if let Some(endpoint) = &self.sentiment_endpoint {
            config.sentiment_endpoint = endpoint.clone();
        }
        if let Some(secs) = self.sentiment_timeout_secs {
            config.sentiment_timeout_secs = secs;
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(key) = &self.jwt_signing_key {
            config.jwt_signing_key = Some(key.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rrv_api=info,rrv_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = ServiceConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;

    if let Some(Command::IssueToken {
        email,
        role,
        ttl_hours,
    }) = &args.command
    {
        let ttl = chrono::Duration::try_hours(*ttl_hours).ok_or_else(|| {
            AuthError::Issue(format!("--ttl-hours out of range: {}", ttl_hours))
        })?;
        let token = issue_token(email, role, config.signing_key()?, ttl)?;
        println!("{}", token);
        return Ok(());
    }

    info!("Starting rrv-api v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.database_path.display());
    info!("Sentiment endpoint: {}", config.sentiment_endpoint);

    // Migrations run inside init; a failure here must stop the process
    let pool = match init_database(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Database initialization failed: {}", e);
            return Err(e.into());
        }
    };

    let sentiment = HttpSentimentClient::new(
        config.sentiment_endpoint.clone(),
        config.sentiment_timeout(),
    )?;

    let state = AppState::new(pool, Arc::new(sentiment), config.signing_key()?);
    let app = build_router(state, config.request_timeout());

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
