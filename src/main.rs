//! pyrosight - co-pyrolysis product prediction service
//!
//! HTTP front end for a pretrained sludge-coal co-pyrolysis model:
//! engineers submit three process parameters and get seven predicted
//! yield/composition metrics back.
//!
//! # Usage
//!
//! ```bash
//! # Run with the built-in surrogate model
//! cargo run --release -- --surrogate
//!
//! # Run against a model server configured in pyrosight.toml
//! cargo run --release
//! ```
//!
//! # Environment Variables
//!
//! - `PYROSIGHT_CONFIG`: Path to the TOML config file
//! - `PYROSIGHT_CORS_ORIGINS`: Comma-separated dev origins
//! - `RUST_LOG`: Logging level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use pyrosight::api::{create_app, ApiState};
use pyrosight::config::{self, AppConfig, ModelMode};
use pyrosight::orchestrator::PredictionOrchestrator;
use pyrosight::predictor::{HttpPredictor, Predictor, SurrogateModel};
use pyrosight::session::SessionManager;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "pyrosight")]
#[command(about = "Sludge-coal co-pyrolysis product prediction service")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8080")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to the config file (overrides the PYROSIGHT_CONFIG search order)
    #[arg(short, long)]
    config: Option<String>,

    /// Use the built-in surrogate model regardless of config
    #[arg(long)]
    surrogate: bool,
}

// ============================================================================
// Task Names for Supervisor Logging
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    SessionReaper,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpServer => write!(f, "HttpServer"),
            Self::SessionReaper => write!(f, "SessionReaper"),
        }
    }
}

// ============================================================================
// Predictor Selection
// ============================================================================

/// Build the prediction collaborator from config (or the --surrogate flag).
fn build_predictor(config: &AppConfig, force_surrogate: bool) -> Result<Arc<dyn Predictor>> {
    if force_surrogate || config.model.mode == ModelMode::Surrogate {
        info!("Model: built-in surrogate (no external model server)");
        return Ok(Arc::new(SurrogateModel::new()));
    }

    let endpoint = config
        .model
        .endpoint
        .as_deref()
        .context("model.mode = \"http\" requires model.endpoint")?;
    let timeout = config.model.request_timeout_secs.map(Duration::from_secs);
    match timeout {
        Some(t) => info!(endpoint, timeout_secs = t.as_secs(), "Model: HTTP"),
        None => info!(endpoint, "Model: HTTP (no request timeout — calls may block indefinitely)"),
    }
    let predictor = HttpPredictor::new(endpoint, timeout)
        .context("Failed to build model server client")?;
    Ok(Arc::new(predictor))
}

// ============================================================================
// Tasks
// ============================================================================

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: axum::Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

/// Spawn the idle-session reaper task.
fn spawn_session_reaper(
    task_set: &mut JoinSet<Result<TaskName>>,
    sessions: Arc<SessionManager>,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        let idle_ttl = config::get().session.idle_ttl_secs;
        let mut interval = tokio::time::interval(Duration::from_secs(
            pyrosight::config::defaults::SESSION_REAPER_INTERVAL_SECS,
        ));
        info!("[SessionReaper] Task starting (idle TTL {}s)", idle_ttl);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("[SessionReaper] Received shutdown signal");
                    return Ok(TaskName::SessionReaper);
                }
                _ = interval.tick() => {
                    let removed = sessions.evict_idle(idle_ttl).await;
                    if removed > 0 {
                        info!("[SessionReaper] Evicted {} idle sessions", removed);
                    }
                }
            }
        }
    });
}

/// Run the supervisor loop: monitor tasks, cancel on failure.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("Supervisor: all tasks spawned, monitoring...");

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Supervisor: shutdown signal received");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("Supervisor: task {} completed normally", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("Supervisor: task failed with error: {}", e);
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!("Supervisor: task panicked: {}", e);
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => {
                        info!("Supervisor: all tasks completed");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    // Load configuration
    let app_config = match &args.config {
        Some(path) => AppConfig::load_from_file(std::path::Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => AppConfig::load(),
    };
    config::init(app_config);

    let server_addr = args
        .addr
        .unwrap_or_else(|| config::get().server.addr.clone());

    info!("pyrosight - co-pyrolysis product prediction service");

    let predictor = build_predictor(config::get(), args.surrogate)?;
    let sessions = Arc::new(SessionManager::new());
    let orchestrator = Arc::new(PredictionOrchestrator::new(predictor));
    let state = ApiState::new(Arc::clone(&sessions), orchestrator);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;
    info!("HTTP server listening on {}", server_addr);
    info!("Prediction form available at: http://{}", server_addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());
    spawn_session_reaper(&mut task_set, sessions, cancel_token.clone());

    run_supervisor(&mut task_set, cancel_token).await?;

    info!("pyrosight shutdown complete");
    Ok(())
}
