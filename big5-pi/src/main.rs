//! big5-pi - Big Five personality inference service
//!
//! Every model artifact is loaded before the listener is bound. A missing or
//! unusable regressor or embedding model aborts startup.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use big5_common::config::ConfigResolver;
use big5_pi::config::resolve_summary_api_key;
use big5_pi::services::{GeminiSummarizer, RuleBasedSummarizer, Summarizer};
use big5_pi::AppState;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

/// Command-line arguments for big5-pi
#[derive(Parser, Debug)]
#[command(name = "big5-pi")]
#[command(about = "Big Five personality inference service")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "BIG5_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "BIG5_PORT")]
    port: Option<u16>,

    /// Bind address (overrides config)
    #[arg(long, env = "BIG5_HOST")]
    host: Option<String>,
}

fn build_summarizer(config: &big5_common::config::SummaryConfig) -> Arc<dyn Summarizer> {
    if !config.enabled {
        info!("Summaries disabled");
        return Arc::new(RuleBasedSummarizer::new());
    }

    let Some(api_key) = resolve_summary_api_key(config) else {
        warn!("No summary API key configured, using rule-based summaries");
        return Arc::new(RuleBasedSummarizer::new());
    };

    match GeminiSummarizer::new(api_key, config) {
        Ok(summarizer) => {
            info!(models = ?config.models, "AI summaries enabled");
            Arc::new(summarizer)
        }
        Err(e) => {
            warn!(error = %e, "AI summarizer unavailable, using rule-based summaries");
            Arc::new(RuleBasedSummarizer::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    big5_common::logging::init_tracing(&config.logging)
        .context("Failed to initialize logging")?;

    info!("Starting big5-pi v{}", env!("CARGO_PKG_VERSION"));

    // Startup barrier: no listener until every required model is resident
    let models = config.models.clone();
    let pipeline = config.pipeline.clone();
    let predictor = match tokio::task::spawn_blocking(move || {
        big5_pi::models::load_predictor(&models, &pipeline)
    })
    .await
    .context("Model loading task failed")?
    {
        Ok(predictor) => predictor,
        Err(e) => {
            error!(error = %e, "Model loading failed, refusing to start");
            return Err(e).context("Model loading failed");
        }
    };

    let state = AppState::new(
        Arc::new(predictor),
        build_summarizer(&config.summary),
        config.pipeline.fallback_on_error,
        config.summary.enabled,
    );
    let app = big5_pi::build_router(state, &config.cors_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

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
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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
