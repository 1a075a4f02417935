// ovis-server - upload a video, pick track or segment, get it back
// annotated by two pretrained open-vocabulary models.

use clap::Parser;
use ovis_server::http::{create_router, ApiState};
use ovis_vision::{VisionConfig, VisionEngine};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ovis-server",
    about = "Open-vocabulary video tracking and segmentation demo"
)]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Where model artifacts are cached (defaults to ~/.ovis/models).
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Root directory for processed videos.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Minimum detector score for a box to be kept.
    #[arg(long)]
    detect_threshold: Option<f32>,

    /// Heatmap cutoff for segmentation masks.
    #[arg(long)]
    mask_threshold: Option<f32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    info!("🚀 Starting ovis...");

    let mut config = VisionConfig::default();
    if let Some(model_dir) = args.model_dir {
        config.model_dir = model_dir;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(threshold) = args.detect_threshold {
        config.detect_threshold = threshold;
    }
    if let Some(threshold) = args.mask_threshold {
        config.mask_threshold = threshold;
    }

    info!("📦 Ensuring model artifacts in {:?}...", config.model_dir);
    let engine = VisionEngine::load(config.clone()).await?;
    info!("✅ Vision engine ready");

    let state = ApiState {
        engine: Arc::new(engine),
        output_dir: config.output_dir.clone(),
    };
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("✅ HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    info!("✅ Server stopped");
    Ok(())
}

/// Wait for ctrl-c or SIGTERM.
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
