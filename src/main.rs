use anyhow::{Context, Result};
use clap::Parser;
use empathic_call::{create_router, AppState, Config, EmotionService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "empathic-call", version, about = "Real-time audio emotion streaming service")]
struct Args {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/empathic-call")]
    config: String,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, cfg.service.version);

    // Weight table problems stop the service here
    let service =
        EmotionService::from_config(&cfg.analysis).context("Invalid analysis configuration")?;

    let state = AppState::new(service.clone(), &cfg.service);
    let app = create_router(state, &cfg.cors);

    let addr = cfg.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(service))
        .await
        .context("HTTP server error")?;

    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal(service: EmotionService) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    service.shutdown();
}
