// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use memoryrouter_embeddings::{
    api::{ApiServer, AppState},
    cli::{Cli, Commands},
    config::ServiceConfig,
    embeddings::{load_model, ModelBackend},
    keep_warm::{HealthProbe, HttpProbe, KeepWarm},
    logging,
    monitoring::ServiceMetrics,
    service::EmbeddingService,
    version,
};
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.overrides.resolve()?;
    logging::init(&config.logging)?;

    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 BUILD VERSION: {}", version::VERSION);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Download => download(config).await,
        Commands::Ping { url } => ping(&url, &config).await,
    }
}

async fn serve(config: ServiceConfig) -> Result<()> {
    info!("🧠 Loading embedding model {}...", config.model.id);
    let model = load_model(config.model.clone())
        .await
        .with_context(|| format!("Failed to load model {}", config.model.id))?;

    let metrics = ServiceMetrics::new().context("Failed to create metrics registry")?;
    let service = EmbeddingService::new(model, metrics);
    service.warmup().await.context("Warmup inference failed")?;

    let shutdown = CancellationToken::new();

    let keep_warm = KeepWarm::from_config(&config.keep_warm, &service)?
        .map(|task| task.spawn(shutdown.clone()));
    if keep_warm.is_none() {
        info!("Keep-warm disabled");
    }

    let server = ApiServer::bind(AppState::new(service, config.api.clone())).await?;
    info!("✅ Embedding API ready on http://{}", server.local_addr()?);
    info!("   POST /embed, POST /v1/embeddings, GET /health, GET /metrics");

    let server_shutdown = shutdown.clone();
    let mut server_task = tokio::spawn(server.run(server_shutdown));

    let served = tokio::select! {
        _ = wait_for_signal() => {
            info!("Shutting down...");
            shutdown.cancel();
            (&mut server_task).await
        }
        // The server stopped on its own: serve error
        finished = &mut server_task => {
            shutdown.cancel();
            finished
        }
    };
    served.context("API server task panicked")??;
    if let Some(handle) = keep_warm {
        if let Err(e) = handle.await {
            warn!("Keep-warm task ended abnormally: {}", e);
        }
    }

    info!("👋 Goodbye");
    Ok(())
}

/// Pre-fetches the model files so a container image starts without network
async fn download(config: ServiceConfig) -> Result<()> {
    if config.model.backend == ModelBackend::Hash {
        info!("Hash backend needs no model files");
        return Ok(());
    }

    let spec = config.model;
    let files = tokio::task::spawn_blocking(move || spec.resolve_files())
        .await
        .context("Download task panicked")??;

    info!("✅ Model: {}", files.model.display());
    info!("✅ Tokenizer: {}", files.tokenizer.display());
    match files.pooling_config {
        Some(path) => info!("✅ Pooling config: {}", path.display()),
        None => info!("No pooling config in repo"),
    }
    Ok(())
}

async fn ping(url: &str, config: &ServiceConfig) -> Result<()> {
    let probe = HttpProbe::new(url, Duration::from_secs(config.keep_warm.timeout_secs))?;
    let health = probe.probe().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
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
