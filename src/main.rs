// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use clap::Parser;
use fabric_provisioner::{
    api,
    config::Config,
    context::Context,
    controller::{apic::ApicClient, memory::MemoryController, Controller},
    events::{EventPublisher, LogSink},
    store::MemoryStore,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    let config = Config::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("fabric-provisioner")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

fn init_tracing() {
    // Respects RUST_LOG, defaulting to INFO, and RUST_LOG_FORMAT=json|text
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(config: Config) -> Result<()> {
    init_tracing();
    info!("Starting fabric provisioner");
    config.validate()?;

    let controller: Arc<dyn Controller> = match config.apic() {
        Some(apic) if !config.dry_run => {
            info!(url = %apic.base_url, "Using fabric controller");
            Arc::new(ApicClient::new(apic)?)
        }
        _ => {
            warn!("Dry run: provisioning against an in-memory controller");
            Arc::new(MemoryController::new())
        }
    };

    let (events, worker) =
        EventPublisher::spawn(config.event_queue_capacity, Arc::new(LogSink));
    debug!(capacity = config.event_queue_capacity, "Event worker started");

    let ctx = Context::new(Arc::new(MemoryStore::new()), controller, events);
    let fabric = config.fabric();
    ctx.repos
        .fabrics
        .save(&fabric.id, &fabric)
        .await
        .context("cannot seed fabric")?;
    info!(
        fabric_id = %fabric.id,
        pod_id = %fabric.pod_id,
        switches = fabric.switch_ids.len(),
        "Fabric seeded"
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("cannot listen on {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "Serving Redfish fabric API");

    let served = axum::serve(listener, api::router(Arc::new(ctx)))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = &served {
        error!(error = %e, "HTTP server exited with an error");
    }
    worker.abort();
    info!("Fabric provisioner stopped");
    served.context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
