// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Foreground daemon: coordinator plus admin API, stopped on ctrl-c.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use korra_core::application::{Coordinator, CoordinatorConfig};
use korra_core::presentation::api;

pub async fn run(host: &str, port: u16) -> Result<()> {
    let coordinator = Arc::new(Coordinator::new(CoordinatorConfig::default()));
    coordinator.start();
    info!(node_id = %coordinator.node_id(), "Coordinator running");

    let bind_host = if host == "localhost" { "127.0.0.1" } else { host };
    let addr = format!("{bind_host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind admin API to {addr}"))?;

    println!("{}", format!("KORRA coordinator listening on {addr}").green());

    let app = api::app(coordinator.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Interrupt received, shutting down");
        })
        .await
        .context("Admin API server failed")?;

    coordinator.stop().await;
    println!("{}", "Coordinator stopped".yellow());

    Ok(())
}
