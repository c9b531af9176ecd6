// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! The `serve` command: composition root for a triage node. Builds the
//! model, channel, stores, monitor and pipeline, then runs the HTTP API
//! and the scheduler until ctrl-c.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use triage_core::application::clock::SystemClock;
use triage_core::application::intake::TriagePipeline;
use triage_core::application::learning::LearningStore;
use triage_core::application::monitor::CaseMonitor;
use triage_core::application::policy::FollowUpPolicyEngine;
use triage_core::application::scheduler::MonitorScheduler;
use triage_core::domain::config::{resolve_secret, TriageConfig};
use triage_core::infrastructure::model::model_from_config;
use triage_core::infrastructure::notify::channel_from_config;
use triage_core::infrastructure::{PdfReportRenderer, SniffingExtractor};
use triage_core::presentation::api::{app, AppState};

pub async fn run(config: TriageConfig) -> Result<()> {
    let escalation_target = match resolve_secret(
        &Some(config.notification.escalation_target.clone()),
        "escalation target",
    ) {
        Ok(target) => target,
        // The log channel needs no real address; paging channels do.
        Err(e) if config.notification.channel == "log" => {
            warn!(error = %e, "no escalation target configured; alerts go to the log only");
            "on-call".to_string()
        }
        Err(e) => return Err(e),
    };

    let model = model_from_config(&config.model)?;
    let notifier = channel_from_config(&config.notification)?;
    let renderer = Arc::new(
        PdfReportRenderer::new(config.reports_dir.clone())
            .context("failed to create reports directory")?,
    );

    let clock = Arc::new(SystemClock);
    let learning = Arc::new(LearningStore::new());
    let policy = Arc::new(FollowUpPolicyEngine::new(
        model.clone(),
        Arc::clone(&learning),
    ));
    let monitor = Arc::new(CaseMonitor::new(
        config.monitoring.clone(),
        policy,
        Arc::clone(&learning),
        notifier.clone(),
        escalation_target.clone(),
        clock.clone(),
    ));
    let pipeline = Arc::new(TriagePipeline::new(
        model,
        notifier,
        renderer,
        escalation_target,
    ));

    if let Err(e) = metrics_exporter_prometheus::PrometheusBuilder::new().install() {
        warn!(error = %e, "prometheus exporter unavailable; continuing without metrics");
    }

    let shutdown = CancellationToken::new();
    let scheduler = MonitorScheduler::new(
        Arc::clone(&monitor),
        clock,
        config.scheduler_poll_interval,
    );
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown.clone()));

    let state = Arc::new(AppState {
        pipeline,
        monitor,
        extractor: Arc::new(SniffingExtractor::new()),
        reports_dir: config.reports_dir.clone(),
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "MedAssist triage node listening");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                }
                _ = server_shutdown.cancelled() => {}
            }
        })
        .await?;

    shutdown.cancel();
    scheduler_handle.await.ok();
    info!("MedAssist triage node stopped");
    Ok(())
}
