// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Keep-warm trigger
//!
//! Periodically calls the health method so the hosting platform never sees
//! the container as idle and deallocates it between real requests. The probe
//! is either the in-process service or a remote deployment's `/health`.

use crate::monitoring::ServiceMetrics;
use crate::service::{EmbeddingService, HealthStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepWarmConfig {
    /// Seconds between pings; 0 disables the task
    pub interval_secs: u64,
    /// Ping this deployment's `/health` instead of the local service
    pub url: Option<String>,
    /// Timeout for remote pings
    pub timeout_secs: u64,
}

impl Default for KeepWarmConfig {
    fn default() -> Self {
        Self {
            interval_secs: 240,
            url: None,
            timeout_secs: 30,
        }
    }
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> Result<HealthStatus>;

    /// Target description for logs
    fn target(&self) -> String;
}

/// Calls the health method of the in-process service
pub struct LocalProbe {
    service: EmbeddingService,
}

impl LocalProbe {
    pub fn new(service: EmbeddingService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl HealthProbe for LocalProbe {
    async fn probe(&self) -> Result<HealthStatus> {
        Ok(self.service.health())
    }

    fn target(&self) -> String {
        "local service".to_string()
    }
}

/// `GET {base_url}/health` on a remote deployment
pub struct HttpProbe {
    client: reqwest::Client,
    health_url: String,
}

impl HttpProbe {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build keep-warm HTTP client")?;

        Ok(Self {
            client,
            health_url: format!("{}/health", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.health_url))?
            .error_for_status()?;

        response
            .json::<HealthStatus>()
            .await
            .context("Invalid health response")
    }

    fn target(&self) -> String {
        self.health_url.clone()
    }
}

pub struct KeepWarm {
    probe: Arc<dyn HealthProbe>,
    period: Duration,
    metrics: Option<ServiceMetrics>,
}

impl KeepWarm {
    pub fn new(probe: Arc<dyn HealthProbe>, period: Duration) -> Self {
        Self {
            probe,
            period,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ServiceMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Builds the task described by `config`, or `None` when disabled
    pub fn from_config(config: &KeepWarmConfig, service: &EmbeddingService) -> Result<Option<Self>> {
        if config.interval_secs == 0 {
            return Ok(None);
        }

        let probe: Arc<dyn HealthProbe> = match &config.url {
            Some(url) => Arc::new(HttpProbe::new(url, Duration::from_secs(config.timeout_secs))?),
            None => Arc::new(LocalProbe::new(service.clone())),
        };

        Ok(Some(
            Self::new(probe, Duration::from_secs(config.interval_secs))
                .with_metrics(service.metrics().clone()),
        ))
    }

    /// One ping. Failures are logged, never propagated.
    pub async fn ping(&self) -> bool {
        let ok = match self.probe.probe().await {
            Ok(health) => {
                info!(
                    "Keep-warm ping: status={} model={} gpu={} dims={}",
                    health.status, health.model, health.gpu, health.dims
                );
                true
            }
            Err(e) => {
                warn!("Keep-warm ping to {} failed: {:#}", self.probe.target(), e);
                false
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_keep_warm(ok);
        }
        ok
    }

    /// Pings every period until `shutdown` is cancelled. The first ping comes
    /// one full period after start.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            "⏰ Keep-warm every {}s -> {}",
            self.period.as_secs(),
            self.probe.target()
        );

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Keep-warm stopped");
                    break;
                }
                _ = ticker.tick() => {
                    self.ping().await;
                }
            }
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
