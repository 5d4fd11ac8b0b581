// src/main.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use host_sensors::checks::{build_check, CheckContext};
use host_sensors::config::{self, SensorConfig};
use host_sensors::Payload;
use serde::Serialize;
use tokio::signal;
use tracing::{error, info, warn};

/// One line of output per sensor.
#[derive(Debug, Serialize)]
struct Report<'a> {
    sensor: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, reports to stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("host_sensors=debug".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let checks = config
        .sensors
        .iter()
        .map(|sensor| build_check(sensor).map(|check| (sensor, check)))
        .collect::<Result<Vec<_>, _>>()?;

    // Cancel in-flight probes on Ctrl+C / SIGTERM
    let (root, cancel) = CheckContext::with_cancel();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    let timeout = config.check_timeout();
    info!(sensors = checks.len(), ?timeout, "Running sensor checks");

    let runs = checks.iter().map(|(sensor, check)| {
        let ctx = root.child_with_timeout(timeout);
        async move {
            let result = check.run(&ctx).await;
            to_report(sensor, result)
        }
    });
    let reports = futures::future::join_all(runs).await;

    let mut failed = 0;
    for report in &reports {
        if report.error.is_some() {
            failed += 1;
        }
        println!("{}", serde_json::to_string(report)?);
    }

    info!(
        "Sensor checks complete: {} succeeded, {} failed",
        reports.len() - failed,
        failed
    );

    if failed > 0 {
        anyhow::bail!("{} of {} sensor checks failed", failed, reports.len());
    }
    Ok(())
}

fn to_report<'a>(sensor: &'a SensorConfig, result: host_sensors::Result<Payload>) -> Report<'a> {
    let (payload, error) = match result {
        Ok(payload) => (Some(payload), None),
        Err(e) => {
            if e.is_config_error() {
                error!(sensor = %sensor.name, "Sensor is misconfigured: {}", e);
            } else {
                error!(sensor = %sensor.name, "Sensor check failed: {}", e);
            }
            (None, Some(e.to_string()))
        }
    };

    Report {
        sensor: &sensor.name,
        kind: sensor.kind.type_name(),
        checked_at: Utc::now(),
        payload,
        error,
    }
}

// Resolves on the first shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install signal handler: {}", e);
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

    info!("Shutdown signal received, cancelling checks");
}
