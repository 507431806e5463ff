use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder when enabled. Repeated calls (test
/// binaries share the process) keep the first handle.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        tracing::debug!("Prometheus exporter disabled");
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|err| anyhow::anyhow!("Prometheus recorder install failed: {err}"))?;
    let _ = RECORDER.set(handle);
    Ok(())
}

/// Renders the current scrape body, or `None` when no recorder is installed.
pub(crate) fn render() -> Option<String> {
    RECORDER.get().map(|handle| handle.render())
}
