// metrics/mod.rs
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use tracing::info;

/// Installs the global recorder and serves `/metrics` on `port`.
pub fn setup_metrics(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!(%addr, "metrics exporter listening");
    Ok(())
}
