use std::net::SocketAddrV4;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or(EnvFilter::new("info,hyper_util=warn,reqwest=warn,rustls=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

pub fn init_metrics() -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener("0.0.0.0:9002".parse::<SocketAddrV4>().unwrap())
        .install()
}
