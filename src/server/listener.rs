use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::server::access_log::AccessLog;
use crate::server::event_loop::EventLoop;

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    let access_log = match &cfg.server.access_log {
        Some(path) => AccessLog::open(path).await?,
        None => AccessLog::disabled(),
    };

    info!(
        connections = cfg.limits.connections,
        idle_timeout_ms = cfg.limits.idle_timeout_ms,
        "Serving"
    );

    EventLoop::new(listener, cfg, access_log).run().await
}
