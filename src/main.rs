use httpd::config::Config;
use httpd::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let mut cfg = Config::load()?;

    if let Some(port) = std::env::args().nth(1) {
        let port: u16 = port
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid port argument: {}", port))?;
        cfg = cfg.with_port(port);
    }

    tokio::select! {
        res = server::listener::run(&cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
