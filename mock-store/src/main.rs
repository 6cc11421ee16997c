use anyhow::Context;
use mock_store::MockConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDR: &str = "0.0.0.0:3002";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter("mock_store=debug,tower_http=info")
        .init();

    let addr: SocketAddr = std::env::var("MOCK_STORE_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .context("parsing MOCK_STORE_ADDR")?;

    let delay_ms: u64 = match std::env::var("MOCK_STORE_DELAY_MS") {
        Ok(v) => v.parse().context("parsing MOCK_STORE_DELAY_MS")?,
        Err(_) => 1,
    };

    let config = MockConfig {
        delay: Duration::from_millis(delay_ms),
        jitter: Some(Duration::from_millis(delay_ms) / 4),
        ..Default::default()
    };

    tracing::info!("Mock store listening on {addr}");
    mock_store::run(addr, config).await?;
    Ok(())
}
