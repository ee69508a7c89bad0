use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use theatre_booking::{app, config::Config, AppState};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let filter = tracing_subscriber::EnvFilter::new(&config.app.rust_log);
    if config.app.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting Theatre Booking API ({})", config.app.environment);

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::new(host, config.app.port);

    let state = AppState::connect(config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialise application state: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app(state).into_make_service()).await?;
    Ok(())
}
