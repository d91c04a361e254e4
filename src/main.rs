use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canvas_sync::canvas::CanvasHttpClient;
use canvas_sync::config::CanvasConfig;
use canvas_sync::routes::router;
use canvas_sync::services::SyncScheduler;
use canvas_sync::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "canvas_sync=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CanvasConfig::new_from_env()?;
    let canvas = Arc::new(CanvasHttpClient::new(&config)?);
    let state = AppState::new(config.clone(), canvas);

    let scheduler = SyncScheduler::new(state.clone(), config.sync_interval_secs);
    scheduler.tick().await;
    tokio::spawn(scheduler.start());

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
