use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jikanwari::api::router;
use jikanwari::state::AppState;
use jikanwari::store::CourseStore;
use jikanwari::vision::{HttpVisionClient, NoopVisionClient, VisionClient, VisionConfig, VisionGate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "jikanwari=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let vision: Arc<dyn VisionClient> = match VisionConfig::new_from_env() {
        Ok(config) => Arc::new(HttpVisionClient::new(config)?),
        Err(e) => {
            warn!("vision client disabled: {}", e);
            Arc::new(NoopVisionClient)
        }
    };

    let state = AppState {
        store: Arc::new(CourseStore::new()),
        vision,
        gate: VisionGate::new(),
    };

    let app = router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
