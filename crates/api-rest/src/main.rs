//! Standalone development backend binary.
//!
//! Serves the clinic admin REST API from memory, preloaded with demo data.
//!
//! # Environment Variables
//! - `CLINIC_REST_ADDR`: Server address (default: "0.0.0.0:3000")

use api_rest::{build_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("-- Starting clinic development API on {}", addr);

    let app = build_router(AppState::seeded().await);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
