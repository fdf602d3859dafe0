use api_rest::{build_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the clinic development stack
///
/// Starts the in-memory REST backend the clinic clients talk to.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CLINIC_SEED`: set to `false` to start with empty tables (default: seeded demo data)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_run=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let seed = std::env::var("CLINIC_SEED").map_or(true, |v| v.trim() != "false");

    tracing::info!("++ Starting clinic REST on {}", rest_addr);

    let state = if seed {
        AppState::seeded().await
    } else {
        AppState::default()
    };

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
