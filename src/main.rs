use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use hith_core::{DashboardService, Dataset, config_from_env_values};

/// Main entry point for the HITH explainability server
///
/// Loads the patient fixture once, then serves the read-only REST API with
/// OpenAPI/Swagger documentation at `/swagger-ui`.
///
/// # Environment Variables
/// - `HITH_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HITH_FIXTURE_PATH`: Patient fixture file (default: "data.json")
/// - `HITH_SNIPPET_LIMIT`: Characters shown per note snippet (default: 300)
/// - `HITH_TOP_FEATURES`: Feature importances shown per patient (default: 50)
/// - `HITH_LAYOUT_SEED`: Seed for the concept-graph layout (default: 42)
/// - `HITH_KEY_TERMS`: Fallback impact phrases, e.g. `pneumonia:+,stable:+,sepsis:-`
///
/// # Errors
/// Returns an error if:
/// - a configuration value is malformed,
/// - the fixture cannot be read or does not match the expected schema, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hith=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config_from_env_values(
        std::env::var("HITH_FIXTURE_PATH").ok(),
        std::env::var("HITH_SNIPPET_LIMIT").ok(),
        std::env::var("HITH_TOP_FEATURES").ok(),
        std::env::var("HITH_LAYOUT_SEED").ok(),
        std::env::var("HITH_KEY_TERMS").ok(),
    )?;
    let dataset = Dataset::load(&cfg)?;
    if dataset.is_empty() {
        tracing::warn!("fixture {} contains no patients", cfg.fixture_path().display());
    }

    let rest_addr = std::env::var("HITH_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("++ Starting HITH REST on {}", rest_addr);

    let app = api_rest::router(AppState {
        service: DashboardService::new(Arc::new(cfg), Arc::new(dataset)),
    });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
