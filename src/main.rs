use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use api_shared::auth::api_key_from_env_value;
use hps_core::{
    open_store, patient_data_dir_from_env_value, store_backend_from_env_value, CoreConfig,
    PatientService,
};

/// Main entry point for the hospital patient service.
///
/// Resolves configuration once from the environment, opens the configured patient store and
/// serves the REST API.
///
/// # Environment Variables
/// - `HPS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory for patient data storage (default: "patient_data")
/// - `PATIENT_STORE`: `file` or `memory` (default: "file")
/// - `API_KEY`: when set and not blank, required in the `x-api-key` header on every `/api/v1` route
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the patient store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hps_run=info".parse()?)
                .add_directive("hps_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HPS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        patient_data_dir_from_env_value(std::env::var("PATIENT_DATA_DIR").ok()),
        store_backend_from_env_value(std::env::var("PATIENT_STORE").ok())?,
    )?;
    let store = open_store(&cfg)?;
    tracing::info!(
        "++ Patient store: {:?} ({})",
        cfg.store_backend(),
        cfg.patient_data_dir().display()
    );

    let api_key = api_key_from_env_value(std::env::var("API_KEY").ok());
    if api_key.is_none() {
        tracing::warn!("API_KEY not set or blank; /api/v1 routes are unauthenticated");
    }

    let state = AppState::new(PatientService::new(Arc::clone(&store)), api_key);
    let app = api_rest::router(state);

    tracing::info!("++ Starting HPS REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
