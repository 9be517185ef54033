//! # sqlrag-server
//!
//! An HTTP service exposing the text-to-SQL pipeline. `POST /predict`
//! accepts a chat-style payload and returns the generated SQL.

pub mod config;
mod errors;

use crate::{config::AppConfig, errors::AppError};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use sqlrag::{
    providers::{ai::serving::ServingEndpointProvider, vector::databricks::DatabricksVectorIndex},
    PredictResponse, SqlRagClient, SqlRagClientBuilder,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// The shared application state.
///
/// Holds the `SqlRagClient`, which is shared across all handlers; the
/// client itself is stateless per call.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<SqlRagClient>,
}

/// Builds the shared application state from the configuration.
///
/// This wires the vector index and serving endpoint collaborators into
/// the pipeline client.
pub fn build_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let vector_index = DatabricksVectorIndex::new(
        config.workspace_url.clone(),
        config.workspace_token.clone(),
        config.vector_search_endpoint.clone(),
        config.vector_index_name.clone(),
    )?;

    let completion_provider = ServingEndpointProvider::new(
        config.workspace_url.clone(),
        config.workspace_token.clone(),
        config.llm_endpoint.clone(),
    )?;

    let client = SqlRagClientBuilder::new()
        .vector_index(Box::new(vector_index))
        .completion_provider(Box::new(completion_provider))
        .build()?;

    Ok(AppState {
        client: Arc::new(client),
    })
}

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/predict", post(predict_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

/// The root handler.
async fn root() -> &'static str {
    "sqlrag server is running."
}

/// The health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// The handler for the `POST /predict` endpoint.
///
/// Takes a chat-style JSON payload, runs the retrieval-augmented pipeline,
/// and returns the generated SQL.
async fn predict_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<PredictResponse>, AppError> {
    info!("Received predict payload: '{}'", payload);

    let response = app_state.client.predict_from_value(payload).await?;

    Ok(Json(response))
}

/// The main entry point for running the server.
pub async fn run(listener: tokio::net::TcpListener, config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Server configuration loaded");

    let app_state = build_app_state(&config)?;
    let app = create_router(app_state);

    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
