use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlrag::PredictError;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within
/// the server, allowing them to be converted into appropriate HTTP
/// responses.
pub enum AppError {
    /// Errors originating from the `sqlrag` pipeline.
    Predict(PredictError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `PredictError` to `AppError`.
impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        AppError::Predict(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Predict(err) => {
                // Log the original error for debugging purposes
                error!("PredictError: {:?}", err);
                match err {
                    PredictError::MissingVectorIndex | PredictError::MissingCompletionProvider => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                    PredictError::EmptyQuestion => (
                        StatusCode::BAD_REQUEST,
                        "Request must contain a non-empty user question.".to_string(),
                    ),
                    PredictError::JsonSerialization(e) => (
                        StatusCode::BAD_REQUEST,
                        format!("Malformed request payload: {e}"),
                    ),
                    PredictError::RetrievalRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to vector index failed: {e}"),
                    ),
                    PredictError::RetrievalApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("Vector index error: {e}"))
                    }
                    PredictError::RetrievalDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize vector index response: {e}"),
                    ),
                    PredictError::RetrievalMalformedRow(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Vector index returned a malformed row: {e}"),
                    ),
                    PredictError::GenerationRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to completion endpoint failed: {e}"),
                    ),
                    PredictError::GenerationApi(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Completion endpoint error: {e}"),
                    ),
                    PredictError::GenerationDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize completion response: {e}"),
                    ),
                    PredictError::EmptyCompletion => (
                        StatusCode::BAD_GATEWAY,
                        "Completion endpoint returned no choices.".to_string(),
                    ),
                    PredictError::MarkerNotFound(marker) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Completion text is missing the `{marker}` marker."),
                    ),
                    PredictError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
