use thiserror::Error;

/// Custom error types for the text-to-SQL pipeline.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to the vector index: {0}")]
    RetrievalRequest(reqwest::Error),
    #[error("Vector index returned an error: {0}")]
    RetrievalApi(String),
    #[error("Failed to deserialize vector index response: {0}")]
    RetrievalDeserialization(reqwest::Error),
    #[error("Vector index returned a malformed row: {0}")]
    RetrievalMalformedRow(String),
    #[error("Failed to send request to the completion endpoint: {0}")]
    GenerationRequest(reqwest::Error),
    #[error("Completion endpoint returned an error: {0}")]
    GenerationApi(String),
    #[error("Failed to deserialize completion endpoint response: {0}")]
    GenerationDeserialization(reqwest::Error),
    #[error("Completion endpoint returned no choices")]
    EmptyCompletion,
    #[error("Completion text is missing the `{0}` marker")]
    MarkerNotFound(&'static str),
    #[error("A vector index is required")]
    MissingVectorIndex,
    #[error("A completion provider is required")]
    MissingCompletionProvider,
    #[error("Question must not be empty")]
    EmptyQuestion,
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}
