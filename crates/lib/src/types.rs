use crate::{
    errors::PredictError,
    providers::{ai::CompletionProvider, vector::VectorIndex},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The number of nearest tables retrieved from the vector index per question.
pub const NUM_CONTEXT_RESULTS: u32 = 5;

/// The metadata columns requested from the vector index, in render order.
pub const CONTEXT_COLUMNS: [&str; 3] = ["TableName", "CreateTableStatement", "TableDescription"];

/// A client that turns natural-language questions into SQL statements by
/// combining vector-index retrieval with a hosted completion endpoint.
pub struct SqlRagClient {
    pub(crate) vector_index: Box<dyn VectorIndex>,
    pub(crate) completion_provider: Box<dyn CompletionProvider>,
}

impl fmt::Debug for SqlRagClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlRagClient")
            .field("vector_index", &self.vector_index)
            .field("completion_provider", &self.completion_provider)
            .finish()
    }
}

/// A builder for creating `SqlRagClient` instances.
///
/// Both collaborators are configured once here and shared by every
/// subsequent `predict` call.
#[derive(Default)]
pub struct SqlRagClientBuilder {
    vector_index: Option<Box<dyn VectorIndex>>,
    completion_provider: Option<Box<dyn CompletionProvider>>,
}

impl SqlRagClientBuilder {
    /// Creates a new `SqlRagClientBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the vector index used for schema retrieval.
    pub fn vector_index(mut self, vector_index: Box<dyn VectorIndex>) -> Self {
        self.vector_index = Some(vector_index);
        self
    }

    /// Sets the completion provider used for SQL generation.
    pub fn completion_provider(mut self, provider: Box<dyn CompletionProvider>) -> Self {
        self.completion_provider = Some(provider);
        self
    }

    /// Builds the `SqlRagClient`.
    ///
    /// Returns an error if either collaborator is missing.
    pub fn build(self) -> Result<SqlRagClient, PredictError> {
        let vector_index = self.vector_index.ok_or(PredictError::MissingVectorIndex)?;
        let completion_provider = self
            .completion_provider
            .ok_or(PredictError::MissingCompletionProvider)?;
        Ok(SqlRagClient {
            vector_index,
            completion_provider,
        })
    }
}

/// One table's metadata as retrieved from the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableContext {
    pub table_name: String,
    pub create_table_statement: String,
    pub table_description: String,
}

/// A single message in a chat-style request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A typed prediction request.
///
/// This replaces loose dictionary payloads with named fields. The question
/// is the content of the first `user` message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl PredictRequest {
    /// Convenience constructor for a single-question request.
    pub fn from_question(question: &str) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: question.to_string(),
            }],
        }
    }

    /// Returns the question carried by this request, i.e. the content of
    /// the first `user` message.
    pub fn question(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

/// The prediction result as served over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub generated_sql: Vec<String>,
}
