//! # Retrieval-Augmented Text-to-SQL
//!
//! This crate provides a client that converts natural language questions
//! into SQL statements. Each prediction retrieves relevant table schemas
//! from a vector index, assembles the prompt the SQL model was fine-tuned
//! against, sends it to a hosted completion endpoint, and extracts the
//! generated SQL from the completion text.

pub mod deploy;
pub mod errors;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::PredictError;
pub use types::{
    ChatMessage, PredictRequest, PredictResponse, SqlRagClient, SqlRagClientBuilder, TableContext,
    CONTEXT_COLUMNS, NUM_CONTEXT_RESULTS,
};

use prompts::{build_prompt, extract_sql, render_table_context};
use serde_json::Value;
use tracing::{debug, info};

impl SqlRagClient {
    /// Generates a SQL statement answering `question`.
    ///
    /// This is the primary entry point: it retrieves schema context,
    /// builds the generation prompt, calls the completion endpoint, and
    /// extracts the SQL statement from the completion. The call is
    /// stateless; nothing outlives it except the collaborator handles
    /// configured at construction.
    pub async fn predict(&self, question: &str) -> Result<String, PredictError> {
        if question.trim().is_empty() {
            return Err(PredictError::EmptyQuestion);
        }

        info!("[predict] received question: {question:?}");

        let schema_context = self.retrieve_context(question).await?;
        let prompt = build_prompt(question, &schema_context);

        debug!(%prompt, "--> Sending prompt to completion endpoint");

        self.generate_sql(&prompt).await
    }

    /// Generates a SQL statement from a typed chat-style request.
    ///
    /// The question is the content of the request's first `user` message;
    /// the result is wrapped in the wire response shape.
    pub async fn predict_request(
        &self,
        request: &PredictRequest,
    ) -> Result<PredictResponse, PredictError> {
        let question = request.question().ok_or(PredictError::EmptyQuestion)?;
        let generated_sql = self.predict(question).await?;
        Ok(PredictResponse {
            generated_sql: vec![generated_sql],
        })
    }

    /// Generates a SQL statement from a raw JSON payload.
    ///
    /// This allows for easy integration with APIs that receive JSON
    /// payloads directly.
    pub async fn predict_from_value(&self, value: Value) -> Result<PredictResponse, PredictError> {
        let request: PredictRequest = serde_json::from_value(value)?;
        self.predict_request(&request).await
    }

    /// Retrieves the table-schema context relevant to `question`.
    ///
    /// Issues a similarity search against the vector index for the five
    /// nearest tables and renders them as one labeled text block, in the
    /// order the index ranked them.
    pub async fn retrieve_context(&self, question: &str) -> Result<String, PredictError> {
        let rows = self
            .vector_index
            .similarity_search(question, &CONTEXT_COLUMNS, NUM_CONTEXT_RESULTS)
            .await?;

        let tables = rows
            .into_iter()
            .map(|row| -> Result<TableContext, PredictError> {
                let [table_name, create_table_statement, table_description]: [String; 3] =
                    row.try_into().map_err(|row: Vec<String>| {
                        PredictError::RetrievalMalformedRow(format!(
                            "expected {} columns, got {}",
                            CONTEXT_COLUMNS.len(),
                            row.len()
                        ))
                    })?;
                Ok(TableContext {
                    table_name,
                    create_table_statement,
                    table_description,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Retrieved {} tables for context", tables.len());

        Ok(render_table_context(&tables))
    }

    /// Sends the prompt to the completion endpoint and extracts the SQL
    /// statement from the first candidate's text.
    async fn generate_sql(&self, prompt: &str) -> Result<String, PredictError> {
        let completion = self.completion_provider.complete(prompt).await?;

        debug!("<-- Completion text: {completion}");

        extract_sql(&completion)
    }
}
