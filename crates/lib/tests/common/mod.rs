#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared mock collaborators for exercising the pipeline without network
//! access. Both mocks record their call history so tests can assert on
//! the exact prompt or query each stage produced.

use async_trait::async_trait;
use sqlrag::providers::{ai::CompletionProvider, vector::VectorIndex};
use sqlrag::PredictError;
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

// --- Mock Completion Provider ---

#[derive(Clone, Debug)]
pub struct MockCompletionProvider {
    pub call_history: Arc<RwLock<Vec<String>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockCompletionProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String, PredictError> {
        self.call_history
            .write()
            .unwrap()
            .push(prompt.to_string());

        if let Some(response) = self.responses.write().unwrap().pop() {
            Ok(response)
        } else {
            Ok("[SQL]\nSELECT 1;</s>".to_string())
        }
    }
}

// --- Mock Vector Index ---

#[derive(Clone, Debug)]
pub struct MockVectorIndex {
    pub call_history: Arc<RwLock<Vec<(String, Vec<String>, u32)>>>,
    pub rows: Vec<Vec<String>>,
}

impl MockVectorIndex {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            rows,
        }
    }

    /// A single-table index holding the `farm` table's metadata.
    pub fn farm_table() -> Self {
        Self::new(vec![vec![
            "farm".to_string(),
            "CREATE TABLE farm (Farm_ID int, Year int, Total_Horses real, Working_Horses real, Total_Cattle real, Oxen real, Bulls real, Cows real)".to_string(),
            "Livestock counts per farm and year".to_string(),
        ]])
    }
}

#[async_trait]
impl VectorIndex for MockVectorIndex {
    async fn similarity_search(
        &self,
        query_text: &str,
        columns: &[&str],
        num_results: u32,
    ) -> Result<Vec<Vec<String>>, PredictError> {
        self.call_history.write().unwrap().push((
            query_text.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
            num_results,
        ));
        Ok(self.rows.clone())
    }
}

// --- Failing collaborators for error-path tests ---

#[derive(Clone, Debug)]
pub struct FailingVectorIndex;

#[async_trait]
impl VectorIndex for FailingVectorIndex {
    async fn similarity_search(
        &self,
        _query_text: &str,
        _columns: &[&str],
        _num_results: u32,
    ) -> Result<Vec<Vec<String>>, PredictError> {
        Err(PredictError::RetrievalApi("index offline".to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct FailingCompletionProvider;

#[async_trait]
impl CompletionProvider for FailingCompletionProvider {
    async fn complete(&self, _prompt: &str) -> Result<String, PredictError> {
        Err(PredictError::GenerationApi("endpoint offline".to_string()))
    }
}
