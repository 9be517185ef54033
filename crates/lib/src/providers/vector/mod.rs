pub mod databricks;

use crate::errors::PredictError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for querying a managed nearest-neighbor search service over
/// embedded text rows.
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug + DynClone {
    /// Runs a similarity search for `query_text` and returns up to
    /// `num_results` rows, each an ordered tuple of string cells aligned
    /// to `columns`. Row order is the index's own ranking.
    async fn similarity_search(
        &self,
        query_text: &str,
        columns: &[&str],
        num_results: u32,
    ) -> Result<Vec<Vec<String>>, PredictError>;
}

dyn_clone::clone_trait_object!(VectorIndex);
