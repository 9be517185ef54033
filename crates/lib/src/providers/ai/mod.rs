pub mod serving;

use crate::errors::PredictError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a hosted text-completion service.
///
/// This defines a common interface for generating SQL completions from a
/// prompt, regardless of which serving stack hosts the model.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug + DynClone {
    /// Sends a prompt to the completion service and returns the first
    /// candidate's generated text.
    async fn complete(&self, prompt: &str) -> Result<String, PredictError>;
}

dyn_clone::clone_trait_object!(CompletionProvider);
