//! Text generation trait.

use async_trait::async_trait;

use crate::error::GenerationError;

/// An opaque prompt-in/text-out generation capability.
///
/// The pipeline depends only on this trait, so the retry loop, ranker, and
/// guardian are testable without network access. Implementations must be
/// safe to share across concurrent runs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Get the model name.
    fn model_name(&self) -> &str;

    /// Generate a completion for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
