//! Text generation backends.
//!
//! The pipeline talks to an injected [`TextGenerator`]; this module selects
//! and constructs the concrete backend from configuration. `Offline` yields
//! no generator at all, which routes every attempt to the copywriter's
//! deterministic fallback.

mod openai_compatible;
mod provider;

pub use openai_compatible::OpenAiCompatibleGenerator;
pub use provider::TextGenerator;

use std::sync::Arc;

use crate::config::{LlmBackend, LlmConfig};
use crate::error::GenerationError;

/// Create a text generator based on configuration.
///
/// Returns `None` for the offline backend: the copywriter then skips the
/// network entirely and uses its template fallback.
pub fn create_generator(
    config: &LlmConfig,
) -> Result<Option<Arc<dyn TextGenerator>>, GenerationError> {
    match config.backend {
        LlmBackend::Offline => {
            tracing::info!("Text generation disabled (offline backend)");
            Ok(None)
        }
        LlmBackend::OpenAiCompatible => {
            tracing::info!(
                "Using OpenAI-compatible endpoint (base_url: {}, model: {})",
                config.base_url,
                config.model
            );
            Ok(Some(Arc::new(OpenAiCompatibleGenerator::new(
                config.clone(),
            )?)))
        }
    }
}
