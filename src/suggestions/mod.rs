//! AI suggestions for the free-text situation fields.

pub mod adapter;
pub mod openai;
pub mod prompts;

pub use adapter::{SuggestionAdapter, SuggestionOutcome};
pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::TransportError;

/// External text-generation collaborator.
///
/// `Ok(None)` means the service answered but produced no usable text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        api_key: &SecretString,
    ) -> Result<Option<String>, TransportError>;
}
