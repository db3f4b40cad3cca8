//! Generation-client abstraction for the two pipeline stages.
//!
//! The [`Generator`] trait decouples pipeline orchestration from the actual
//! provider backends. Tests use scripted generators that return canned text
//! without touching the network.

use thiserror::Error;

/// Errors from a generation backend.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A single generation request.
#[derive(Debug, Clone)]
pub struct GenRequest<'a> {
    /// Role instruction for the model (used by the processor stage).
    pub system: Option<&'a str>,
    /// The prompt text itself.
    pub prompt: &'a str,
}

/// Abstraction over text-generation backends.
pub trait Generator {
    /// Identifier of the model serving the requests.
    fn model_id(&self) -> &str;

    /// Produce text for the request, or a typed error. No retries.
    fn generate(&self, request: &GenRequest<'_>) -> Result<String, GenerateError>;
}
