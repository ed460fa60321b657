//! Generative model provider abstraction.
//!
//! A provider offers three operations: upload a transient document, generate
//! content against uploaded documents, and delete the document again. The
//! Gemini implementation talks to the REST API; the mock is used in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Handle to a document uploaded to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    /// Resource name used for deletion, e.g. `files/abc123`.
    pub name: String,

    /// URI referenced from generation requests.
    pub uri: String,

    /// MIME type declared at upload.
    pub mime_type: String,
}

/// Result of a generation call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Concatenated text parts of the first candidate.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Finish reason.
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Generation parameters for a request.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Response MIME type, e.g. `application/json`.
    pub response_mime_type: Option<String>,

    /// Schema the response must conform to.
    pub response_schema: Option<Value>,
}

impl GenerationParams {
    /// JSON output constrained to `schema`.
    pub fn json(schema: Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
        }
    }
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Upload `bytes` as a transient document.
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedDocument, ProviderError>;

    /// Generate a response to `prompt` with `documents` as context.
    async fn generate(
        &self,
        prompt: &str,
        documents: &[UploadedDocument],
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Delete a previously uploaded document.
    async fn delete_document(&self, name: &str) -> Result<(), ProviderError>;

    /// Check that the provider is usable. Does not call the network.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
