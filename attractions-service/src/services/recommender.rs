//! Attraction recommendations.
//!
//! One request: log it, upload the log as context, run a schema-constrained
//! generation, delete the upload, then validate and decode the response.

use crate::models::{Attraction, AttractionList, ResponseSchema, SchemaViolation};
use crate::services::prompt::build_instruction;
use crate::services::providers::{
    FinishReason, GenerationParams, ModelProvider, ProviderError, UploadedDocument,
};
use crate::services::request_log::RequestLog;
use std::sync::Arc;
use thiserror::Error;

/// MIME type declared for the uploaded log.
pub const CSV_MIME_TYPE: &str = "text/csv";

const CONTEXT_DISPLAY_NAME: &str = "search-history.csv";

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Caller input is unusable.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to read search history: {0}")]
    Context(#[from] std::io::Error),

    #[error("Model provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Model returned malformed JSON: {0}")]
    MalformedResponse(String),

    #[error("Model response does not match schema: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    #[error("Model response was cut off at the output token limit")]
    Truncated,
}

/// Owns an uploaded document until it is deleted.
///
/// Dropping the guard without `release` (the request future was cancelled)
/// schedules the deletion on the runtime instead.
struct UploadGuard {
    provider: Arc<dyn ModelProvider>,
    document: UploadedDocument,
    released: bool,
}

impl UploadGuard {
    fn new(provider: Arc<dyn ModelProvider>, document: UploadedDocument) -> Self {
        Self {
            provider,
            document,
            released: false,
        }
    }

    fn document(&self) -> &UploadedDocument {
        &self.document
    }

    async fn release(mut self) {
        delete_upload(self.provider.as_ref(), &self.document).await;
        self.released = true;
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let provider = Arc::clone(&self.provider);
        let document = self.document.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(
                    document = %document.name,
                    "Deleting upload of abandoned request"
                );
                handle.spawn(async move {
                    delete_upload(provider.as_ref(), &document).await;
                });
            }
            Err(_) => tracing::warn!(
                document = %document.name,
                "No runtime available to delete uploaded context document"
            ),
        }
    }
}

/// Best-effort deletion of a transient upload.
async fn delete_upload(provider: &dyn ModelProvider, document: &UploadedDocument) {
    if let Err(e) = provider.delete_document(&document.name).await {
        tracing::warn!(
            document = %document.name,
            error = %e,
            "Failed to delete uploaded context document"
        );
    }
}

pub struct RecommendationService {
    provider: Arc<dyn ModelProvider>,
    request_log: RequestLog,
    schema: ResponseSchema,
    model: String,
}

impl RecommendationService {
    /// `model` is only used for logging; the provider owns the model choice.
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        request_log: RequestLog,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            request_log,
            schema: ResponseSchema::attraction_list(),
            model: model.into(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn ModelProvider> {
        &self.provider
    }

    pub fn request_log(&self) -> &RequestLog {
        &self.request_log
    }

    /// Recommend attractions for `location`, steered by `prompt`.
    ///
    /// The returned order is the model's; nothing is deduplicated or counted.
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn recommend(
        &self,
        location: &str,
        prompt: &str,
    ) -> Result<Vec<Attraction>, RecommendError> {
        if location.trim().is_empty() {
            return Err(RecommendError::InvalidInput(
                "key_project must not be empty".to_string(),
            ));
        }

        self.request_log.append(location, prompt).await;

        let context = self.request_log.load_context().await?;
        tracing::debug!(
            history_rows = context.rows,
            size = context.bytes.len(),
            "Loaded search history"
        );

        let document = self
            .provider
            .upload_document(context.bytes, CSV_MIME_TYPE, CONTEXT_DISPLAY_NAME)
            .await?;
        let upload = UploadGuard::new(Arc::clone(&self.provider), document);

        let instruction = build_instruction(location, prompt);
        let params = GenerationParams::json(self.schema.to_provider_schema());
        let generated = self
            .provider
            .generate(&instruction, std::slice::from_ref(upload.document()), &params)
            .await;

        upload.release().await;

        let response = generated?;
        if response.finish_reason == FinishReason::Length {
            return Err(RecommendError::Truncated);
        }
        let text = response.text.ok_or_else(|| {
            RecommendError::MalformedResponse("response contained no text".to_string())
        })?;
        let attractions = self.parse_attractions(&text)?;

        tracing::info!(
            attraction_count = attractions.len(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Generated attraction recommendations"
        );

        Ok(attractions)
    }

    fn parse_attractions(&self, text: &str) -> Result<Vec<Attraction>, RecommendError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| RecommendError::MalformedResponse(e.to_string()))?;

        self.schema.validate(&value)?;

        let list: AttractionList = serde_json::from_value(value)
            .map_err(|e| RecommendError::MalformedResponse(e.to_string()))?;
        Ok(list.attractions)
    }
}
