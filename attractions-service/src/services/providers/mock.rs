//! Mock provider for testing.

use super::{
    FinishReason, GenerationParams, ModelProvider, ProviderError, ProviderResponse,
    UploadedDocument,
};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// What `generate` answers with.
#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Empty,
    Fail(String),
}

/// A document captured by `upload_document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockUpload {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct Calls {
    uploads: Vec<MockUpload>,
    prompts: Vec<String>,
    params: Vec<GenerationParams>,
    deleted: Vec<String>,
}

/// Canned-response provider that records every call.
pub struct MockProvider {
    reply: Reply,
    finish_reason: FinishReason,
    generate_delay: Option<Duration>,
    upload_failure: Option<String>,
    delete_failure: Option<String>,
    healthy: bool,
    calls: Mutex<Calls>,
}

impl MockProvider {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            finish_reason: FinishReason::Complete,
            generate_delay: None,
            upload_failure: None,
            delete_failure: None,
            healthy: true,
            calls: Mutex::new(Calls::default()),
        }
    }

    /// Respond to every generation with `text`.
    pub fn responding(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Text(text.into()))
    }

    /// Respond with a candidate that has no text part.
    pub fn responding_without_text() -> Self {
        Self::with_reply(Reply::Empty)
    }

    /// Fail every generation with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    /// Fail uploads with an API error carrying `message`.
    pub fn with_upload_failure(mut self, message: impl Into<String>) -> Self {
        self.upload_failure = Some(message.into());
        self
    }

    /// Fail deletions with an API error carrying `message`.
    pub fn with_delete_failure(mut self, message: impl Into<String>) -> Self {
        self.delete_failure = Some(message.into());
        self
    }

    /// Report `reason` as the finish reason of every generation.
    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = reason;
        self
    }

    /// Sleep for `delay` before answering a generation.
    pub fn with_generate_delay(mut self, delay: Duration) -> Self {
        self.generate_delay = Some(delay);
        self
    }

    /// Fail `health_check`.
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    fn calls(&self) -> MutexGuard<'_, Calls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn uploads(&self) -> Vec<MockUpload> {
        self.calls().uploads.clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls().prompts.clone()
    }

    pub fn params(&self) -> Vec<GenerationParams> {
        self.calls().params.clone()
    }

    /// Names passed to `delete_document`, including failed attempts.
    pub fn deleted(&self) -> Vec<String> {
        self.calls().deleted.clone()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        _display_name: &str,
    ) -> Result<UploadedDocument, ProviderError> {
        if let Some(message) = &self.upload_failure {
            return Err(ProviderError::ApiError(message.clone()));
        }

        let mut calls = self.calls();
        let name = format!("files/mock-{}", calls.uploads.len() + 1);
        calls.uploads.push(MockUpload {
            name: name.clone(),
            mime_type: mime_type.to_string(),
            bytes,
        });

        Ok(UploadedDocument {
            uri: format!("mock://{}", name),
            name,
            mime_type: mime_type.to_string(),
        })
    }

    async fn generate(
        &self,
        prompt: &str,
        _documents: &[UploadedDocument],
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        {
            let mut calls = self.calls();
            calls.prompts.push(prompt.to_string());
            calls.params.push(params.clone());
        }

        if let Some(delay) = self.generate_delay {
            tokio::time::sleep(delay).await;
        }

        let text = match &self.reply {
            Reply::Text(text) => Some(text.clone()),
            Reply::Empty => None,
            Reply::Fail(message) => return Err(ProviderError::ApiError(message.clone())),
        };

        Ok(ProviderResponse {
            text,
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: 10,
            finish_reason: self.finish_reason,
        })
    }

    async fn delete_document(&self, name: &str) -> Result<(), ProviderError> {
        self.calls().deleted.push(name.to_string());

        match &self.delete_failure {
            Some(message) => Err(ProviderError::ApiError(message.clone())),
            None => Ok(()),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured("mock marked unhealthy".to_string()))
        }
    }
}
