//! Mock language model for tests.
//!
//! Returns pre-scripted responses in order. An exhausted queue is an error,
//! so a test that makes an unscripted call fails loudly instead of passing
//! on a default. Calls are recorded for verification.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{
    CompletionRequest, CompletionResponse, FinishReason, LanguageModel, ModelError, ProviderInfo,
};

#[derive(Debug, Clone)]
enum Scripted {
    Success {
        content: String,
        finish_reason: FinishReason,
    },
    Failure(ModelError),
}

/// Scripted mock implementation of [`LanguageModel`].
#[derive(Debug, Clone, Default)]
pub struct MockModel {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(Scripted::Success {
            content: content.into(),
            finish_reason: FinishReason::Stop,
        });
        self
    }

    /// Queues a successful response with an explicit finish reason.
    pub fn with_finish_reason(
        self,
        content: impl Into<String>,
        finish_reason: FinishReason,
    ) -> Self {
        self.push(Scripted::Success {
            content: content.into(),
            finish_reason,
        });
        self
    }

    /// Queues an unavailable-backend error.
    pub fn with_unavailable(self) -> Self {
        self.with_error(ModelError::unavailable("mock backend down"))
    }

    /// Queues an arbitrary error.
    pub fn with_error(self, error: ModelError) -> Self {
        self.push(Scripted::Failure(error));
        self
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded requests, in call order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, response: Scripted) {
        self.responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ModelError> {
        self.calls.lock().unwrap().push(request);

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Success {
                content,
                finish_reason,
            }) => Ok(CompletionResponse {
                content,
                model: "mock-model".to_string(),
                finish_reason,
            }),
            Some(Scripted::Failure(error)) => Err(error),
            None => Err(ModelError::InvalidRequest(
                "mock response queue exhausted".to_string(),
            )),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model")
    }
}
