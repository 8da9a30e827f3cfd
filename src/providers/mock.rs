/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with translated text
 * - `MockProvider::failing_first(n)` - Fails n times, then succeeds
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::rejecting()` - Always fails with a 400 response
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Provider, TokenUsage};
use crate::translation::prompts::PROMPT_TEXT_SEPARATOR;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails the first N requests, then works
    FailFirst { failures: usize },
    /// Always fails with a retryable error
    Failing,
    /// Always fails with an authentication error
    Unauthorized,
    /// Always fails with a 400 response
    Rejecting,
    /// Returns an empty response
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Requests received, shared between clones
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fails `failures` times before succeeding
    pub fn failing_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that rejects the credentials
    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized)
    }

    /// Create a mock whose requests are always rejected as malformed
    pub fn rejecting() -> Self {
        Self::new(MockBehavior::Rejecting)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of the requests received
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// The text a working mock returns for `source`
    pub fn translated(source: &str) -> String {
        format!("[TRANSLATED] {}", source)
    }

    fn source_text(request: &CompletionRequest) -> &str {
        request
            .user_message
            .split_once(PROMPT_TEXT_SEPARATOR)
            .map_or(request.user_message.as_str(), |(_, text)| text)
    }

    fn success(request: &CompletionRequest) -> Completion {
        let source = Self::source_text(request);
        Completion {
            text: Self::translated(source),
            usage: TokenUsage {
                input_tokens: request.user_message.len() as u32,
                output_tokens: (source.len() / 2) as u32,
            },
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(Self::success(&request)),
            MockBehavior::FailFirst { failures } if count < failures => Err(ProviderError::ApiError {
                status_code: 529,
                message: format!("Simulated overload on request {}", count + 1),
            }),
            MockBehavior::FailFirst { .. } => Ok(Self::success(&request)),
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "invalid x-api-key".to_string(),
            )),
            MockBehavior::Rejecting => Err(ProviderError::ApiError {
                status_code: 400,
                message: "Simulated invalid request".to_string(),
            }),
            MockBehavior::Empty => Ok(Completion {
                text: String::new(),
                usage: TokenUsage::default(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
