/*!
 * Provider implementations for the translation capability.
 *
 * - Anthropic: streaming Messages API client
 * - Mock: scripted provider for tests and dry runs
 */

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single text-generation request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt
    pub system: String,
    /// User message carrying the instructions and the text
    pub user_message: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    #[serde(default)]
    pub input_tokens: u32,
    /// Number of output tokens
    #[serde(default)]
    pub output_tokens: u32,
}

/// Fully accumulated provider output
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// Common trait for all LLM providers
///
/// Implementations may stream internally, but `complete` only returns once
/// the whole response has been received.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Completion, ProviderError>` - The accumulated response or an error
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Provider name for logs and reports
    fn name(&self) -> &str;
}

impl ProviderError {
    /// Whether the service rejected the request itself.
    ///
    /// Authentication failures and 4xx responses other than timeouts and
    /// rate limiting. Only consulted when early stopping is enabled.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::AuthenticationError(_) => true,
            Self::ApiError { status_code, .. } => {
                (400..500).contains(status_code) && *status_code != 408 && *status_code != 429
            }
            _ => false,
        }
    }
}

pub mod anthropic;
pub mod mock;
