/*!
 * Translation client: prompts, retries and usage accounting around a
 * [`Provider`].
 */

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use serde::Serialize;

use crate::errors::{ProviderError, TranslationError};
use crate::providers::{CompletionRequest, Provider, TokenUsage};
use crate::translation::prompts::{PromptTemplates, TranslationMode};
use crate::translation::retry::{RetryPolicy, Sleeper, TokioSleeper, retry_with_backoff};

/// Price per million tokens, in USD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input_per_mtok: f64,
    pub output_per_mtok: f64,
}

impl Pricing {
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        (usage.input_tokens as f64 * self.input_per_mtok + usage.output_tokens as f64 * self.output_per_mtok)
            / 1_000_000.0
    }
}

/// Token usage and estimated cost of one translation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UsageRecord {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_estimate_usd: f64,
}

impl UsageRecord {
    pub fn from_usage(usage: &TokenUsage, pricing: &Pricing) -> Self {
        Self {
            input_tokens: usage.input_tokens as u64,
            output_tokens: usage.output_tokens as u64,
            cost_estimate_usd: pricing.cost(usage),
        }
    }
}

/// A completed translation
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    pub usage: UsageRecord,
    /// Attempts it took
    pub attempts: u32,
}

/// Fixed generation parameters
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub target_language: String,
    /// Product name substituted into the prompts
    pub product: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Translates changelog text through a provider with retry and backoff
pub struct TranslationClient {
    provider: Arc<dyn Provider>,
    settings: GenerationSettings,
    prompts: PromptTemplates,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    pricing: Pricing,
    /// Give up on client errors instead of retrying them
    stop_on_client_errors: bool,
}

impl TranslationClient {
    pub fn new(
        provider: Arc<dyn Provider>,
        settings: GenerationSettings,
        prompts: PromptTemplates,
        retry: RetryPolicy,
        pricing: Pricing,
    ) -> Self {
        Self {
            provider,
            settings,
            prompts,
            retry,
            sleeper: Arc::new(TokioSleeper),
            pricing,
            stop_on_client_errors: false,
        }
    }

    /// Replace the sleeper used between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Stop retrying on authentication failures and other client errors.
    ///
    /// Off by default: every provider error is retried until the policy
    /// gives up.
    pub fn with_client_error_stop(mut self, enabled: bool) -> Self {
        self.stop_on_client_errors = enabled;
        self
    }

    /// Build the provider request for `text`
    pub fn build_request(&self, text: &str, mode: TranslationMode) -> CompletionRequest {
        CompletionRequest {
            system: self
                .prompts
                .system_prompt(&self.settings.target_language, &self.settings.product),
            user_message: self.prompts.user_message(
                mode,
                text,
                &self.settings.target_language,
                &self.settings.product,
            ),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Translate `text` using the instructions for `mode`
    pub async fn translate(&self, text: &str, mode: TranslationMode) -> Result<Translation, TranslationError> {
        let request = self.build_request(text, mode);
        info!(
            "Translating {} characters ({} mode) via {}",
            text.chars().count(),
            mode,
            self.provider.name()
        );
        let start = Instant::now();
        let stop_on_client_errors = self.stop_on_client_errors;

        let outcome = retry_with_backoff(
            &self.retry,
            self.sleeper.as_ref(),
            |error: &ProviderError| !(stop_on_client_errors && error.is_client_error()),
            |attempt| {
                let request = request.clone();
                let provider = Arc::clone(&self.provider);
                async move {
                    debug!("Translation attempt {}", attempt);
                    provider.complete(request).await.map(|completion| (completion, attempt))
                }
            },
        )
        .await;

        let (completion, attempts) = match outcome {
            Ok(value) => value,
            Err(failure) if failure.permanent => return Err(TranslationError::Provider(failure.error)),
            Err(failure) => {
                return Err(TranslationError::RetriesExhausted {
                    attempts: failure.attempts,
                    source: failure.error,
                });
            }
        };

        if completion.text.trim().is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        let usage = UsageRecord::from_usage(&completion.usage, &self.pricing);
        info!(
            "Translation finished in {:.1}s: {} input / {} output tokens, ~${:.3}",
            start.elapsed().as_secs_f64(),
            usage.input_tokens,
            usage.output_tokens,
            usage.cost_estimate_usd
        );

        Ok(Translation {
            text: completion.text,
            usage,
            attempts,
        })
    }
}
