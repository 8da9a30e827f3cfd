use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use indicatif::ProgressBar;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Provider, TokenUsage};

/// Anthropic client for interacting with Anthropic API
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    /// Model used for every request
    model: String,
    /// Longest wait for response headers or the next streamed chunk
    idle_timeout: Duration,
    /// Spinner updated while a response streams in
    progress: Option<ProgressBar>,
}

impl fmt::Debug for Anthropic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anthropic")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("idle_timeout", &self.idle_timeout)
            .finish_non_exhaustive()
    }
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System prompt to guide the AI
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,

    /// Ask for server-sent events instead of a single JSON body
    stream: bool,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

impl AnthropicRequest {
    /// Create a new streaming Anthropic request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            temperature: None,
            max_tokens,
            stream: true,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Events of the Messages streaming protocol
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    MessageStart {
        message: MessageStart,
    },
    ContentBlockDelta {
        delta: ContentDelta,
    },
    MessageDelta {
        #[serde(default)]
        delta: MessageDeltaBody,
        #[serde(default)]
        usage: Option<TokenUsage>,
    },
    MessageStop,
    Error {
        error: StreamErrorBody,
    },
    /// ping, content_block_start, content_block_stop and future event types
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct MessageStart {
    #[serde(default)]
    pub usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentDelta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageDeltaBody {
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreamErrorBody {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
}

/// Accumulates streamed events into a complete response
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    /// Characters in `text`
    chars: usize,
    usage: TokenUsage,
    stop_reason: Option<String>,
    finished: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Returns the number of characters received so far.
    pub fn apply(&mut self, event: StreamEvent) -> Result<usize, ProviderError> {
        match event {
            StreamEvent::MessageStart { message } => {
                self.usage.input_tokens = message.usage.input_tokens;
                self.usage.output_tokens = message.usage.output_tokens;
            }
            StreamEvent::ContentBlockDelta {
                delta: ContentDelta::TextDelta { text },
            } => {
                self.chars += text.chars().count();
                self.text.push_str(&text);
            }
            StreamEvent::MessageDelta { delta, usage } => {
                if let Some(usage) = usage {
                    self.usage.output_tokens = usage.output_tokens;
                }
                if delta.stop_reason.is_some() {
                    self.stop_reason = delta.stop_reason;
                }
            }
            StreamEvent::MessageStop => self.finished = true,
            StreamEvent::Error { error } => {
                return Err(match error.error_type.as_str() {
                    "overloaded_error" | "rate_limit_error" => ProviderError::RateLimitExceeded(error.message),
                    _ => ProviderError::StreamError(format!("{}: {}", error.error_type, error.message)),
                });
            }
            StreamEvent::ContentBlockDelta { .. } | StreamEvent::Other => {}
        }
        Ok(self.chars)
    }

    /// Whether `message_stop` was received
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop reason reported by the API, e.g. `end_turn` or `max_tokens`
    pub fn stop_reason(&self) -> Option<&str> {
        self.stop_reason.as_deref()
    }

    /// The complete response; fails if the stream ended early
    pub fn finish(self) -> Result<Completion, ProviderError> {
        if !self.finished {
            return Err(ProviderError::StreamError(
                "stream ended before message_stop".to_string(),
            ));
        }
        Ok(Completion {
            text: self.text,
            usage: self.usage,
        })
    }
}

/// Splits a server-sent event byte stream into `data:` payloads.
///
/// Chunks may end anywhere, including inside a UTF-8 sequence, so bytes are
/// buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the data payloads completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

fn map_status_error(status_code: u16, message: String) -> ProviderError {
    match status_code {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        _ => ProviderError::ApiError { status_code, message },
    }
}

/// Next item of `stream`, failing when nothing arrives within `idle`
async fn next_within<S>(stream: &mut S, idle: Duration) -> Result<Option<S::Item>, ProviderError>
where
    S: Stream + Unpin,
{
    tokio::time::timeout(idle, stream.next())
        .await
        .map_err(|_| ProviderError::StreamError(format!("no data received for {:?}", idle)))
}

fn map_transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

impl Anthropic {
    /// Create a new Anthropic client
    ///
    /// There is no overall deadline: a long translation may stream for as
    /// long as chunks keep arriving within `idle_timeout`.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        connect_timeout: Duration,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(connect_timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            idle_timeout,
            progress: None,
        }
    }

    /// Report streaming progress on a spinner
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Send a streaming messages request and accumulate the whole response
    pub async fn stream_message(&self, request: AnthropicRequest) -> Result<Completion, ProviderError> {
        let send = self
            .client
            .post(self.api_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send();
        let response = tokio::time::timeout(self.idle_timeout, send)
            .await
            .map_err(|_| ProviderError::ConnectionError(format!("no response within {:?}", self.idle_timeout)))?
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, error_text);
            return Err(map_status_error(status.as_u16(), error_text));
        }

        let mut decoder = SseLineDecoder::new();
        let mut accumulator = StreamAccumulator::new();
        let mut stream = Box::pin(response.bytes_stream());

        while let Some(chunk) = next_within(&mut stream, self.idle_timeout).await? {
            let chunk = chunk.map_err(|e| ProviderError::StreamError(e.to_string()))?;
            for payload in decoder.push(&chunk) {
                let event: StreamEvent = serde_json::from_str(&payload)
                    .map_err(|e| ProviderError::ParseError(format!("{} in event {}", e, payload)))?;
                let received = accumulator.apply(event)?;
                if let Some(progress) = &self.progress {
                    progress.set_message(format!("{} characters received", received));
                }
            }
        }

        if let Some(reason) = accumulator.stop_reason() {
            debug!("Anthropic stream finished: {}", reason);
            if reason == "max_tokens" {
                warn!("Translation hit the max_tokens limit and may be truncated");
            }
        }
        accumulator.finish()
    }
}

#[async_trait]
impl Provider for Anthropic {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let request = AnthropicRequest::new(&self.model, request.max_tokens)
            .system(request.system)
            .temperature(request.temperature)
            .add_message("user", request.user_message);
        self.stream_message(request).await
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
