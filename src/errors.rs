/*!
 * Error types for the changelog translator.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Fatal errors
 * (`FetchError`, exhausted `TranslationError`) end a run; `NotificationError`
 * is always recovered by the caller.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The event stream ended or reported an error before the message completed
    #[error("Stream error: {0}")]
    StreamError(String),
}

/// Errors raised while fetching the source changelog
#[derive(Error, Debug)]
pub enum FetchError {
    /// Request could not be sent or the connection dropped
    #[error("Failed to fetch {url}: {message}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying failure
        message: String,
    },

    /// Server answered with a non-2xx status
    #[error("Fetching {url} returned HTTP {status_code}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status_code: u16,
    },

    /// Body could not be read as UTF-8 text
    #[error("Failed to read body of {url}: {message}")]
    Body {
        /// Requested URL
        url: String,
        /// Underlying failure
        message: String,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Every attempt failed
    #[error("Translation failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error of the final attempt
        #[source]
        source: ProviderError,
    },

    /// Provider finished without producing any text
    #[error("Provider returned an empty translation")]
    EmptyResponse,
}

/// Errors raised by the persisted state and artifact stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing a file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while delivering a notification. Never fatal.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// Request could not be sent
    #[error("Failed to send notification: {0}")]
    Request(String),

    /// Webhook answered with a non-2xx status
    #[error("Webhook responded with {status_code}: {message}")]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error fetching the source document
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the state or artifact store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
