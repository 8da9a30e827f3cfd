/*!
 * Retrieval of the source changelog.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use reqwest::Client;

use crate::errors::FetchError;

/// Where the source document comes from
#[async_trait]
pub trait ChangelogSource: Send + Sync {
    /// Fetch the current document
    async fn fetch(&self) -> Result<String, FetchError>;

    /// Location shown in headers and notifications
    fn location(&self) -> &str;
}

/// Fetches the changelog over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpChangelogSource {
    client: Client,
    url: String,
}

impl HttpChangelogSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(concat!("changelog-translator/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChangelogSource for HttpChangelogSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        debug!("GET {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: self.url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status_code: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Body {
            url: self.url.clone(),
            message: e.to_string(),
        })
    }

    fn location(&self) -> &str {
        &self.url
    }
}

/// In-memory source for tests; answers 503 while no document is set
#[derive(Debug)]
pub struct StaticChangelogSource {
    location: String,
    document: RwLock<Option<String>>,
}

impl StaticChangelogSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            location: "memory://CHANGELOG.md".to_string(),
            document: RwLock::new(Some(document.into())),
        }
    }

    /// A source whose fetches fail
    pub fn unavailable() -> Self {
        Self {
            location: "memory://CHANGELOG.md".to_string(),
            document: RwLock::new(None),
        }
    }

    /// Replace the served document
    pub fn set_document(&self, document: impl Into<String>) {
        *self.document.write() = Some(document.into());
    }
}

#[async_trait]
impl ChangelogSource for StaticChangelogSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        self.document.read().clone().ok_or_else(|| FetchError::Status {
            url: self.location.clone(),
            status_code: 503,
        })
    }

    fn location(&self) -> &str {
        &self.location
    }
}
