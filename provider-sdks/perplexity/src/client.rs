//! HTTP client for the Perplexity API.

use crate::config::API_KEY_ENV;
use crate::config::ClientConfig;
use crate::error::PerplexityError;
use crate::error::Result;
use crate::http::HttpClient;
use crate::resources::AsyncChat;
use crate::resources::Chat;
use crate::resources::Search;

/// The Perplexity API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    config: ClientConfig,
}

impl Client {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::new(&config)?;
        Ok(Self { http, config })
    }

    /// Create a new client using the PERPLEXITY_API_KEY environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            PerplexityError::Configuration(format!("Missing {API_KEY_ENV} environment variable"))
        })?;

        Self::new(ClientConfig::new(api_key))
    }

    /// Create a new client with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(api_key))
    }

    /// Get the chat completions resource.
    pub fn chat(&self) -> Chat<'_> {
        Chat::new(self)
    }

    /// Get the search resource.
    pub fn search(&self) -> Search<'_> {
        Search::new(self)
    }

    /// Get the asynchronous chat completions resource.
    pub fn async_chat(&self) -> AsyncChat<'_> {
        AsyncChat::new(self)
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    /// Base URL with any trailing `/` removed.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// SDK version.
    pub fn version(&self) -> &'static str {
        crate::VERSION
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[cfg(test)]
#[path = "client.test.rs"]
mod tests;
