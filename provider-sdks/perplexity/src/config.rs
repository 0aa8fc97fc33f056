//! Client configuration for the Perplexity SDK.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;

use crate::backoff::Backoff;

/// Environment variable for the API key.
pub const API_KEY_ENV: &str = "PERPLEXITY_API_KEY";

/// Environment variable overriding the default base URL.
pub const BASE_URL_ENV: &str = "PERPLEXITY_BASE_URL";

/// Configuration for the Perplexity API client.
///
/// Values are not checked here; [`crate::Client::new`] validates them once.
#[derive(Clone)]
pub struct ClientConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Timeout for each physical request.
    pub timeout: Duration,

    /// Retries after the first attempt; `2` means up to three attempts.
    pub max_retries: u32,

    /// `User-Agent` header value.
    pub user_agent: String,

    /// Headers added to every request, after the built-in ones.
    pub default_headers: BTreeMap<String, String>,

    /// Delay policy between retries.
    pub backoff: Backoff,

    /// Pre-built HTTP client to use instead of creating one.
    pub http_client: Option<reqwest::Client>,
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("user_agent", &self.user_agent)
            .field("default_headers", &self.default_headers.keys())
            .field("backoff", &self.backoff)
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}

impl ClientConfig {
    /// Default base URL for the Perplexity API.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.perplexity.ai";

    /// Default request timeout (15 minutes).
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

    /// Default maximum retries.
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    /// Create a new configuration with the given API key.
    ///
    /// The base URL comes from `PERPLEXITY_BASE_URL` when set.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Set the retry delay policy.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Use an existing HTTP client. Its own timeout settings still apply.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: std::env::var(BASE_URL_ENV)
                .ok()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            timeout: Self::DEFAULT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            user_agent: format!("perplexity-rust/{}", crate::VERSION),
            default_headers: BTreeMap::new(),
            backoff: Backoff::default(),
            http_client: None,
        }
    }
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
