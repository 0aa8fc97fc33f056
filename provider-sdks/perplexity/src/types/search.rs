//! Search results, both embedded in completions and from the search endpoint.

use serde::Deserialize;
use serde::Serialize;

use super::chat::SearchMode;
use super::chat::SearchRecencyFilter;

/// One query or a batch of queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchQuery {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for SearchQuery {
    fn from(query: &str) -> Self {
        Self::Single(query.to_string())
    }
}

impl From<String> for SearchQuery {
    fn from(query: String) -> Self {
        Self::Single(query)
    }
}

impl From<Vec<String>> for SearchQuery {
    fn from(queries: Vec<String>) -> Self {
        Self::Multiple(queries)
    }
}

impl From<Vec<&str>> for SearchQuery {
    fn from(queries: Vec<&str>) -> Self {
        Self::Multiple(queries.into_iter().map(String::from).collect())
    }
}

/// Parameters for `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: SearchQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_server_time: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens_per_page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after_date_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_before_date_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_domain_filter: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_language_filter: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_recency_filter: Option<SearchRecencyFilter>,
}

impl SearchParams {
    pub fn new(query: impl Into<SearchQuery>) -> Self {
        Self {
            query: query.into(),
            country: None,
            display_server_time: None,
            max_results: None,
            max_tokens: None,
            max_tokens_per_page: None,
            search_after_date_filter: None,
            search_before_date_filter: None,
            search_domain_filter: Vec::new(),
            search_language_filter: Vec::new(),
            search_mode: None,
            search_recency_filter: None,
        }
    }

    pub fn max_results(mut self, max_results: i64) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn search_domain_filter(mut self, domains: Vec<String>) -> Self {
        self.search_domain_filter = domains;
        self
    }

    pub fn search_recency_filter(mut self, filter: SearchRecencyFilter) -> Self {
        self.search_recency_filter = Some(filter);
        self
    }
}

/// Where a cited search result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchResultSource {
    Web,
    Attachment,
    #[serde(other)]
    Unknown,
}

/// A search result cited by a completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SearchResultSource>,
}

/// Response of `POST /search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub id: String,
    #[serde(default)]
    pub results: Vec<SearchResultItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_time: Option<String>,
}

/// One entry of a [`SearchResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

#[cfg(test)]
#[path = "search.test.rs"]
mod tests;
