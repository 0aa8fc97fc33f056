//! Asynchronous (queued) chat completion types.

use serde::Deserialize;
use serde::Serialize;

use super::chat::CompletionParams;
use super::chunk::StreamChunk;

/// Lifecycle state of a queued completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AsyncCompletionStatus {
    Created,
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl AsyncCompletionStatus {
    /// Whether the completion has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Parameters for `POST /async/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncCompletionParams {
    pub request: CompletionParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl AsyncCompletionParams {
    pub fn new(request: CompletionParams) -> Self {
        Self {
            request,
            idempotency_key: None,
        }
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// A queued completion as returned by create and get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncCompletion {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub model: String,
    pub status: AsyncCompletionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Final completion, present once `status` is `COMPLETED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<StreamChunk>,
}

/// Entry of [`AsyncCompletionList`]; carries no response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncCompletionSummary {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub model: String,
    pub status: AsyncCompletionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<i64>,
}

/// Response of `GET /async/chat/completions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncCompletionList {
    #[serde(default)]
    pub requests: Vec<AsyncCompletionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Options for fetching one queued completion.
///
/// `local_mode` is sent as a query parameter; the rest become `x-*` request
/// headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsyncGetParams {
    pub local_mode: Option<bool>,
    pub client_env: Option<String>,
    pub client_name: Option<String>,
    pub created_at_epoch_seconds: Option<String>,
    pub request_time: Option<String>,
    pub usage_tier: Option<String>,
    pub user_id: Option<String>,
}

impl AsyncGetParams {
    /// Header name and value for every option that is set.
    pub(crate) fn headers(&self) -> Vec<(&'static str, &str)> {
        [
            ("x-client-env", &self.client_env),
            ("x-client-name", &self.client_name),
            ("x-created-at-epoch-seconds", &self.created_at_epoch_seconds),
            ("x-request-time", &self.request_time),
            ("x-usage-tier", &self.usage_tier),
            ("x-user-id", &self.user_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

#[cfg(test)]
#[path = "async_chat.test.rs"]
mod tests;
