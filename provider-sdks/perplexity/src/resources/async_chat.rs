//! Asynchronous chat completions resource.
//!
//! Requests are queued server-side; poll with [`AsyncChat::get`] until the
//! status is terminal.

use tokio_util::sync::CancellationToken;

use super::chat::validate_completion;
use crate::client::Client;
use crate::error::PerplexityError;
use crate::error::Result;
use crate::http::Request;
use crate::types::AsyncCompletion;
use crate::types::AsyncCompletionList;
use crate::types::AsyncCompletionParams;
use crate::types::AsyncGetParams;

const ASYNC_COMPLETIONS_PATH: &str = "/async/chat/completions";

/// Asynchronous chat completions resource.
#[derive(Debug, Clone)]
pub struct AsyncChat<'a> {
    client: &'a Client,
    cancel: CancellationToken,
}

impl<'a> AsyncChat<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort calls made through this handle when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Queue a chat completion.
    pub async fn create(&self, params: AsyncCompletionParams) -> Result<AsyncCompletion> {
        validate_completion(&params.request)?;
        let request = Request::post(ASYNC_COMPLETIONS_PATH).json(&params)?;
        self.client
            .http()
            .execute(&request, &self.cancel)
            .await?
            .json()
    }

    /// List queued completions.
    pub async fn list(&self) -> Result<AsyncCompletionList> {
        let request = Request::get(ASYNC_COMPLETIONS_PATH);
        self.client
            .http()
            .execute(&request, &self.cancel)
            .await?
            .json()
    }

    /// Fetch one queued completion by id.
    pub async fn get(&self, id: &str, params: AsyncGetParams) -> Result<AsyncCompletion> {
        if id.is_empty() {
            return Err(PerplexityError::Validation(
                "request id is required".to_string(),
            ));
        }

        let path = format!("{ASYNC_COMPLETIONS_PATH}/{}", urlencoding::encode(id));
        let mut request = Request::get(path);
        if let Some(local_mode) = params.local_mode {
            request = request.query("local_mode", local_mode.to_string());
        }
        for (name, value) in params.headers() {
            request = request.header(name, value);
        }

        self.client
            .http()
            .execute(&request, &self.cancel)
            .await?
            .json()
    }
}

#[cfg(test)]
#[path = "async_chat.test.rs"]
mod tests;
