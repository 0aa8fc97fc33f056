//! Chat completions resource.

use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::error::PerplexityError;
use crate::error::Result;
use crate::http::Request;
use crate::stream::ChatStream;
use crate::types::CompletionParams;
use crate::types::StreamChunk;

const COMPLETIONS_PATH: &str = "/chat/completions";

/// Chat completions resource.
#[derive(Debug, Clone)]
pub struct Chat<'a> {
    client: &'a Client,
    cancel: CancellationToken,
}

impl<'a> Chat<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort calls made through this handle when `token` is cancelled.
    ///
    /// For streams the token stays attached for the stream's whole lifetime.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Create a chat completion (non-streaming).
    ///
    /// # Example
    ///
    /// ```ignore
    /// use perplexity_sdk::{ChatMessage, Client, CompletionParams};
    ///
    /// let client = Client::from_env()?;
    /// let params = CompletionParams::new("sonar", vec![ChatMessage::user("Hello!")]);
    /// let completion = client.chat().create(params).await?;
    /// println!("{}", completion.text());
    /// ```
    pub async fn create(&self, params: CompletionParams) -> Result<StreamChunk> {
        validate_completion(&params)?;
        if params.stream == Some(true) {
            return Err(PerplexityError::Validation(
                "use create_stream for streaming responses".to_string(),
            ));
        }

        let request = Request::post(COMPLETIONS_PATH).json(&params)?;
        self.client
            .http()
            .execute(&request, &self.cancel)
            .await?
            .json()
    }

    /// Create a streaming chat completion.
    ///
    /// The opening request is not retried.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut stream = client.chat().create_stream(params).await?;
    /// while let Some(chunk) = stream.next().await? {
    ///     print!("{}", chunk.text());
    /// }
    /// ```
    pub async fn create_stream(&self, mut params: CompletionParams) -> Result<ChatStream> {
        validate_completion(&params)?;
        params.stream = Some(true);

        let request = Request::post(COMPLETIONS_PATH).json(&params)?;
        let response = self
            .client
            .http()
            .execute_stream(&request, &self.cancel)
            .await?;
        Ok(ChatStream::new(response, self.cancel.clone()))
    }
}

/// Checks shared by the chat and async chat endpoints.
pub(crate) fn validate_completion(params: &CompletionParams) -> Result<()> {
    if params.messages.is_empty() {
        return Err(PerplexityError::Validation(
            "messages are required".to_string(),
        ));
    }
    if params.model.is_empty() {
        return Err(PerplexityError::Validation("model is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[path = "chat.test.rs"]
mod tests;
