//! Completion payloads: one streamed chunk, or a whole non-streamed response.

use serde::Deserialize;
use serde::Serialize;

use super::message::ChatMessage;
use super::search::SearchResult;
use super::usage::UsageInfo;

/// A chat completion, or one incremental piece of a streamed one.
///
/// Non-streaming calls return the same shape with `message` populated on each
/// choice; streamed chunks carry `delta` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChunkStatus>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub chunk_type: Option<ChunkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageInfo>,
}

impl StreamChunk {
    /// Text of the first choice, preferring the streamed delta over the
    /// full message.
    pub fn text(&self) -> String {
        let Some(choice) = self.choices.first() else {
            return String::new();
        };
        let delta = choice.delta.text();
        if delta.is_empty() {
            choice.message.text()
        } else {
            delta
        }
    }

    /// Finish reason of the first choice, if it has finished.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.choices.first().and_then(|c| c.finish_reason)
    }
}

/// One completion alternative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: i64,
    /// Incremental update (streaming).
    #[serde(default)]
    pub delta: ChatMessage,
    /// Full message (non-streaming).
    #[serde(default)]
    pub message: ChatMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop point or a stop sequence.
    Stop,
    /// Token limit reached.
    Length,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChunkStatus {
    Pending,
    Completed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Message,
    Info,
    EndOfStream,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
#[path = "chunk.test.rs"]
mod tests;
