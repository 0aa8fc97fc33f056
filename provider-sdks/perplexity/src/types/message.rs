//! Chat messages and their content blocks.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::reasoning::ReasoningStep;
use super::tool::ToolCall;

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    #[default]
    Assistant,
    Tool,
    /// A role this SDK does not know yet.
    #[serde(other)]
    Unknown,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message.
    #[serde(default)]
    pub role: Role,

    /// Message body, either plain text or a list of content chunks.
    #[serde(default, deserialize_with = "nullable_content")]
    pub content: MessageContent,

    /// Reasoning trace attached by the model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning_steps: Vec<ReasoningStep>,

    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    /// Create a message with the given role and text content.
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
            reasoning_steps: Vec::new(),
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Tool, content)
    }

    /// Concatenated text of the message.
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// Message content: a plain string or structured chunks.
///
/// Decoding tries the string form first, then the array form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Structured(Vec<ContentChunk>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl MessageContent {
    /// Text of the content; text chunks are concatenated, other chunks skipped.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(chunks) => chunks.iter().filter_map(ContentChunk::as_text).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Structured(chunks) => chunks.is_empty(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<ContentChunk>> for MessageContent {
    fn from(chunks: Vec<ContentChunk>) -> Self {
        Self::Structured(chunks)
    }
}

/// Streaming deltas may send `"content": null`.
fn nullable_content<'de, D>(deserializer: D) -> Result<MessageContent, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<MessageContent>::deserialize(deserializer)?.unwrap_or_default())
}

/// A URL given either as a bare string or as `{"url": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlRef {
    Plain(String),
    Object { url: String },
}

impl UrlRef {
    pub fn url(&self) -> &str {
        match self {
            Self::Plain(url) | Self::Object { url } => url,
        }
    }
}

impl From<&str> for UrlRef {
    fn from(url: &str) -> Self {
        Self::Plain(url.to_string())
    }
}

impl From<String> for UrlRef {
    fn from(url: String) -> Self {
        Self::Plain(url)
    }
}

/// Sampling interval for video frames, sent as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameInterval {
    Seconds(i64),
    Text(String),
}

/// Video reference: a bare URL or an object with frame sampling options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoUrl {
    Plain(String),
    Object {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        frame_interval: Option<FrameInterval>,
    },
}

impl VideoUrl {
    pub fn url(&self) -> &str {
        match self {
            Self::Plain(url) | Self::Object { url, .. } => url,
        }
    }
}

/// One block of structured message content, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentChunk {
    Text {
        text: String,
    },
    ImageUrl {
        image_url: UrlRef,
    },
    FileUrl {
        file_url: UrlRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
    },
    PdfUrl {
        pdf_url: UrlRef,
    },
    VideoUrl {
        video_url: VideoUrl,
    },
}

impl ContentChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: UrlRef::Plain(url.into()),
        }
    }

    pub fn file_url(url: impl Into<String>, file_name: Option<String>) -> Self {
        Self::FileUrl {
            file_url: UrlRef::Plain(url.into()),
            file_name,
        }
    }

    pub fn pdf_url(url: impl Into<String>) -> Self {
        Self::PdfUrl {
            pdf_url: UrlRef::Plain(url.into()),
        }
    }

    /// Video chunk with an optional frame sampling interval.
    pub fn video_url(url: impl Into<String>, frame_interval: Option<FrameInterval>) -> Self {
        let url = url.into();
        let video_url = match frame_interval {
            Some(interval) => VideoUrl::Object {
                url,
                frame_interval: Some(interval),
            },
            None => VideoUrl::Plain(url),
        };
        Self::VideoUrl { video_url }
    }

    /// Wire name of the chunk type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::ImageUrl { .. } => "image_url",
            Self::FileUrl { .. } => "file_url",
            Self::PdfUrl { .. } => "pdf_url",
            Self::VideoUrl { .. } => "video_url",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "message.test.rs"]
mod tests;
