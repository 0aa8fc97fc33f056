//! Request and response types for the Perplexity API.

mod async_chat;
mod chat;
mod chunk;
mod message;
mod reasoning;
mod search;
mod tool;
mod usage;

pub use async_chat::AsyncCompletion;
pub use async_chat::AsyncCompletionList;
pub use async_chat::AsyncCompletionParams;
pub use async_chat::AsyncCompletionStatus;
pub use async_chat::AsyncCompletionSummary;
pub use async_chat::AsyncGetParams;
pub use chat::CompletionParams;
pub use chat::JsonSchema;
pub use chat::ReasoningEffort;
pub use chat::RegexFormat;
pub use chat::ResponseFormat;
pub use chat::ResponseFormatType;
pub use chat::SearchContextSize;
pub use chat::SearchMode;
pub use chat::SearchRecencyFilter;
pub use chat::SearchType;
pub use chat::Stop;
pub use chat::StreamMode;
pub use chat::UserLocation;
pub use chat::WebSearchOptions;
pub use chunk::Choice;
pub use chunk::ChunkStatus;
pub use chunk::ChunkType;
pub use chunk::FinishReason;
pub use chunk::StreamChunk;
pub use message::ChatMessage;
pub use message::ContentChunk;
pub use message::FrameInterval;
pub use message::MessageContent;
pub use message::Role;
pub use message::UrlRef;
pub use message::VideoUrl;
pub use reasoning::AgentProgress;
pub use reasoning::BrowserAgentStep;
pub use reasoning::BrowserToolExecution;
pub use reasoning::ExecutePythonStep;
pub use reasoning::FetchUrlContentStep;
pub use reasoning::FileAttachmentSearchStep;
pub use reasoning::ReasoningStep;
pub use reasoning::WebSearchStep;
pub use search::SearchParams;
pub use search::SearchQuery;
pub use search::SearchResponse;
pub use search::SearchResult;
pub use search::SearchResultItem;
pub use search::SearchResultSource;
pub use tool::Tool;
pub use tool::ToolCall;
pub use tool::ToolCallFunction;
pub use tool::ToolChoice;
pub use tool::ToolFunction;
pub use usage::Cost;
pub use usage::UsageInfo;
