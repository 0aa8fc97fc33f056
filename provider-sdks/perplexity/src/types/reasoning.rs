//! Reasoning trace records attached to assistant messages.

use serde::Deserialize;
use serde::Serialize;

use super::search::SearchResult;

/// One step of the model's reasoning trace.
///
/// At most one of the detail fields is normally set, matching `step_type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    #[serde(default)]
    pub thought: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_progress: Option<AgentProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_agent: Option<BrowserAgentStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_tool_execution: Option<BrowserToolExecution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_python: Option<ExecutePythonStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_url_content: Option<FetchUrlContentStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_attachment_search: Option<FileAttachmentSearchStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search: Option<WebSearchStep>,
}

/// Live-browsing progress update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserAgentStep {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserToolExecution {
    /// Tool configuration, passed through as-is.
    #[serde(default)]
    pub tool: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutePythonStep {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub result: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchUrlContentStep {
    #[serde(default)]
    pub contents: Vec<SearchResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachmentSearchStep {
    #[serde(default)]
    pub attachment_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchStep {
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
}
