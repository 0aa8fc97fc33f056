//! Chat completion request parameters.

use serde::Deserialize;
use serde::Serialize;

use super::message::ChatMessage;
use super::tool::Tool;
use super::tool::ToolChoice;

/// Parameters for `POST /chat/completions`.
///
/// Only `model` and `messages` are required; every `None` field is left out
/// of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    /// Model name, e.g. `"sonar"`.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,

    /// Set by the streaming entry point; leave unset otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_mode: Option<StreamMode>,

    // Sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Stop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_of: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cum_logprobs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diverse_first_token: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_preference: Option<String>,

    // Tools
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,

    // Search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_search_classifier: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_recency_filter: Option<SearchRecencyFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_domain_filter: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_language_filter: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after_date_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_before_date_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_after_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_before_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_after_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_before_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_search_results: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_search_options: Option<WebSearchOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_internal_properties: Option<serde_json::Map<String, serde_json::Value>>,

    // Images and related content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_images: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_related_questions: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_domain_filter: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_format_filter: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_images: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_image_url: Option<bool>,

    // Threads and metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_threads: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_workspace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_original_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CompletionParams {
    /// Create parameters for the given model and conversation.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Default::default()
        }
    }

    pub fn max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn stop(mut self, stop: impl Into<Stop>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    pub fn search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = Some(mode);
        self
    }

    pub fn search_recency_filter(mut self, filter: SearchRecencyFilter) -> Self {
        self.search_recency_filter = Some(filter);
        self
    }

    pub fn search_domain_filter(mut self, domains: Vec<String>) -> Self {
        self.search_domain_filter = domains;
        self
    }

    pub fn reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn web_search_options(mut self, options: WebSearchOptions) -> Self {
        self.web_search_options = Some(options);
        self
    }

    pub fn return_images(mut self, enabled: bool) -> Self {
        self.return_images = Some(enabled);
        self
    }

    pub fn return_related_questions(mut self, enabled: bool) -> Self {
        self.return_related_questions = Some(enabled);
        self
    }

    pub fn disable_search(mut self, disabled: bool) -> Self {
        self.disable_search = Some(disabled);
        self
    }
}

/// One stop sequence or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stop {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for Stop {
    fn from(stop: &str) -> Self {
        Self::Single(stop.to_string())
    }
}

impl From<String> for Stop {
    fn from(stop: String) -> Self {
        Self::Single(stop)
    }
}

impl From<Vec<String>> for Stop {
    fn from(stops: Vec<String>) -> Self {
        Self::Multiple(stops)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchRecencyFilter {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Web,
    Academic,
    Sec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    Full,
    Concise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchContextSize {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Fast,
    Pro,
    Auto,
}

/// Web search tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_location: Option<UserLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_results_enhanced_relevance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_context_size: Option<SearchContextSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormatType {
    Text,
    JsonSchema,
    Regex,
}

/// Structured output constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: ResponseFormatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegexFormat>,
}

impl ResponseFormat {
    pub fn text() -> Self {
        Self {
            format_type: ResponseFormatType::Text,
            json_schema: None,
            regex: None,
        }
    }

    pub fn json_schema(schema: JsonSchema) -> Self {
        Self {
            format_type: ResponseFormatType::JsonSchema,
            json_schema: Some(schema),
            regex: None,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            format_type: ResponseFormatType::Regex,
            json_schema: None,
            regex: Some(RegexFormat {
                pattern: pattern.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexFormat {
    pub pattern: String,
}

#[cfg(test)]
#[path = "chat.test.rs"]
mod tests;
