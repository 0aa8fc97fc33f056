//! Token usage and cost accounting.

use serde::Deserialize;
use serde::Serialize;

/// Token usage reported for a completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub completion_tokens: i64,
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub total_tokens: i64,
    #[serde(default)]
    pub cost: Cost,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_search_queries: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_context_size: Option<String>,
}

/// Cost breakdown in USD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    #[serde(default)]
    pub input_tokens_cost: f64,
    #[serde(default)]
    pub output_tokens_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_tokens_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_queries_cost: Option<f64>,
}
