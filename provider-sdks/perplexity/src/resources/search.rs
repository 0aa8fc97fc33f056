//! Web search resource.

use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::error::PerplexityError;
use crate::error::Result;
use crate::http::Request;
use crate::types::SearchParams;
use crate::types::SearchQuery;
use crate::types::SearchResponse;

/// Web search resource.
#[derive(Debug, Clone)]
pub struct Search<'a> {
    client: &'a Client,
    cancel: CancellationToken,
}

impl<'a> Search<'a> {
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

    /// Run a search for one or more queries.
    pub async fn create(&self, params: SearchParams) -> Result<SearchResponse> {
        validate_query(&params.query)?;
        let request = Request::post("/search").json(&params)?;
        self.client
            .http()
            .execute(&request, &self.cancel)
            .await?
            .json()
    }
}

fn validate_query(query: &SearchQuery) -> Result<()> {
    match query {
        SearchQuery::Single(q) if q.is_empty() => Err(PerplexityError::Validation(
            "query cannot be empty".to_string(),
        )),
        SearchQuery::Multiple(qs) if qs.is_empty() => Err(PerplexityError::Validation(
            "query cannot be empty".to_string(),
        )),
        SearchQuery::Multiple(qs) => match qs.iter().position(String::is_empty) {
            Some(i) => Err(PerplexityError::Validation(format!(
                "query[{i}] cannot be empty"
            ))),
            None => Ok(()),
        },
        SearchQuery::Single(_) => Ok(()),
    }
}

#[cfg(test)]
#[path = "search.test.rs"]
mod tests;
