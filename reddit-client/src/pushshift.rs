use crate::rate_limiter::RateLimitConfig;
use crate::transport::Transport;
use serde::Deserialize;
use tracing::debug;
use verdict_core::CoreError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushshiftSubmission {
    pub id: String,
    pub created_utc: f64,
    #[serde(default)]
    pub stickied: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<PushshiftSubmission>,
}

/// One page of a descending-by-creation search.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub submissions: Vec<PushshiftSubmission>,
}

impl SearchPage {
    /// Creation time of the oldest submission, the cursor for the next page.
    pub fn oldest_created(&self) -> Option<i64> {
        self.submissions
            .iter()
            .map(|s| s.created_utc as i64)
            .min()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

/// Client for the Pushshift submission search.
#[derive(Debug)]
pub struct PushshiftClient {
    transport: Transport,
    search_url: String,
    token: Option<String>,
}

impl PushshiftClient {
    pub fn new(
        search_url: impl Into<String>,
        user_agent: &str,
        token: Option<String>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            transport: Transport::new("pushshift", user_agent, RateLimitConfig::pushshift())?,
            search_url: search_url.into(),
            token,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetches up to `size` non-stickied submissions created before `before` (epoch seconds).
    pub async fn search_page(
        &self,
        subreddit: &str,
        before: i64,
        size: u32,
    ) -> Result<SearchPage, CoreError> {
        let before = before.to_string();
        let size = size.to_string();
        let mut request = self.transport.http().get(&self.search_url).query(&[
            ("subreddit", subreddit),
            ("before", before.as_str()),
            ("size", size.as_str()),
            ("sort", "desc"),
            ("sort_type", "created_utc"),
            ("stickied", "false"),
            ("fields", "id,created_utc,stickied"),
        ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = self.transport.send("/search/submission", request).await?;
        let body: SearchResponse = self
            .transport
            .decode("/search/submission", response)
            .await?;

        debug!(
            "Pushshift returned {} submissions before {}",
            body.data.len(),
            before
        );
        Ok(SearchPage {
            submissions: body.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_decodes() {
        let raw = r#"{"data": [
            {"id": "rsxk1a", "created_utc": 1640995199, "stickied": false, "title": "x"},
            {"id": "rsxk0z", "created_utc": 1640990000.0}
        ]}"#;
        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.data.len(), 2);
        assert!(!response.data[1].stickied);

        let page = SearchPage {
            submissions: response.data,
        };
        assert_eq!(page.oldest_created(), Some(1640990000));
    }

    #[test]
    fn test_empty_page() {
        let response: SearchResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        let page = SearchPage {
            submissions: response.data,
        };
        assert!(page.is_empty());
        assert_eq!(page.oldest_created(), None);

        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.data.is_empty());
    }
}
