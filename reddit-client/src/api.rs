use crate::rate_limiter::{RateLimitConfig, RateLimitStatus};
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use verdict_core::{CoreError, PostRecord};

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Reddit caps `/api/info` at 100 fullnames per call.
pub const INFO_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

/// Reddit sends `false` for unedited posts and the edit timestamp otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Edited {
    Flag(bool),
    At(f64),
}

impl Default for Edited {
    fn default() -> Self {
        Edited::Flag(false)
    }
}

impl Edited {
    pub fn is_edited(&self) -> bool {
        match self {
            Edited::Flag(flag) => *flag,
            Edited::At(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub url: String,
    pub created_utc: f64,
    pub score: i64,
    pub upvote_ratio: f64,
    pub num_comments: u64,
    pub over_18: bool,
    pub stickied: bool,
    pub edited: Edited,
    pub link_flair_text: Option<String>,
}

impl From<RedditPostData> for PostRecord {
    fn from(post_data: RedditPostData) -> Self {
        let created = chrono::DateTime::from_timestamp(post_data.created_utc as i64, 0)
            .map(|d| d.naive_utc())
            .unwrap_or_default();

        Self {
            title: post_data.title,
            id: post_data.id,
            score: post_data.score,
            upvote_ratio: post_data.upvote_ratio,
            url: post_data.url,
            num_comments: post_data.num_comments,
            body: post_data.selftext,
            created,
            edited: post_data.edited.is_edited(),
            verdict: post_data.link_flair_text.filter(|v| !v.trim().is_empty()),
            over_18: post_data.over_18,
        }
    }
}

pub fn fullname(id: &str) -> String {
    if id.starts_with("t3_") {
        id.to_string()
    } else {
        format!("t3_{}", id)
    }
}

#[derive(Debug)]
pub struct RedditApiClient {
    transport: Transport,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(user_agent: &str) -> Result<Self, CoreError> {
        Ok(Self {
            transport: Transport::new("reddit", user_agent, RateLimitConfig::reddit_oauth())?,
            base_url: REDDIT_API_BASE.to_string(),
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetches current data for up to [`INFO_BATCH_SIZE`] submission ids.
    ///
    /// Ids Reddit no longer knows about are simply absent from the result.
    pub async fn get_posts_by_ids(
        &self,
        access_token: &str,
        ids: &[String],
    ) -> Result<Vec<RedditPostData>, CoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > INFO_BATCH_SIZE {
            return Err(CoreError::InvalidInput {
                message: format!(
                    "{} ids requested, /api/info accepts at most {}",
                    ids.len(),
                    INFO_BATCH_SIZE
                ),
            });
        }

        let endpoint = "/api/info";
        let fullnames = ids.iter().map(|id| fullname(id)).collect::<Vec<_>>().join(",");
        let request = self
            .transport
            .http()
            .get(format!("{}{}", self.base_url, endpoint))
            .bearer_auth(access_token)
            .query(&[("id", fullnames.as_str()), ("raw_json", "1")]);

        let response = self.transport.send(endpoint, request).await?;
        let listing: RedditListing<RedditPostData> =
            self.transport.decode(endpoint, response).await?;

        let posts: Vec<RedditPostData> = listing
            .data
            .children
            .into_iter()
            .filter(|child| child.kind == "t3")
            .map(|child| child.data)
            .collect();

        debug!("Hydrated {} of {} posts", posts.len(), ids.len());
        Ok(posts)
    }

    pub async fn get_metrics(&self) -> crate::metrics::ApiMetrics {
        self.transport.get_metrics().await
    }

    pub async fn get_rate_limit_status(&self) -> RateLimitStatus {
        self.transport.get_rate_limit_status().await
    }

    pub async fn log_usage(&self) {
        let metrics = self.get_metrics().await;
        info!(
            "Reddit usage: {} requests, {} failed, {} rate limited, avg {:?}",
            metrics.total_requests,
            metrics.failed_requests,
            metrics.rate_limited_requests,
            metrics.average_response_time
        );
    }
}
