//! Historical post acquisition: Pushshift search hydrated through the Reddit API.

pub mod api;
pub mod auth;
pub mod export;
pub mod metrics;
pub mod pushshift;
pub mod rate_limiter;
pub mod retry;
pub mod transport;

#[cfg(test)]
mod tests;

use api::{RedditApiClient, RedditPostData, INFO_BATCH_SIZE};
use auth::AppOnlyAuthenticator;
use chrono::NaiveDateTime;
use pushshift::{PushshiftClient, SearchPage};
use retry::{RetryConfig, RetryExecutor};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use verdict_core::{CoreError, PostRecord, RedditCredentials, ScraperConfig};

/// What to fetch: posts of one subreddit created strictly before a cutoff.
#[derive(Debug, Clone)]
pub struct ScrapeQuery {
    pub subreddit: String,
    pub before: NaiveDateTime,
    pub limit: usize,
    pub page_size: u32,
}

impl From<&ScraperConfig> for ScrapeQuery {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            subreddit: config.subreddit.clone(),
            before: config.before,
            limit: config.limit,
            page_size: config.page_size,
        }
    }
}

/// Anything that can produce post records for a query.
#[allow(async_fn_in_trait)]
pub trait PostSource {
    async fn fetch_posts(&mut self, query: &ScrapeQuery) -> Result<Vec<PostRecord>, CoreError>;
}

/// The two remote calls scraping is built on: a search returning submissions
/// newest first, and a lookup returning current data for known ids.
#[allow(async_fn_in_trait)]
pub trait SearchBackend {
    /// Up to `size` submissions created strictly before `before` (epoch seconds).
    async fn search_page(
        &mut self,
        subreddit: &str,
        before: i64,
        size: u32,
    ) -> Result<SearchPage, CoreError>;

    /// Current data for at most [`INFO_BATCH_SIZE`] ids. Unknown ids are absent.
    async fn lookup_posts(&mut self, ids: &[String]) -> Result<Vec<RedditPostData>, CoreError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSummary {
    pub posts_written: usize,
    pub output_path: PathBuf,
}

/// Pushshift for discovery, Reddit `/api/info` for current post data.
#[derive(Debug)]
pub struct RedditClient {
    auth: AppOnlyAuthenticator,
    reddit: RedditApiClient,
    pushshift: PushshiftClient,
    retry: RetryExecutor,
}

impl RedditClient {
    pub fn new(credentials: &RedditCredentials, config: &ScraperConfig) -> Result<Self, CoreError> {
        Ok(Self {
            auth: AppOnlyAuthenticator::new(credentials),
            reddit: RedditApiClient::new(&credentials.user_agent)?,
            pushshift: PushshiftClient::new(
                config.pushshift_url.clone(),
                &credentials.user_agent,
                credentials.pushshift_token.clone(),
            )?,
            retry: RetryExecutor::new(RetryConfig::scraping()),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    async fn access_token(&mut self) -> Result<String, CoreError> {
        if let Some(token) = self.auth.current_token() {
            return Ok(token);
        }

        let auth = &self.auth;
        let transport = self.reddit.transport();
        let token = self
            .retry
            .execute("reddit_token", move || auth.request_token(transport))
            .await?;

        let access_token = token.access_token.clone();
        self.auth.set_token(token);
        Ok(access_token)
    }

    pub async fn log_usage(&self) {
        self.reddit.log_usage().await;
        let pushshift = self.pushshift.transport().get_metrics().await;
        info!(
            "Pushshift usage: {} requests, {} failed, {} rate limited",
            pushshift.total_requests, pushshift.failed_requests, pushshift.rate_limited_requests
        );
        let retries = self.retry.get_metrics();
        info!(
            "Retries: {} total, {} operations failed",
            retries.total_retries, retries.failed_operations
        );
    }
}

impl SearchBackend for RedditClient {
    async fn search_page(
        &mut self,
        subreddit: &str,
        before: i64,
        size: u32,
    ) -> Result<SearchPage, CoreError> {
        let pushshift = &self.pushshift;
        self.retry
            .execute("pushshift_search", move || {
                pushshift.search_page(subreddit, before, size)
            })
            .await
    }

    async fn lookup_posts(&mut self, ids: &[String]) -> Result<Vec<RedditPostData>, CoreError> {
        let token = self.access_token().await?;
        let token = token.as_str();
        let reddit = &self.reddit;
        self.retry
            .execute("reddit_info", move || reddit.get_posts_by_ids(token, ids))
            .await
    }
}

impl PostSource for RedditClient {
    async fn fetch_posts(&mut self, query: &ScrapeQuery) -> Result<Vec<PostRecord>, CoreError> {
        collect_posts(self, query).await
    }
}

/// Looks `ids` up in [`INFO_BATCH_SIZE`] batches, keeping input order, and
/// appends at most `remaining` usable posts to `out`.
async fn hydrate<B: SearchBackend>(
    backend: &mut B,
    ids: &[String],
    cutoff: i64,
    remaining: usize,
    out: &mut Vec<PostRecord>,
) -> Result<(), CoreError> {
    let start = out.len();

    for chunk in ids.chunks(INFO_BATCH_SIZE) {
        for post in backend.lookup_posts(chunk).await? {
            if post.stickied || post.created_utc as i64 >= cutoff {
                debug!("Skipping post {}", post.id);
                continue;
            }
            out.push(post.into());
            if out.len() - start >= remaining {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Pages backwards through the search from the query cutoff and hydrates
/// every new id, until `query.limit` posts are collected or the search runs
/// dry.
///
/// The next page is requested with `before = oldest + 1`, so posts sharing
/// the oldest second are not lost; the ids already collected are skipped.
/// Paging stops when that cursor would not move below the previous one.
pub async fn collect_posts<B: SearchBackend>(
    backend: &mut B,
    query: &ScrapeQuery,
) -> Result<Vec<PostRecord>, CoreError> {
    let cutoff = query.before.and_utc().timestamp();
    let mut before = cutoff;
    let mut seen: HashSet<String> = HashSet::new();
    let mut records: Vec<PostRecord> = Vec::new();

    info!(
        "Fetching up to {} posts from r/{} created before {}",
        query.limit, query.subreddit, query.before
    );

    while records.len() < query.limit {
        let page = backend
            .search_page(&query.subreddit, before, query.page_size)
            .await?;

        let Some(oldest) = page.oldest_created() else {
            info!("Search exhausted at {} posts", records.len());
            break;
        };

        let ids: Vec<String> = page
            .submissions
            .into_iter()
            .filter(|s| !s.stickied && (s.created_utc as i64) < cutoff)
            .filter(|s| seen.insert(s.id.clone()))
            .map(|s| s.id)
            .collect();

        let remaining = query.limit - records.len();
        hydrate(backend, &ids, cutoff, remaining, &mut records).await?;
        info!("Collected {} posts so far", records.len());

        let next = oldest.saturating_add(1);
        if next >= before {
            warn!("Search cursor did not move below {}, stopping", before);
            break;
        }
        before = next;
    }

    records.truncate(query.limit);
    Ok(records)
}

/// Fetches posts from `source` and writes them to `output` as CSV.
pub async fn scrape_with<S: PostSource>(
    source: &mut S,
    query: &ScrapeQuery,
    output: &Path,
) -> Result<ScrapeSummary, CoreError> {
    let posts = source.fetch_posts(query).await?;
    export::write_posts(output, &posts)?;

    Ok(ScrapeSummary {
        posts_written: posts.len(),
        output_path: output.to_path_buf(),
    })
}

/// Runs the full Reddit acquisition described by `config`.
pub async fn scrape(
    config: &ScraperConfig,
    credentials: &RedditCredentials,
) -> Result<ScrapeSummary, CoreError> {
    let mut client = RedditClient::new(credentials, config)?;
    let query = ScrapeQuery::from(config);

    let result = scrape_with(&mut client, &query, &config.output_path).await;
    client.log_usage().await;
    result
}
