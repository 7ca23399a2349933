use crate::api::{RedditPostData, INFO_BATCH_SIZE};
use crate::pushshift::{PushshiftSubmission, SearchPage};
use crate::{collect_posts, scrape_with, PostSource, RedditClient, ScrapeQuery, SearchBackend};
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use verdict_core::{CoreError, PostRecord, RedditCredentials, ScraperConfig, ServiceError};

fn create_test_credentials() -> RedditCredentials {
    RedditCredentials {
        client_id: "test_client_id".to_string(),
        client_secret: "test_client_secret".to_string(),
        user_agent: "verdict/0.1 by test_user".to_string(),
        pushshift_token: None,
    }
}

fn record(id: &str, day: u32) -> PostRecord {
    PostRecord {
        title: format!("AITA post {}", id),
        id: id.to_string(),
        score: 10,
        upvote_ratio: 0.9,
        url: format!("https://www.reddit.com/comments/{}", id),
        num_comments: 4,
        body: "some body".to_string(),
        created: NaiveDate::from_ymd_opt(2021, 12, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        edited: false,
        verdict: Some("NTA".to_string()),
        over_18: false,
    }
}

/// In-memory source that honours the query limit and records calls.
struct FixedSource {
    posts: Vec<PostRecord>,
    calls: usize,
}

impl PostSource for FixedSource {
    async fn fetch_posts(&mut self, query: &ScrapeQuery) -> Result<Vec<PostRecord>, CoreError> {
        self.calls += 1;
        Ok(self
            .posts
            .iter()
            .filter(|p| p.created < query.before)
            .take(query.limit)
            .cloned()
            .collect())
    }
}

struct FailingSource;

impl PostSource for FailingSource {
    async fn fetch_posts(&mut self, _query: &ScrapeQuery) -> Result<Vec<PostRecord>, CoreError> {
        Err(CoreError::Service(ServiceError::ServerError {
            service: "pushshift".to_string(),
            status_code: 502,
        }))
    }
}

fn temp_csv() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("verdict-scrape-{}.csv", uuid::Uuid::new_v4()))
}

#[test]
fn test_query_from_config() {
    let config = ScraperConfig::default();
    let query = ScrapeQuery::from(&config);

    assert_eq!(query.subreddit, "AmITheAsshole");
    assert_eq!(query.limit, 100_000);
    assert_eq!(query.page_size, 100);
    assert_eq!(query.before.and_utc().timestamp(), 1640995200);
}

#[test]
fn test_client_creation() {
    let client = RedditClient::new(&create_test_credentials(), &ScraperConfig::default());
    assert!(client.is_ok());
    assert!(!client.unwrap().is_authenticated());
}

#[tokio::test]
async fn test_scrape_with_writes_limited_posts() {
    let mut source = FixedSource {
        posts: vec![record("a", 1), record("b", 2), record("c", 3)],
        calls: 0,
    };
    let query = ScrapeQuery {
        limit: 2,
        ..ScrapeQuery::from(&ScraperConfig::default())
    };
    let output = temp_csv();

    let summary = scrape_with(&mut source, &query, &output).await.unwrap();
    assert_eq!(summary.posts_written, 2);
    assert_eq!(summary.output_path, output);
    assert_eq!(source.calls, 1);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let ids: Vec<String> = reader
        .deserialize::<PostRecord>()
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);

    std::fs::remove_file(output).unwrap();
}

#[tokio::test]
async fn test_scrape_with_respects_cutoff() {
    let mut source = FixedSource {
        posts: vec![record("old", 1), record("new", 31)],
        calls: 0,
    };
    let query = ScrapeQuery {
        before: NaiveDate::from_ymd_opt(2021, 12, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        ..ScrapeQuery::from(&ScraperConfig::default())
    };
    let output = temp_csv();

    let summary = scrape_with(&mut source, &query, &output).await.unwrap();
    assert_eq!(summary.posts_written, 1);

    std::fs::remove_file(output).unwrap();
}

#[test]
fn test_scrape_with_propagates_source_error() {
    let output = temp_csv();
    let query = ScrapeQuery::from(&ScraperConfig::default());

    let result = tokio_test::block_on(scrape_with(&mut FailingSource, &query, &output));
    assert!(matches!(
        result,
        Err(CoreError::Service(ServiceError::ServerError {
            status_code: 502,
            ..
        }))
    ));
    assert!(!output.exists());
}

/// Search and lookup over fixed data, recording every call.
#[derive(Default)]
struct FakeBackend {
    submissions: Vec<PushshiftSubmission>,
    /// Lookup data by id; ids without an entry are unknown to the lookup.
    posts: HashMap<String, RedditPostData>,
    befores: Vec<i64>,
    lookups: Vec<Vec<String>>,
}

impl FakeBackend {
    /// One submission per `(id, created_utc)`, hydrating to a plain post.
    fn with_posts(entries: &[(&str, i64)]) -> Self {
        let mut backend = FakeBackend::default();
        for &(id, created) in entries {
            backend.add(id, created, false);
        }
        backend
    }

    fn add(&mut self, id: &str, created: i64, stickied: bool) {
        self.submissions.push(PushshiftSubmission {
            id: id.to_string(),
            created_utc: created as f64,
            stickied,
        });
        self.posts.insert(
            id.to_string(),
            RedditPostData {
                id: id.to_string(),
                title: format!("AITA {}", id),
                selftext: "body".to_string(),
                created_utc: created as f64,
                link_flair_text: Some("NTA".to_string()),
                ..RedditPostData::default()
            },
        );
    }

    fn looked_up(&self) -> Vec<String> {
        self.lookups.iter().flatten().cloned().collect()
    }
}

impl SearchBackend for FakeBackend {
    async fn search_page(
        &mut self,
        _subreddit: &str,
        before: i64,
        size: u32,
    ) -> Result<SearchPage, CoreError> {
        self.befores.push(before);
        let mut matching: Vec<PushshiftSubmission> = self
            .submissions
            .iter()
            .filter(|s| (s.created_utc as i64) < before)
            .cloned()
            .collect();
        // newest first, stable for equal timestamps
        matching.sort_by(|a, b| b.created_utc.total_cmp(&a.created_utc));
        matching.truncate(size as usize);
        Ok(SearchPage {
            submissions: matching,
        })
    }

    async fn lookup_posts(&mut self, ids: &[String]) -> Result<Vec<RedditPostData>, CoreError> {
        assert!(ids.len() <= INFO_BATCH_SIZE);
        self.lookups.push(ids.to_vec());
        Ok(ids.iter().filter_map(|id| self.posts.get(id).cloned()).collect())
    }
}

fn paging_query(cutoff: i64, limit: usize, page_size: u32) -> ScrapeQuery {
    ScrapeQuery {
        subreddit: "AmITheAsshole".to_string(),
        before: DateTime::from_timestamp(cutoff, 0).unwrap().naive_utc(),
        limit,
        page_size,
    }
}

fn ids(records: &[PostRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

#[tokio::test]
async fn test_paging_moves_cursor_past_oldest_and_dedupes() {
    let mut backend = FakeBackend::with_posts(&[
        ("p100", 100),
        ("p99", 99),
        ("p98", 98),
        ("p97", 97),
        ("p96", 96),
        ("p95", 95),
    ]);

    let records = collect_posts(&mut backend, &paging_query(101, 50, 2)).await.unwrap();

    assert_eq!(ids(&records), vec!["p100", "p99", "p98", "p97", "p96", "p95"]);
    // each page overlaps the previous one by its oldest second
    assert_eq!(backend.befores, vec![101, 100, 99, 98, 97, 96]);
    // overlapping ids are looked up only once
    assert_eq!(backend.looked_up(), vec!["p100", "p99", "p98", "p97", "p96", "p95"]);
}

#[tokio::test]
async fn test_paging_keeps_posts_sharing_a_second() {
    // the first page ends inside the second that "d" shares with "c"
    let mut backend =
        FakeBackend::with_posts(&[("a", 60), ("b", 55), ("c", 50), ("d", 50), ("e", 40)]);

    let records = collect_posts(&mut backend, &paging_query(100, 10, 3)).await.unwrap();

    assert_eq!(ids(&records), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(backend.befores, vec![100, 51, 41]);
}

#[tokio::test]
async fn test_paging_skips_stickied_and_late_posts() {
    let mut backend = FakeBackend::with_posts(&[("keep1", 90), ("keep2", 80)]);
    // stickied in the search results: never looked up
    backend.add("pinned", 85, true);
    // stickied by the time it is looked up
    backend.add("pinned_later", 84, false);
    backend.posts.get_mut("pinned_later").unwrap().stickied = true;
    // searched before the cutoff, but the lookup reports a later creation time
    backend.add("late", 83, false);
    backend.posts.get_mut("late").unwrap().created_utc = 150.0;

    let records = collect_posts(&mut backend, &paging_query(100, 10, 10)).await.unwrap();

    assert_eq!(ids(&records), vec!["keep1", "keep2"]);
    assert!(!backend.looked_up().contains(&"pinned".to_string()));
    assert!(backend.looked_up().contains(&"pinned_later".to_string()));
}

#[tokio::test]
async fn test_paging_stops_when_cursor_does_not_move() {
    // a full page of posts from the same second, more of them than fit
    let mut backend = FakeBackend::with_posts(&[("a", 50), ("b", 50), ("c", 50), ("d", 50)]);

    let records = collect_posts(&mut backend, &paging_query(100, 10, 2)).await.unwrap();

    assert_eq!(backend.befores, vec![100, 51]);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_paging_stops_on_empty_search() {
    let mut backend = FakeBackend::default();
    let records = collect_posts(&mut backend, &paging_query(100, 10, 5)).await.unwrap();

    assert!(records.is_empty());
    assert_eq!(backend.befores, vec![100]);
    assert!(backend.lookups.is_empty());
}

#[tokio::test]
async fn test_limit_truncates_across_lookup_batches() {
    let entries: Vec<(String, i64)> = (0..300).map(|i| (format!("p{}", i), 1000 - i as i64)).collect();
    let borrowed: Vec<(&str, i64)> = entries.iter().map(|(id, t)| (id.as_str(), *t)).collect();
    let mut backend = FakeBackend::with_posts(&borrowed);

    let records = collect_posts(&mut backend, &paging_query(2000, 150, 250)).await.unwrap();

    assert_eq!(records.len(), 150);
    assert_eq!(records[0].id, "p0");
    assert_eq!(records[149].id, "p149");
    // one page of 250 ids, looked up in two batches; the limit is hit in the second
    assert_eq!(backend.befores.len(), 1);
    let sizes: Vec<usize> = backend.lookups.iter().map(|l| l.len()).collect();
    assert_eq!(sizes, vec![INFO_BATCH_SIZE, INFO_BATCH_SIZE]);
}

#[tokio::test]
async fn test_limit_reached_over_several_pages() {
    let mut backend =
        FakeBackend::with_posts(&[("a", 9), ("b", 8), ("c", 7), ("d", 6), ("e", 5), ("f", 4)]);

    let records = collect_posts(&mut backend, &paging_query(10, 4, 3)).await.unwrap();

    assert_eq!(ids(&records), vec!["a", "b", "c", "d"]);
    assert_eq!(backend.befores, vec![10, 8]);
}
