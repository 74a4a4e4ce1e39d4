// tests/fetcher.rs
//
// Fan-out behaviour of the feed fetcher: isolation, retries, deadline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use matchday_news::classify::Category;
use matchday_news::error::FetchError;
use matchday_news::ingest::{FetchConfig, Fetcher};
use matchday_news::sources::{FeedSource, SourceKind};

fn src(id: &str, url: &str) -> FeedSource {
    FeedSource::new(id, url, id, 70, SourceKind::Tier1Media, &[Category::General], "en")
}

#[tokio::test]
async fn one_broken_source_does_not_affect_the_others() {
    let client = Arc::new(
        StubFeedClient::new()
            .on(OFFICIAL_URL, vec![Reply::body(OFFICIAL_CLUB_XML)])
            .on(RUMOUR_A_URL, vec![Reply::Fail(FetchError::Http(404))])
            .on(RUMOUR_B_URL, vec![Reply::body("<rss><channel><item>")]),
    );
    let fetcher = Fetcher::new(client.clone(), fast_fetch_config());
    let sources = vec![
        src("official", OFFICIAL_URL),
        src("missing", RUMOUR_A_URL),
        src("broken", RUMOUR_B_URL),
    ];

    let report = fetcher.fetch_all(&sources, t0()).await;

    assert_eq!(report.succeeded, vec!["official".to_string()]);
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].source_id, "official");
    assert!(report.abandoned.is_empty());

    let mut failed: Vec<(&str, &str)> = report.failed.iter().map(|(id, e)| (id.as_str(), e.kind())).collect();
    failed.sort();
    assert_eq!(failed, vec![("broken", "parse"), ("missing", "http")]);

    // 4xx and parse errors are not retried
    assert_eq!(client.calls(RUMOUR_A_URL), 1);
    assert_eq!(client.calls(RUMOUR_B_URL), 1);
}

#[tokio::test]
async fn transient_errors_are_retried_once() {
    let client = Arc::new(StubFeedClient::new().on(
        OFFICIAL_URL,
        vec![Reply::network(), Reply::body(OFFICIAL_CLUB_XML)],
    ));
    let fetcher = Fetcher::new(client.clone(), fast_fetch_config());

    let report = fetcher.fetch_all(&[src("official", OFFICIAL_URL)], t0()).await;

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.items.len(), 1);
    assert_eq!(client.calls(OFFICIAL_URL), 2);
}

#[tokio::test]
async fn slow_attempts_time_out_per_source() {
    let client = Arc::new(StubFeedClient::new().on(
        OFFICIAL_URL,
        vec![Reply::Delayed(Duration::from_secs(5), OFFICIAL_CLUB_XML.to_string())],
    ));
    let cfg = FetchConfig {
        per_source_timeout_ms: 50,
        max_attempts: 1,
        ..fast_fetch_config()
    };
    let fetcher = Fetcher::new(client, cfg);

    let report = fetcher.fetch_all(&[src("slow", OFFICIAL_URL)], t0()).await;

    assert!(report.items.is_empty());
    assert!(matches!(report.failed.as_slice(), [(id, FetchError::Timeout(_))] if id == "slow"));
}

#[tokio::test]
async fn sources_pending_at_the_deadline_are_abandoned() {
    let client = Arc::new(
        StubFeedClient::new()
            .on(OFFICIAL_URL, vec![Reply::body(OFFICIAL_CLUB_XML)])
            .on(
                RUMOUR_A_URL,
                vec![Reply::Delayed(Duration::from_secs(10), RUMOUR_A_XML.to_string())],
            ),
    );
    let cfg = FetchConfig {
        per_source_timeout_ms: 30_000,
        overall_deadline_ms: 150,
        ..fast_fetch_config()
    };
    let fetcher = Fetcher::new(client, cfg);
    let sources = vec![src("quick", OFFICIAL_URL), src("stuck", RUMOUR_A_URL)];

    let started = std::time::Instant::now();
    let report = fetcher.fetch_all(&sources, t0()).await;

    assert!(started.elapsed() < Duration::from_secs(5), "deadline did not cut the round short");
    assert_eq!(report.succeeded, vec!["quick".to_string()]);
    assert_eq!(report.abandoned, vec!["stuck".to_string()]);
    assert_eq!(report.items.len(), 1);
}

#[tokio::test]
async fn invalid_urls_fail_without_a_request() {
    let client = Arc::new(StubFeedClient::new());
    let fetcher = Fetcher::new(client.clone(), fast_fetch_config());

    let report = fetcher
        .fetch_all(&[src("bad", "not a url"), src("ftp", "ftp://feeds.test/rss")], t0())
        .await;

    assert!(report.all_failed());
    assert_eq!(report.failed.len(), 2);
    assert!(report
        .failed
        .iter()
        .all(|(_, e)| matches!(e, FetchError::InvalidUrl { .. })));
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn no_sources_is_an_empty_report() {
    let fetcher = Fetcher::new(Arc::new(StubFeedClient::new()), fast_fetch_config());
    let report = fetcher.fetch_all(&[], t0()).await;
    assert!(report.items.is_empty() && report.failed.is_empty() && report.abandoned.is_empty());
}
