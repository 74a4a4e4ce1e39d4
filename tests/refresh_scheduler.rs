// tests/refresh_scheduler.rs

mod common;

use std::time::Duration;

use common::*;
use matchday_news::classify::Category;
use matchday_news::ingest::scheduler::spawn_refresh_scheduler;

#[tokio::test]
async fn scheduler_warms_the_cache_for_listed_categories() {
    let h = harness(scenario_sources(), scenario_client());
    assert!(!h.service.cache().is_valid(Category::Transfer));

    let handle = spawn_refresh_scheduler(
        h.service.clone(),
        Duration::from_millis(50),
        vec![Category::Transfer],
    );

    let mut warmed = false;
    for _ in 0..40 {
        if h.service.cache().is_valid(Category::Transfer) {
            warmed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    handle.abort();

    assert!(warmed, "cache never populated by the scheduler");
    assert!(!h.service.cache().is_valid(Category::Injury));
    assert!(h.client.calls(OFFICIAL_URL) >= 1);
}
