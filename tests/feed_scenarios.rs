//! End-to-end scenarios for the upcoming-events feed
//!
//! Drives the orchestrator with a scriptable stub store and stub probe over
//! a real on-disk cache, covering the degradation ladder from live remote
//! data down to the empty state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use churchfeed::cache::{CacheKey, TieredCache};
use churchfeed::connectivity::Connectivity;
use churchfeed::data::{EventRecord, EventStore, RecurrencePattern, StoreError};
use churchfeed::feed::EventFeed;

/// Probe stub with a fixed verdict
struct StubProbe {
    online: bool,
}

#[async_trait]
impl Connectivity for StubProbe {
    async fn is_online(&self) -> bool {
        self.online
    }
}

/// Store stub where each query shape either returns canned records or fails
///
/// `None` for a shape means that query fails with `StoreError::Unavailable`.
/// Call counts let tests assert which shapes were actually issued.
#[derive(Default)]
struct StubStore {
    ordered: Option<Vec<EventRecord>>,
    unordered: Option<Vec<EventRecord>>,
    ordered_calls: Arc<AtomicUsize>,
    unordered_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl EventStore for StubStore {
    async fn fetch_ordered(&self) -> Result<Vec<EventRecord>, StoreError> {
        self.ordered_calls.fetch_add(1, Ordering::SeqCst);
        self.ordered
            .clone()
            .ok_or_else(|| StoreError::Unavailable("ordered query not supported".to_string()))
    }

    async fn fetch_unordered(&self) -> Result<Vec<EventRecord>, StoreError> {
        self.unordered_calls.fetch_add(1, Ordering::SeqCst);
        self.unordered
            .clone()
            .ok_or_else(|| StoreError::Unavailable("store unreachable".to_string()))
    }
}

/// Pinned "today" for every scenario: Monday 2026-03-02
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn one_off(id: &str, date: NaiveDate) -> EventRecord {
    EventRecord {
        id: id.to_string(),
        title: format!("Event {}", id),
        location: "Fellowship Hall".to_string(),
        category: "Community".to_string(),
        description: String::new(),
        date,
        time: "6:00 PM".to_string(),
        is_multi_day: false,
        end_date: None,
        is_recurring: false,
        recurrence_pattern: None,
    }
}

fn weekly_wednesday(id: &str) -> EventRecord {
    let start = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
    EventRecord {
        id: id.to_string(),
        title: "Midweek Service".to_string(),
        location: "Sanctuary".to_string(),
        category: "Worship".to_string(),
        description: String::new(),
        date: start,
        time: String::new(),
        is_multi_day: false,
        end_date: None,
        is_recurring: true,
        recurrence_pattern: Some(RecurrencePattern {
            day_of_week: 3,
            start_date: start,
            end_date: None,
            time: "7:00 PM".to_string(),
        }),
    }
}

fn cache_in(dir: &TempDir) -> TieredCache {
    TieredCache::with_dir(dir.path().to_path_buf())
}

#[tokio::test]
async fn offline_with_cached_record_serves_it() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    // One non-recurring record dated two days from now, already cached
    let record = one_off("picnic", today() + chrono::Duration::days(2));
    cache.write(CacheKey::Events, &vec![record.clone()]).await;

    let store = StubStore::default();
    let feed = EventFeed::new(store, cache, StubProbe { online: false }).with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].record_id, "picnic");
    assert_eq!(events[0].date, record.date);
}

#[tokio::test]
async fn offline_never_queries_the_store() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    cache
        .write(CacheKey::Events, &vec![one_off("a", today())])
        .await;

    let store = StubStore {
        ordered: Some(vec![one_off("remote", today())]),
        ..Default::default()
    };
    let ordered_calls = store.ordered_calls.clone();
    let unordered_calls = store.unordered_calls.clone();

    let feed = EventFeed::new(store, cache, StubProbe { online: false }).with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert_eq!(events[0].record_id, "a", "Offline load must come from the cache");
    assert_eq!(ordered_calls.load(Ordering::SeqCst), 0);
    assert_eq!(unordered_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn offline_with_empty_cache_resolves_to_empty_list() {
    let dir = TempDir::new().unwrap();
    let feed = EventFeed::new(
        StubStore::default(),
        cache_in(&dir),
        StubProbe { online: false },
    )
    .with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert!(events.is_empty(), "Zero state must be an empty list, not an error");
}

#[tokio::test]
async fn online_success_serves_remote_and_writes_through_to_cache() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let record = one_off("revival", today() + chrono::Duration::days(7));
    let store = StubStore {
        ordered: Some(vec![record.clone()]),
        ..Default::default()
    };

    let feed = EventFeed::new(store, cache.clone(), StubProbe { online: true }).with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].record_id, "revival");

    // The raw record collection must now be cached for later offline loads
    let cached: Vec<EventRecord> = cache
        .read_stale(CacheKey::Events)
        .await
        .expect("Remote success should write through to the cache");
    assert_eq!(cached, vec![record]);
}

#[tokio::test]
async fn ordered_query_failure_falls_back_to_unordered_with_in_memory_sort() {
    let dir = TempDir::new().unwrap();

    let later = one_off("later", today() + chrono::Duration::days(10));
    let sooner = one_off("sooner", today() + chrono::Duration::days(3));
    let store = StubStore {
        ordered: None,
        unordered: Some(vec![later.clone(), sooner.clone()]),
        ..Default::default()
    };

    let feed =
        EventFeed::new(store, cache_in(&dir), StubProbe { online: true }).with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].record_id, "sooner");
    assert_eq!(events[1].record_id, "later");
}

#[tokio::test]
async fn ordered_query_failure_issues_the_unordered_shape() {
    let dir = TempDir::new().unwrap();
    let store = StubStore {
        ordered: None,
        unordered: Some(vec![one_off("a", today())]),
        ..Default::default()
    };
    let ordered_calls = store.ordered_calls.clone();
    let unordered_calls = store.unordered_calls.clone();

    let feed =
        EventFeed::new(store, cache_in(&dir), StubProbe { online: true }).with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert_eq!(events.len(), 1);
    assert_eq!(ordered_calls.load(Ordering::SeqCst), 1);
    assert_eq!(unordered_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remote_failure_while_online_falls_back_to_stale_cache() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    let record = one_off("cached", today() + chrono::Duration::days(5));
    cache.write(CacheKey::Events, &vec![record.clone()]).await;

    // Both query shapes fail even though the probe says online
    let store = StubStore::default();
    let feed = EventFeed::new(store, cache, StubProbe { online: true }).with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].record_id, "cached");
}

#[tokio::test]
async fn remote_failure_with_empty_cache_resolves_to_empty_list() {
    let dir = TempDir::new().unwrap();
    let feed = EventFeed::new(
        StubStore::default(),
        cache_in(&dir),
        StubProbe { online: true },
    )
    .with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert!(events.is_empty());
}

#[tokio::test]
async fn past_instances_are_filtered_out() {
    let dir = TempDir::new().unwrap();
    let store = StubStore {
        ordered: Some(vec![
            one_off("yesterday", today() - chrono::Duration::days(1)),
            one_off("tomorrow", today() + chrono::Duration::days(1)),
        ]),
        ..Default::default()
    };

    let feed =
        EventFeed::new(store, cache_in(&dir), StubProbe { online: true }).with_today(today());

    let events = feed.load_upcoming_events(10).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].record_id, "tomorrow");
}

#[tokio::test]
async fn mixed_feed_interleaves_one_off_with_recurring_instances() {
    let dir = TempDir::new().unwrap();

    // One one-off next week plus an open-ended Wednesday rule, one-month horizon
    let one_off_date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    let store = StubStore {
        ordered: Some(vec![one_off("dinner", one_off_date), weekly_wednesday("wed")]),
        ..Default::default()
    };

    let feed = EventFeed::new(store, cache_in(&dir), StubProbe { online: true })
        .with_today(today())
        .with_horizon_months(1);

    let events = feed.load_upcoming_events(10).await;

    // Wednesdays 2026-03-04 through 2026-04-01, with the one-off between the
    // first and second
    let dates: Vec<NaiveDate> = events.iter().map(|e| e.date).collect();
    let expected: Vec<NaiveDate> = [
        (3, 4),
        (3, 9),
        (3, 11),
        (3, 18),
        (3, 25),
        (4, 1),
    ]
    .iter()
    .map(|&(m, d)| NaiveDate::from_ymd_opt(2026, m, d).unwrap())
    .collect();
    assert_eq!(dates, expected);

    assert_eq!(events[1].record_id, "dinner");
    assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
}

#[tokio::test]
async fn result_is_truncated_to_the_requested_limit() {
    let dir = TempDir::new().unwrap();
    let store = StubStore {
        ordered: Some(vec![weekly_wednesday("wed")]),
        ..Default::default()
    };

    let feed =
        EventFeed::new(store, cache_in(&dir), StubProbe { online: true }).with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert_eq!(events.len(), 3, "A year of Wednesdays must truncate to the limit");
    // The three soonest Wednesdays, in order
    assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    assert_eq!(events[1].date, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
    assert_eq!(events[2].date, NaiveDate::from_ymd_opt(2026, 3, 18).unwrap());
}

#[tokio::test]
async fn malformed_rule_from_the_store_does_not_blank_the_feed() {
    let dir = TempDir::new().unwrap();

    let mut bad = weekly_wednesday("bad");
    if let Some(pattern) = bad.recurrence_pattern.as_mut() {
        pattern.day_of_week = 9;
    }
    let store = StubStore {
        ordered: Some(vec![bad, one_off("good", today() + chrono::Duration::days(2))]),
        ..Default::default()
    };

    let feed =
        EventFeed::new(store, cache_in(&dir), StubProbe { online: true }).with_today(today());

    let events = feed.load_upcoming_events(10).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].record_id, "good");
}

#[tokio::test]
async fn corrupt_cache_entry_reads_as_the_zero_state() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("events.json"), "not json at all").unwrap();

    let feed = EventFeed::new(
        StubStore::default(),
        cache_in(&dir),
        StubProbe { online: false },
    )
    .with_today(today());

    let events = feed.load_upcoming_events(3).await;

    assert!(events.is_empty(), "Corruption must read as a miss, not an error");
}

#[tokio::test]
async fn offline_cache_survives_repeated_loads() {
    // A stale-tier read must not evict the entry it serves
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    cache
        .write(CacheKey::Events, &vec![one_off("a", today() + chrono::Duration::days(1))])
        .await;

    let feed = EventFeed::new(StubStore::default(), cache, StubProbe { online: false })
        .with_today(today());

    let first = feed.load_upcoming_events(3).await;
    let second = feed.load_upcoming_events(3).await;

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn wait_for_online_is_usable_against_a_stub() {
    let probe = StubProbe { online: true };
    assert!(probe.wait_for_online(Duration::from_millis(50)).await);

    let probe = StubProbe { online: false };
    assert!(!probe.wait_for_online(Duration::from_millis(50)).await);
}
