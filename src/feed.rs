//! Upcoming-events feed orchestrator
//!
//! Coordinates the connectivity probe, the remote event store, the tiered
//! cache, and recurrence expansion into a single call that never fails:
//! probe, walk the fallback tiers for a record collection, expand, filter to
//! today-forward, sort, truncate. Worst case is an empty list.

use chrono::{Local, NaiveDate, NaiveTime};
use tracing::{debug, warn};

use crate::cache::{CacheKey, TieredCache, DEFAULT_MAX_AGE};
use crate::connectivity::Connectivity;
use crate::data::{EventInstance, EventRecord, EventStore, StoreError};
use crate::recurrence::expand;

/// How far forward recurring rules are materialized, in calendar months
const FEED_HORIZON_MONTHS: u32 = 12;

/// The data tiers a feed load can be served from, in fallback order
///
/// `CacheFresh` is the entry tier for read sites that require data no older
/// than the cache's maximum age. The upcoming-events loader deliberately
/// skips it: its offline fallback wants any data, however old, and a
/// freshness-checked read would eagerly evict the very entry the stale tier
/// is there to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTier {
    /// Live query against the remote store
    Remote,
    /// Cache read honoring the maximum age
    CacheFresh,
    /// Cache read ignoring age entirely
    CacheStale,
    /// Nothing available; resolve to an empty collection
    Empty,
}

impl FeedTier {
    /// Entry tier for a load, given the probe's verdict
    ///
    /// Offline loads skip straight to the stale cache: expiry is irrelevant
    /// when there is no network to refresh from.
    pub fn first(online: bool) -> Self {
        if online {
            FeedTier::Remote
        } else {
            FeedTier::CacheStale
        }
    }

    /// Tier to fall back to when the current tier produced nothing
    ///
    /// A remote failure while "online" behaves exactly as if offline.
    /// `Empty` is terminal.
    pub fn next(self) -> Self {
        match self {
            FeedTier::Remote => FeedTier::CacheStale,
            FeedTier::CacheFresh => FeedTier::CacheStale,
            FeedTier::CacheStale => FeedTier::Empty,
            FeedTier::Empty => FeedTier::Empty,
        }
    }
}

/// Orchestrates loading the upcoming-events feed
///
/// Owns the remote store, the cache, and the connectivity probe. Concurrent
/// loads are not serialized; each call runs its full pipeline independently
/// and the last cache write wins.
pub struct EventFeed<S, P> {
    store: S,
    cache: TieredCache,
    probe: P,
    horizon_months: u32,
    today: Option<NaiveDate>,
}

impl<S: EventStore, P: Connectivity> EventFeed<S, P> {
    /// Creates a feed over the given store, cache, and probe
    pub fn new(store: S, cache: TieredCache, probe: P) -> Self {
        Self {
            store,
            cache,
            probe,
            horizon_months: FEED_HORIZON_MONTHS,
            today: None,
        }
    }

    /// Overrides the recurrence materialization horizon
    pub fn with_horizon_months(mut self, months: u32) -> Self {
        self.horizon_months = months;
        self
    }

    /// Pins the date used as "today"
    ///
    /// The filter and expansion steps otherwise read the local clock; tests
    /// pin a date so results do not depend on when they run.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Loads the next `limit` upcoming event instances
    ///
    /// Never fails: remote errors fall back to cached data, cache misses
    /// fall back to an empty list. Instances dated before today are
    /// excluded; the rest are sorted ascending by date, then by time of day
    /// parsed from the display time (unparsable times sort as start of
    /// day, keeping their original order relative to each other).
    pub async fn load_upcoming_events(&self, limit: usize) -> Vec<EventInstance> {
        let online = self.probe.is_online().await;
        let records = self.load_records(online).await;

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut instances = expand(&records, self.horizon_months, today);

        instances.retain(|instance| instance.date >= today);
        sort_instances(&mut instances);
        instances.truncate(limit);

        instances
    }

    /// Walks the fallback tiers until one produces a record collection
    async fn load_records(&self, online: bool) -> Vec<EventRecord> {
        let mut tier = FeedTier::first(online);

        loop {
            match tier {
                FeedTier::Remote => match self.fetch_remote().await {
                    Ok(records) => {
                        debug!(count = records.len(), "serving live remote events");
                        self.cache.write(CacheKey::Events, &records).await;
                        return records;
                    }
                    Err(e) => {
                        warn!(error = %e, "remote events query failed, falling back to cache");
                    }
                },
                FeedTier::CacheFresh => {
                    if let Some(records) = self
                        .cache
                        .read_fresh::<Vec<EventRecord>>(CacheKey::Events, DEFAULT_MAX_AGE)
                        .await
                    {
                        debug!(count = records.len(), "serving fresh cached events");
                        return records;
                    }
                }
                FeedTier::CacheStale => {
                    if let Some(records) = self
                        .cache
                        .read_stale::<Vec<EventRecord>>(CacheKey::Events)
                        .await
                    {
                        debug!(count = records.len(), "serving cached events");
                        return records;
                    }
                }
                FeedTier::Empty => {
                    debug!("no events available from any tier");
                    return Vec::new();
                }
            }
            tier = tier.next();
        }
    }

    /// Queries the remote store, preferring the date-ordered shape
    ///
    /// If the ordered query fails (e.g., a missing index) the unordered
    /// query is tried and the sort applied in memory instead.
    async fn fetch_remote(&self) -> Result<Vec<EventRecord>, StoreError> {
        match self.store.fetch_ordered().await {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, "ordered events query failed, retrying unordered");
                let mut records = self.store.fetch_unordered().await?;
                records.sort_by_key(|record| record.date);
                Ok(records)
            }
        }
    }
}

/// Sorts instances ascending by (date, time of day)
///
/// The sort is stable, so two same-day instances with unparsable times keep
/// their original collection order.
pub(crate) fn sort_instances(instances: &mut [EventInstance]) {
    instances.sort_by_key(|instance| {
        (
            instance.date,
            parse_display_time(&instance.time).unwrap_or(NaiveTime::MIN),
        )
    });
}

/// Best-effort parse of a free-form display time ("6:00 PM", "18:30")
///
/// Returns `None` for anything unrecognized; callers treat that as start of
/// day. Ordering is the only consumer, so precision beyond minutes is not
/// attempted.
pub(crate) fn parse_display_time(time: &str) -> Option<NaiveTime> {
    let trimmed = time.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in ["%I:%M %p", "%I:%M%p", "%H:%M", "%I %p"] {
        if let Ok(parsed) = NaiveTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }

    None
}
