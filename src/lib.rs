//! Church Feed Library
//!
//! Offline-resilient upcoming-events pipeline: connectivity probing, tiered
//! caching, recurrence expansion, and the feed orchestrator that composes
//! them into a single never-failing call.

pub mod cache;
pub mod cli;
pub mod connectivity;
pub mod data;
pub mod feed;
pub mod recurrence;

pub use cache::{CacheKey, TieredCache, DEFAULT_MAX_AGE};
pub use connectivity::{Connectivity, HttpProbe};
pub use data::{
    EventInstance, EventRecord, EventStore, HttpEventStore, RecurrencePattern, StoreError,
};
pub use feed::{EventFeed, FeedTier};
pub use recurrence::expand;
