//! Tiered key-value cache backed by JSON files
//!
//! Each logical dataset is stored whole under its own [`CacheKey`] with the
//! time it was written. Freshness is decided at read time against a caller
//! supplied maximum age, so the same entry can serve both the fresh path and
//! the stale offline-fallback path.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

/// Default maximum age for freshness-checked reads (24 hours)
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Identifies one logical dataset in the cache
///
/// One entry exists per key; writes replace the whole value. Using an enum
/// rather than free-form strings keeps call sites from inventing colliding
/// or misspelled keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Events,
    Announcements,
    Devotionals,
    Departments,
    Ministries,
    Sermons,
    UserProfile,
}

impl CacheKey {
    /// Every key, in one place, so `evict_all` cannot miss a dataset
    pub const ALL: [CacheKey; 7] = [
        CacheKey::Events,
        CacheKey::Announcements,
        CacheKey::Devotionals,
        CacheKey::Departments,
        CacheKey::Ministries,
        CacheKey::Sermons,
        CacheKey::UserProfile,
    ];

    /// Returns the stable on-disk name for this key
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::Events => "events",
            CacheKey::Announcements => "announcements",
            CacheKey::Devotionals => "devotionals",
            CacheKey::Departments => "departments",
            CacheKey::Ministries => "ministries",
            CacheKey::Sermons => "sermons",
            CacheKey::UserProfile => "user_profile",
        }
    }
}

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

/// Manages reading and writing cached datasets to disk
///
/// Data is stored as one JSON file per [`CacheKey`] in an XDG-compliant
/// cache directory (`~/.cache/churchfeed/` on Linux). The cache is an
/// optimization, never a required write path: storage failures are logged
/// and swallowed, and corrupt entries read as misses.
#[derive(Debug, Clone)]
pub struct TieredCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl TieredCache {
    /// Creates a new TieredCache using an XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "churchfeed")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new TieredCache with a custom cache directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the cache file for the given key
    fn entry_path(&self, key: CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key.as_str()))
    }

    /// Writes a whole-value replacement for the given key
    ///
    /// The value is stored together with the current timestamp. This never
    /// fails upward: serialization or storage errors are logged and the
    /// caller proceeds as if the write happened.
    pub async fn write<T: Serialize>(&self, key: CacheKey, data: &T) {
        if let Err(e) = tokio::fs::create_dir_all(&self.cache_dir).await {
            warn!(key = key.as_str(), error = %e, "failed to create cache directory");
            return;
        }

        let entry = CacheEntry {
            data,
            cached_at: Utc::now(),
        };

        let json = match serde_json::to_string_pretty(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = tokio::fs::write(self.entry_path(key), json).await {
            warn!(key = key.as_str(), error = %e, "failed to write cache entry");
        }
    }

    /// Reads the entry for `key` if it is younger than `max_age`
    ///
    /// Returns `None` if no entry exists or the entry has expired. An
    /// expired entry is evicted as a side effect, so a later stale read
    /// will not resurrect it.
    pub async fn read_fresh<T: DeserializeOwned>(
        &self,
        key: CacheKey,
        max_age: Duration,
    ) -> Option<T> {
        let entry: CacheEntry<T> = self.read_entry(key).await?;

        let age = Utc::now().signed_duration_since(entry.cached_at);
        if age.num_milliseconds().max(0) as u128 > max_age.as_millis() {
            debug!(key = key.as_str(), "cache entry expired, evicting");
            self.evict(key).await;
            return None;
        }

        Some(entry.data)
    }

    /// Reads the entry for `key` regardless of its age
    ///
    /// Used exclusively by offline-fallback paths, where any data is better
    /// than none. Returns `None` only if the entry is absent or unreadable.
    pub async fn read_stale<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        let entry: CacheEntry<T> = self.read_entry(key).await?;
        Some(entry.data)
    }

    /// Removes the entry for `key`, if present
    pub async fn evict(&self, key: CacheKey) {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(key = key.as_str(), error = %e, "failed to evict cache entry"),
        }
    }

    /// Removes every dataset's entry
    pub async fn evict_all(&self) {
        for key in CacheKey::ALL {
            self.evict(key).await;
        }
    }

    /// Returns how old the current entry for `key` is
    ///
    /// Diagnostics only; the feed pipeline never branches on this. Returns
    /// `None` if no entry exists.
    pub async fn age(&self, key: CacheKey) -> Option<Duration> {
        let entry: CacheEntry<serde_json::Value> = self.read_entry(key).await?;
        Utc::now()
            .signed_duration_since(entry.cached_at)
            .to_std()
            .ok()
            .or(Some(Duration::ZERO))
    }

    /// Reads and parses the raw entry for `key`
    ///
    /// A missing file is a plain miss; an unreadable or undeserializable
    /// payload is logged and also treated as a miss, so corruption never
    /// propagates to a feed load.
    async fn read_entry<T: DeserializeOwned>(&self, key: CacheKey) -> Option<CacheEntry<T>> {
        let path = self.entry_path(key);
        let content = tokio::fs::read_to_string(&path).await.ok()?;

        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = key.as_str(), error = %e, "corrupt cache entry, treating as miss");
                None
            }
        }
    }
}
