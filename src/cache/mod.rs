//! Tiered cache for persisting remote datasets to disk
//!
//! This module provides a cache that persists serializable payloads to the
//! filesystem together with a write timestamp. Reads come in two tiers: a
//! freshness-checked read that treats expiry as a miss (and eagerly evicts),
//! and an age-ignoring read used only by offline-fallback paths.

mod tiered;

pub use tiered::{CacheKey, TieredCache, DEFAULT_MAX_AGE};
