//! Connectivity probe for detecting outbound network access
//!
//! Provides a cheap, best-effort reachability check used to decide whether
//! the feed should attempt the remote store at all. The probe fails closed:
//! any error or timeout reads as "offline", never as a propagated failure.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

/// Endpoint probed by default; only reachability matters, the body is ignored
const DEFAULT_PROBE_ENDPOINT: &str = "https://clients3.google.com/generate_204";

/// How long a single probe request may take before counting as offline
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a probe result is reused before re-probing
const DEFAULT_MEMO_TTL: Duration = Duration::from_secs(5);

/// Interval between probe attempts while waiting to come online
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Estimates whether the device currently has outbound connectivity
///
/// Implementations must never fail: uncertainty reads as offline. The trait
/// exists so the feed orchestrator can be driven by a stub in tests.
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Returns whether outbound network access currently succeeds
    async fn is_online(&self) -> bool;

    /// Interval between polls in [`wait_for_online`](Connectivity::wait_for_online)
    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    /// Polls [`is_online`](Connectivity::is_online) until it reports true or
    /// `timeout` elapses
    ///
    /// Resolves to `false` on timeout; never fails. Used by flows that want
    /// to block briefly for connectivity rather than immediately falling
    /// back to cached data.
    async fn wait_for_online(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.is_online().await {
                return true;
            }
            let interval = self.poll_interval();
            if start.elapsed() + interval >= timeout {
                return false;
            }
            tokio::time::sleep(interval).await;
        }
    }
}

/// A memoized probe result
#[derive(Debug, Clone, Copy)]
struct ProbeMemo {
    online: bool,
    checked_at: Instant,
}

/// Connectivity probe backed by a minimal HTTP request
///
/// Issues a GET against a lightweight endpoint with a short timeout and
/// memoizes the boolean result for a few seconds, so several UI components
/// checking connectivity in the same render pass share one probe instead of
/// causing a probe storm. The memo is owned by the instance; independent
/// probes have independent state and clocks.
#[derive(Debug)]
pub struct HttpProbe {
    client: reqwest::Client,
    endpoint: String,
    probe_timeout: Duration,
    memo_ttl: Duration,
    memo: Mutex<Option<ProbeMemo>>,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProbe {
    /// Creates a new probe with default endpoint and intervals
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_PROBE_ENDPOINT.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            memo_ttl: DEFAULT_MEMO_TTL,
            memo: Mutex::new(None),
        }
    }

    /// Overrides the probed endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides the per-request probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Overrides how long a probe result is memoized
    pub fn with_memo_ttl(mut self, ttl: Duration) -> Self {
        self.memo_ttl = ttl;
        self
    }

    /// Returns the memoized result if it is still within its TTL
    fn memoized(&self) -> Option<bool> {
        let memo = self
            .memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let memo = (*memo)?;
        (memo.checked_at.elapsed() <= self.memo_ttl).then_some(memo.online)
    }

    /// Stores a probe result with the current time
    fn remember(&self, online: bool) {
        let mut memo = self
            .memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *memo = Some(ProbeMemo {
            online,
            checked_at: Instant::now(),
        });
    }

    /// Issues the actual probe request
    ///
    /// Any response counts as connectivity; the status and body are
    /// irrelevant. Any error (DNS, refused, timeout) counts as offline.
    async fn probe(&self) -> bool {
        let result = self
            .client
            .get(&self.endpoint)
            .timeout(self.probe_timeout)
            .send()
            .await;

        match result {
            Ok(response) => {
                debug!(status = %response.status(), "connectivity probe succeeded");
                true
            }
            Err(e) => {
                debug!(error = %e, "connectivity probe failed, assuming offline");
                false
            }
        }
    }

    /// Seeds the memo directly, bypassing the network
    #[cfg(test)]
    fn seed_memo(&self, online: bool) {
        self.remember(online);
    }
}

#[async_trait]
impl Connectivity for HttpProbe {
    async fn is_online(&self) -> bool {
        if let Some(online) = self.memoized() {
            return online;
        }
        let online = self.probe().await;
        self.remember(online);
        online
    }
}
