//! Church Feed CLI - view upcoming church events
//!
//! Prints the next few upcoming events from the remote events collection,
//! falling back to cached data when the network is unavailable.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use churchfeed::cache::{CacheKey, TieredCache};
use churchfeed::cli::{Cli, FeedConfig};
use churchfeed::connectivity::HttpProbe;
use churchfeed::data::HttpEventStore;
use churchfeed::feed::EventFeed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("churchfeed=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = FeedConfig::from_cli(&cli)?;

    let cache = match &config.cache_dir {
        Some(dir) => TieredCache::with_dir(dir.clone()),
        None => TieredCache::new()
            .unwrap_or_else(|| TieredCache::with_dir(std::env::temp_dir().join("churchfeed"))),
    };

    if let Some(age) = cache.age(CacheKey::Events).await {
        tracing::debug!(age_secs = age.as_secs(), "cached events dataset age");
    }

    let store = HttpEventStore::new(config.events_url.clone());
    let probe = HttpProbe::new();
    let feed = EventFeed::new(store, cache, probe).with_horizon_months(config.horizon_months);

    let events = feed.load_upcoming_events(config.limit).await;

    if events.is_empty() {
        println!("No upcoming events.");
        return Ok(());
    }

    for event in &events {
        let mut line = match event.end_date {
            Some(end) => format!("{} to {}", event.date, end),
            None => event.date.to_string(),
        };
        if !event.time.is_empty() {
            line.push_str(&format!("  {}", event.time));
        }
        line.push_str(&format!("  {}", event.title));
        if !event.location.is_empty() {
            line.push_str(&format!(" @ {}", event.location));
        }
        println!("{}", line);
    }

    Ok(())
}
