//! Command-line interface parsing for the Church Feed CLI
//!
//! This module handles parsing of CLI arguments using clap and folds them
//! into a validated feed configuration.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Default base URL of the remote events collection
const DEFAULT_EVENTS_URL: &str = "https://api.churchfeed.app/v1/events";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The recurrence horizon must cover at least one month
    #[error("Invalid horizon: must be at least 1 month")]
    InvalidHorizon,
}

/// Church Feed CLI - view upcoming church events, online or offline
#[derive(Parser, Debug)]
#[command(name = "churchfeed")]
#[command(about = "Upcoming church events, with cached fallback when offline")]
#[command(version)]
pub struct Cli {
    /// Maximum number of upcoming events to display
    #[arg(long, value_name = "COUNT", default_value_t = 3)]
    pub limit: usize,

    /// Base URL of the remote events collection
    #[arg(long, value_name = "URL", default_value = DEFAULT_EVENTS_URL)]
    pub events_url: String,

    /// How many calendar months forward to materialize recurring events
    #[arg(long, value_name = "MONTHS", default_value_t = 12)]
    pub horizon_months: u32,

    /// Override the cache directory (defaults to the XDG cache location)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for a feed run
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Maximum number of instances to return
    pub limit: usize,
    /// Base URL of the remote events collection
    pub events_url: String,
    /// Recurrence materialization horizon in calendar months
    pub horizon_months: u32,
    /// Custom cache directory, if any
    pub cache_dir: Option<PathBuf>,
}

impl FeedConfig {
    /// Creates a FeedConfig from parsed CLI arguments
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(FeedConfig)` with validated settings
    /// * `Err(CliError)` if a value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.horizon_months == 0 {
            return Err(CliError::InvalidHorizon);
        }

        Ok(Self {
            limit: cli.limit,
            events_url: cli.events_url.clone(),
            horizon_months: cli.horizon_months,
            cache_dir: cli.cache_dir.clone(),
        })
    }
}
