//! Utility functions

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;

/// Version information for the console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Event timestamp window ending at `now`, as unix seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWindow {
    pub from_timestamp: String,
    pub to_timestamp: String,
}

/// Window covering the last `days` days
///
/// Fails when the start of the window falls outside the representable date range.
pub fn event_window(now: DateTime<Utc>, days: u32) -> Result<EventWindow, ConsoleError> {
    let from = now
        .checked_sub_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| {
            ConsoleError::ConfigError(format!("event window of {} days is out of range", days))
        })?;
    Ok(EventWindow {
        from_timestamp: from.timestamp().to_string(),
        to_timestamp: now.timestamp().to_string(),
    })
}
