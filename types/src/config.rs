//! Watcher configuration.
//!
//! Persisted as TOML by the binary; every field has a default so a partial
//! (or missing) file still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CATALOGUE_PATH: &str = "meta_decks.json";

/// Minimum number of matching cards a verdict must strictly exceed.
pub const DEFAULT_MIN_CONFIDENCE: usize = 2;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
pub const MAX_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Power.log to follow. Resolving the platform default is left to the caller.
    pub log_path: Option<PathBuf>,
    pub catalogue_path: PathBuf,
    pub min_confidence: usize,
    pub poll_interval_ms: u64,
    /// Replay the existing file contents before following appends.
    pub replay_history: bool,
    /// Display name of the local player, used to tell the two seats apart.
    pub local_player: Option<String>,
    /// Pin the opponent to a fixed seat instead of inferring it.
    pub opponent_seat: Option<u32>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            catalogue_path: PathBuf::from(DEFAULT_CATALOGUE_PATH),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            replay_history: true,
            local_player: None,
            opponent_seat: None,
        }
    }
}

impl WatchConfig {
    /// Idle delay between polls once the reader has caught up, clamped so a
    /// bad value can neither busy-spin nor stall the tail.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS),
        )
    }

    /// Local player name, ignoring blank values.
    pub fn local_player_name(&self) -> Option<&str> {
        self.local_player
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
