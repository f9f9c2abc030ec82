//! Shared configuration types for deckwatch.

pub mod config;

pub use config::{
    DEFAULT_CATALOGUE_PATH, DEFAULT_MIN_CONFIDENCE, DEFAULT_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS,
    MIN_POLL_INTERVAL_MS, WatchConfig,
};
