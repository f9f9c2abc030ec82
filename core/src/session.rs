//! Monitoring session: one pipeline instance from raw line to announcement.
//!
//! Everything runs on a single task. The tail is the only await point that
//! can block, and the shutdown future is raced against it so an interrupt
//! while waiting for appends ends the run cleanly.

use std::future::Future;
use std::sync::Arc;

use deckwatch_types::WatchConfig;

use crate::catalogue::{Catalogue, load_catalogue};
use crate::error::WatchError;
use crate::events::{Announcement, AnnouncementHandler, GameSignal};
use crate::matcher::ArchetypeMatcher;
use crate::power_log::{Extractor, GameEvent, LogLine};
use crate::reader::{LogTail, StartPosition};
use crate::tracker::MatchTracker;

/// Counters reported when a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub lines: u64,
    pub events: u64,
    pub matches: u64,
    pub announcements: u64,
}

pub struct WatchSession {
    extractor: Extractor,
    tracker: MatchTracker,
    matcher: ArchetypeMatcher,
    catalogue: Arc<Catalogue>,
    handlers: Vec<Box<dyn AnnouncementHandler + Send>>,
    summary: WatchSummary,
}

impl WatchSession {
    pub fn new(config: &WatchConfig, catalogue: Arc<Catalogue>) -> Self {
        Self {
            extractor: Extractor::new(config.local_player_name()),
            tracker: MatchTracker::new(config.opponent_seat),
            matcher: ArchetypeMatcher::new(config.min_confidence),
            catalogue,
            handlers: Vec::new(),
            summary: WatchSummary::default(),
        }
    }

    /// Register an observer for archetype announcements
    pub fn add_handler(&mut self, handler: Box<dyn AnnouncementHandler + Send>) {
        self.handlers.push(handler);
    }

    pub fn tracker(&self) -> &MatchTracker {
        &self.tracker
    }

    pub fn matcher(&self) -> &ArchetypeMatcher {
        &self.matcher
    }

    pub fn summary(&self) -> WatchSummary {
        self.summary
    }

    /// Drive one raw line through the pipeline.
    pub fn process_line(&mut self, line: &LogLine) -> Vec<Announcement> {
        self.summary.lines += 1;
        match self.extractor.extract(&line.text) {
            Some(event) => self.process_event(event),
            None => Vec::new(),
        }
    }

    pub fn process_event(&mut self, event: GameEvent) -> Vec<Announcement> {
        self.summary.events += 1;
        let signals = self.tracker.process_event(event);

        let mut announcements = Vec::new();
        for signal in &signals {
            match signal {
                GameSignal::MatchStarted { .. } => {
                    self.summary.matches += 1;
                    self.matcher.reset();
                }
                GameSignal::OpponentCardRevealed { match_id, .. } => {
                    let Some(cards) = self.tracker.opponent_cards() else {
                        continue;
                    };
                    if let Some(announcement) = self.matcher.update(*match_id, cards, &self.catalogue) {
                        announcements.push(announcement);
                    }
                }
                GameSignal::OpponentIdentified { .. } => {}
            }
        }

        if !announcements.is_empty() {
            self.summary.announcements += announcements.len() as u64;
            for handler in &mut self.handlers {
                handler.handle_announcements(&announcements);
            }
        }

        announcements
    }

    /// Follow `tail` until `shutdown` resolves or the stream fails.
    pub async fn run<F>(&mut self, tail: &mut LogTail, shutdown: F) -> Result<WatchSummary, WatchError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(lines = self.summary.lines, "Shutdown requested, stopping monitor");
                    break;
                }
                line = tail.next_line() => {
                    let line = line?;
                    self.process_line(&line);
                }
            }
        }

        Ok(self.summary)
    }
}

/// Load the catalogue, open the log and monitor until `shutdown`.
///
/// Catalogue and log-file failures abort before any line is read.
pub async fn watch<F>(
    config: &WatchConfig,
    handlers: Vec<Box<dyn AnnouncementHandler + Send>>,
    shutdown: F,
) -> Result<WatchSummary, WatchError>
where
    F: Future<Output = ()>,
{
    let log_path = config.log_path.as_ref().ok_or(WatchError::NoLogPath)?;
    let catalogue = Arc::new(load_catalogue(&config.catalogue_path)?);

    let start = if config.replay_history {
        StartPosition::Beginning
    } else {
        StartPosition::End
    };
    let mut tail = LogTail::open(log_path, start, config.poll_interval()).await?;

    let mut session = WatchSession::new(config, catalogue);
    for handler in handlers {
        session.add_handler(handler);
    }

    tracing::info!(path = %tail.path().display(), "Monitoring log file");
    session.run(&mut tail, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::MetaDeck;
    use std::sync::Mutex;

    fn config() -> WatchConfig {
        WatchConfig {
            local_player: Some("Me".to_string()),
            ..Default::default()
        }
    }

    fn catalogue() -> Arc<Catalogue> {
        Arc::new(Catalogue::from_decks(vec![
            MetaDeck::new("Aggro Foo", ["C1", "C2", "C3"]),
            MetaDeck::new("Control Bar", ["C4", "C5"]),
        ]))
    }

    fn line(seq: u64, text: &str) -> LogLine {
        LogLine {
            seq,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_noise_leaves_state_untouched() {
        let mut session = WatchSession::new(&config(), catalogue());
        for (i, text) in ["", "BLOCK_END", "D 1:00:00.0 LoadingScreen.OnSceneLoaded() - currMode=HUB"]
            .into_iter()
            .enumerate()
        {
            assert!(session.process_line(&line(i as u64 + 1, text)).is_empty());
        }
        assert!(!session.tracker().is_active());
        assert_eq!(session.summary().lines, 3);
        assert_eq!(session.summary().events, 0);
    }

    #[test]
    fn test_handlers_receive_announcements() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut session = WatchSession::new(
            &WatchConfig {
                opponent_seat: Some(2),
                ..Default::default()
            },
            catalogue(),
        );
        session.add_handler(Box::new(move |a: &Announcement| {
            sink.lock().unwrap().push(a.archetype.clone());
        }));

        for (i, card) in ["C1", "C2", "C3"].into_iter().enumerate() {
            session.process_event(GameEvent::ZoneChanged {
                entity_id: 10 + i as u32,
                new_zone: crate::power_log::Zone::Play,
                controller_seat_id: Some(2),
                card_id: Some(card.into()),
            });
        }

        assert_eq!(*seen.lock().unwrap(), vec!["Aggro Foo".to_string()]);
        assert_eq!(session.summary().announcements, 1);
        assert_eq!(session.summary().matches, 1);
    }
}
