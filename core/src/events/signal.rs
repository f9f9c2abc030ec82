use std::fmt;

use crate::power_log::{CardId, SeatId};

/// Tracker-assigned identity of a match, unique within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Signals emitted by the MatchTracker for the matcher and observers.
/// These sit one level above raw log events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameSignal {
    MatchStarted {
        match_id: MatchId,
    },
    OpponentIdentified {
        match_id: MatchId,
        seat_id: SeatId,
        name: Option<String>,
    },
    /// Emitted once per distinct card per match.
    OpponentCardRevealed {
        match_id: MatchId,
        card_id: CardId,
    },
}

/// A surfaced change of the opponent's inferred archetype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub match_id: MatchId,
    pub archetype: String,
    /// Number of the opponent's cards found in the archetype.
    pub score: usize,
    pub matched_cards: Vec<CardId>,
}
