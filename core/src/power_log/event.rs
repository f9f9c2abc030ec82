use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Match participant slot as printed by the log (`player=2`, `PlayerID=2`).
pub type SeatId = u32;

/// Entity instance id, unique within one match.
pub type EntityId = u32;

/// Card identifier (`CS2_029`, `HERO_08`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for CardId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Zone {
    Deck,
    Hand,
    Play,
    Graveyard,
    Secret,
    #[default]
    Other,
}

impl Zone {
    /// Map a log zone name. Anything outside the tracked set (SETASIDE,
    /// REMOVEDFROMGAME, INVALID, ...) collapses into `Other`.
    pub fn parse(name: &str) -> Self {
        match name {
            "DECK" => Self::Deck,
            "HAND" => Self::Hand,
            "PLAY" => Self::Play,
            "GRAVEYARD" => Self::Graveyard,
            "SECRET" => Self::Secret,
            _ => Self::Other,
        }
    }
}

/// One raw line from the log plus its arrival order (starting at 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub seq: u64,
    pub text: String,
}

/// Typed event extracted from a single log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A game object was created. `match_key` is an opaque token that is
    /// stable for repeated sightings of the same match, if the dialect has one.
    MatchStarted { match_key: Option<String> },

    PlayerIdentified {
        name: String,
        seat_id: SeatId,
        /// `None` when the line alone cannot tell friend from foe.
        is_opponent: Option<bool>,
    },

    EntityCreated {
        entity_id: EntityId,
        card_id: Option<CardId>,
        owner_seat_id: Option<SeatId>,
        zone: Option<Zone>,
    },

    ZoneChanged {
        entity_id: EntityId,
        new_zone: Zone,
        controller_seat_id: Option<SeatId>,
        /// Card id printed alongside the entity, when already revealed.
        card_id: Option<CardId>,
    },
}
