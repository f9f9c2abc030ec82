use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};

use crate::events::MatchId;
use crate::power_log::{CardId, EntityId, SeatId, Zone};

/// One in-game object instance within the current match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub entity_id: EntityId,
    /// `None` until the card is revealed.
    pub card_id: Option<CardId>,
    pub controller: Option<SeatId>,
    pub zone: Zone,
}

impl Entity {
    fn placeholder(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            card_id: None,
            controller: None,
            zone: Zone::Other,
        }
    }
}

/// How the opponent's seat was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatResolution {
    /// Pinned by configuration.
    Configured,
    /// A player name matched (or did not match) the local player.
    Named,
    /// A hidden card entered that seat's hand.
    HiddenHand,
    /// The only other seat once the local one was known.
    Inferred,
}

/// Seat roles for one match. The first resolution wins; later evidence
/// never flips a resolved seat.
#[derive(Debug, Clone, Default)]
pub struct Seats {
    pub local: Option<SeatId>,
    pub opponent: Option<SeatId>,
    pub resolved_by: Option<SeatResolution>,
    known: BTreeSet<SeatId>,
    names: HashMap<SeatId, String>,
}

impl Seats {
    fn pinned(opponent: SeatId) -> Self {
        let mut seats = Self {
            opponent: Some(opponent),
            resolved_by: Some(SeatResolution::Configured),
            ..Default::default()
        };
        seats.known.insert(opponent);
        seats
    }

    pub fn name(&self, seat: SeatId) -> Option<&str> {
        self.names.get(&seat).map(String::as_str)
    }

    pub fn opponent_name(&self) -> Option<&str> {
        self.opponent.and_then(|seat| self.name(seat))
    }

    pub(crate) fn note(&mut self, seat: SeatId) {
        if self.known.insert(seat) {
            self.infer_opponent();
        }
    }

    /// First name reported for a seat is kept.
    pub(crate) fn set_name(&mut self, seat: SeatId, name: String) {
        self.names.entry(seat).or_insert(name);
    }

    pub(crate) fn resolve_opponent(&mut self, seat: SeatId, how: SeatResolution) {
        if self.opponent.is_none() && self.local != Some(seat) {
            self.opponent = Some(seat);
            self.resolved_by = Some(how);
        }
        self.known.insert(seat);
    }

    pub(crate) fn resolve_local(&mut self, seat: SeatId) {
        self.known.insert(seat);
        if self.local.is_none() && self.opponent != Some(seat) {
            self.local = Some(seat);
        }
        self.infer_opponent();
    }

    fn infer_opponent(&mut self) {
        if self.opponent.is_some() {
            return;
        }
        let Some(local) = self.local else {
            return;
        };
        if let Some(&other) = self.known.iter().find(|&&seat| seat != local) {
            self.opponent = Some(other);
            self.resolved_by = Some(SeatResolution::Inferred);
        }
    }
}

/// State of the active match. Discarded wholesale when the next match starts.
#[derive(Debug, Clone)]
pub struct MatchContext {
    pub id: MatchId,
    /// Dialect-provided key used to recognize repeated starts of this match.
    pub key: Option<String>,
    pub seats: Seats,
    entities: HashMap<EntityId, Entity>,
    opponent_cards: HashSet<CardId>,
}

impl MatchContext {
    pub fn new(id: MatchId, key: Option<String>, opponent_seat: Option<SeatId>) -> Self {
        Self {
            id,
            key,
            seats: opponent_seat.map(Seats::pinned).unwrap_or_default(),
            entities: HashMap::new(),
            opponent_cards: HashSet::new(),
        }
    }

    // --- Entities ---

    pub fn entity(&self, entity_id: EntityId) -> Option<&Entity> {
        self.entities.get(&entity_id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Existing entity, or a placeholder with nothing revealed yet.
    pub(crate) fn upsert_entity(&mut self, entity_id: EntityId) -> &mut Entity {
        self.entities
            .entry(entity_id)
            .or_insert_with(|| Entity::placeholder(entity_id))
    }

    // --- Opponent cards ---

    pub fn opponent_cards(&self) -> &HashSet<CardId> {
        &self.opponent_cards
    }

    /// Add the entity's card to the opponent set if it sits in PLAY under the
    /// opponent with a known card id. Returns the card only when it is new.
    pub(crate) fn reveal_opponent_card(&mut self, entity_id: EntityId) -> Option<CardId> {
        let opponent = self.seats.opponent?;
        let entity = self.entities.get(&entity_id)?;
        if entity.zone != Zone::Play || entity.controller != Some(opponent) {
            return None;
        }
        let Some(card_id) = entity.card_id.clone() else {
            tracing::debug!(entity_id, "[MATCH] Opponent entity in play, card not yet revealed");
            return None;
        };

        self.opponent_cards
            .insert(card_id.clone())
            .then_some(card_id)
    }

    /// Ids of every entity currently in PLAY, in ascending order.
    pub(crate) fn entities_in_play(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .entities
            .values()
            .filter(|e| e.zone == Zone::Play)
            .map(|e| e.entity_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Read-only summary of the active match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    pub opponent_seat: Option<SeatId>,
    pub opponent_name: Option<String>,
    /// Sorted for stable display.
    pub opponent_cards: Vec<CardId>,
    pub entity_count: usize,
}

impl From<&MatchContext> for MatchSnapshot {
    fn from(ctx: &MatchContext) -> Self {
        let mut opponent_cards: Vec<_> = ctx.opponent_cards.iter().cloned().collect();
        opponent_cards.sort();
        Self {
            match_id: ctx.id,
            opponent_seat: ctx.seats.opponent,
            opponent_name: ctx.seats.opponent_name().map(str::to_string),
            opponent_cards,
            entity_count: ctx.entities.len(),
        }
    }
}
