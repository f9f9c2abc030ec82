//! Match state machine.
//!
//! The tracker moves between two states:
//! - Idle: no match seen yet
//! - Active: a match context exists and accumulates entity state
//!
//! There is no end-of-match record in the log. A match stays active until the
//! next match start (or, from Idle, the first entity evidence) replaces it.

mod context;


pub use context::{Entity, MatchContext, MatchSnapshot, SeatResolution, Seats};

use hashbrown::HashSet;

use crate::events::{GameSignal, MatchId};
use crate::power_log::{CardId, EntityId, GameEvent, SeatId, Zone};

#[derive(Debug)]
pub struct MatchTracker {
    /// Fixed opponent seat applied to every match, if configured.
    opponent_seat: Option<SeatId>,
    current: Option<MatchContext>,
    next_match_id: u64,
}

impl Default for MatchTracker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MatchTracker {
    pub fn new(opponent_seat: Option<SeatId>) -> Self {
        Self {
            opponent_seat,
            current: None,
            next_match_id: 1,
        }
    }

    pub fn current(&self) -> Option<&MatchContext> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Cards confirmed in play under the opponent in the active match.
    pub fn opponent_cards(&self) -> Option<&HashSet<CardId>> {
        self.current.as_ref().map(MatchContext::opponent_cards)
    }

    pub fn snapshot(&self) -> Option<MatchSnapshot> {
        self.current.as_ref().map(MatchSnapshot::from)
    }

    /// Apply one event and return the signals it produced, in order.
    pub fn process_event(&mut self, event: GameEvent) -> Vec<GameSignal> {
        let mut signals = Vec::new();

        match event {
            GameEvent::MatchStarted { match_key } => {
                if let Some(ctx) = &self.current
                    && match_key.is_some()
                    && ctx.key == match_key
                {
                    tracing::debug!(match_id = %ctx.id, "[MATCH] Repeated start of the active match ignored");
                    return signals;
                }
                let ctx = self.start_match(match_key, &mut signals);
                self.current = Some(ctx);
            }
            event => {
                let ctx = match self.current.take() {
                    Some(ctx) => ctx,
                    None => self.start_match(None, &mut signals),
                };
                let ctx = self.current.insert(ctx);
                apply_event(ctx, event, &mut signals);
            }
        }

        signals
    }

    fn start_match(&mut self, key: Option<String>, signals: &mut Vec<GameSignal>) -> MatchContext {
        let match_id = MatchId(self.next_match_id);
        self.next_match_id += 1;

        tracing::info!(
            "[MATCH] Starting match {} (key={})",
            match_id,
            key.as_deref().unwrap_or("none")
        );

        let ctx = MatchContext::new(match_id, key, self.opponent_seat);
        signals.push(GameSignal::MatchStarted { match_id });

        if let Some(seat_id) = ctx.seats.opponent {
            signals.push(GameSignal::OpponentIdentified {
                match_id,
                seat_id,
                name: None,
            });
        }

        ctx
    }
}

fn apply_event(ctx: &mut MatchContext, event: GameEvent, signals: &mut Vec<GameSignal>) {
    let opponent_before = ctx.seats.opponent;

    // (entity, moved into HAND by this event)
    let touched = match event {
        GameEvent::PlayerIdentified {
            name,
            seat_id,
            is_opponent,
        } => {
            handle_player_identified(ctx, name, seat_id, is_opponent);
            None
        }
        GameEvent::EntityCreated {
            entity_id,
            card_id,
            owner_seat_id,
            zone,
        } => {
            let entity = ctx.upsert_entity(entity_id);
            if card_id.is_some() {
                entity.card_id = card_id;
            }
            if owner_seat_id.is_some() {
                entity.controller = owner_seat_id;
            }
            if let Some(zone) = zone {
                entity.zone = zone;
            }
            Some((entity_id, false))
        }
        GameEvent::ZoneChanged {
            entity_id,
            new_zone,
            controller_seat_id,
            card_id,
        } => {
            let entity = ctx.upsert_entity(entity_id);
            entity.zone = new_zone;
            if controller_seat_id.is_some() {
                entity.controller = controller_seat_id;
            }
            if card_id.is_some() {
                entity.card_id = card_id;
            }
            tracing::debug!(entity_id, zone = ?new_zone, controller = ?entity.controller, "[MATCH] Zone change");
            Some((entity_id, new_zone == Zone::Hand))
        }
        // Match boundaries are handled by the tracker before reaching here.
        GameEvent::MatchStarted { .. } => None,
    };

    if let Some((entity_id, moved_to_hand)) = touched {
        observe_seats(ctx, entity_id, moved_to_hand);
    }

    match (opponent_before, ctx.seats.opponent) {
        (None, Some(seat_id)) => {
            tracing::info!(
                "[MATCH] Opponent is seat {} ({}) via {:?}",
                seat_id,
                ctx.seats.opponent_name().unwrap_or("unnamed"),
                ctx.seats.resolved_by
            );
            signals.push(GameSignal::OpponentIdentified {
                match_id: ctx.id,
                seat_id,
                name: ctx.seats.opponent_name().map(str::to_string),
            });
            // Anything that reached PLAY before the seats were known.
            for entity_id in ctx.entities_in_play() {
                reveal(ctx, entity_id, signals);
            }
        }
        _ => {
            if let Some((entity_id, _)) = touched {
                reveal(ctx, entity_id, signals);
            }
        }
    }
}

fn handle_player_identified(
    ctx: &mut MatchContext,
    name: String,
    seat_id: SeatId,
    is_opponent: Option<bool>,
) {
    tracing::debug!(seat_id, name = %name, ?is_opponent, "[MATCH] Player identified");
    ctx.seats.set_name(seat_id, name);
    match is_opponent {
        Some(true) => ctx
            .seats
            .resolve_opponent(seat_id, SeatResolution::Named),
        Some(false) => ctx.seats.resolve_local(seat_id),
        None => ctx.seats.note(seat_id),
    }
}

/// Seat bookkeeping driven by an entity update. A card drawn into a hand
/// hidden belongs to the opponent; one drawn face-up is ours.
///
/// Only zone moves count as draws. Reveals (SHOW_ENTITY) of cards the
/// opponent is about to play still print `zone=HAND` with a known card id.
fn observe_seats(ctx: &mut MatchContext, entity_id: EntityId, moved_to_hand: bool) {
    let Some(entity) = ctx.entity(entity_id) else {
        return;
    };
    let Some(controller) = entity.controller else {
        return;
    };
    let hidden_in_hand = moved_to_hand.then_some(entity.card_id.is_none());

    match hidden_in_hand {
        Some(true) => ctx
            .seats
            .resolve_opponent(controller, SeatResolution::HiddenHand),
        Some(false) => ctx.seats.resolve_local(controller),
        None => ctx.seats.note(controller),
    }
}

fn reveal(ctx: &mut MatchContext, entity_id: EntityId, signals: &mut Vec<GameSignal>) {
    if let Some(card_id) = ctx.reveal_opponent_card(entity_id) {
        tracing::info!(
            "[MATCH] Opponent played {} ({} distinct)",
            card_id,
            ctx.opponent_cards().len()
        );
        signals.push(GameSignal::OpponentCardRevealed {
            match_id: ctx.id,
            card_id,
        });
    }
}
