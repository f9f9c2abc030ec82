//! Line grammars observed across client revisions.
//!
//! Each dialect recognizes a handful of body shapes and returns at most one
//! event. Dialects are tried in priority order by the `Extractor`; adding a new
//! one never touches the tracker or matcher.

use super::event::{CardId, EntityId, GameEvent, SeatId, Zone};
use super::record::{LogRecord, field, find_descriptor, non_empty, parse_descriptor};

/// Hero cards share this id prefix.
const HERO_CARD_PREFIX: &str = "HERO_";

/// Hero powers reuse the hero id with this marker (`HERO_08bp`, `HERO_08bp2`).
const HERO_POWER_MARKER: &str = "bp";

/// Logger that replays GameState output; its CREATE_GAME is a duplicate.
const REPLAY_SOURCE: &str = "PowerTaskList";

pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_extract(&self, record: &LogRecord<'_>) -> Option<GameEvent>;
}

/// Entities referenced through bracketed descriptors, using either the
/// current `entityName=` key or the older `name=` key.
///
/// ```text
/// TAG_CHANGE Entity=[entityName=Fireball id=45 zone=HAND zonePos=3 cardId=CS2_029 player=2] tag=ZONE value=PLAY
/// TAG_CHANGE Entity=[name=Fireball id=45 zone=PLAY zonePos=1 cardId=CS2_029 player=2] tag=JUST_PLAYED value=1
/// FULL_ENTITY - Updating [entityName=Jaina Proudmoore id=64 zone=PLAY zonePos=0 cardId=HERO_08 player=1] CardID=HERO_08
/// SHOW_ENTITY - Updating Entity=[entityName=UNKNOWN ENTITY [cardType=INVALID] id=45 zone=DECK zonePos=0 cardId= player=2] CardID=CS2_029
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptorDialect;

impl Dialect for DescriptorDialect {
    fn name(&self) -> &'static str {
        "descriptor"
    }

    fn try_extract(&self, record: &LogRecord<'_>) -> Option<GameEvent> {
        let body = record.body;
        let open = find_descriptor(body)?;
        let (rest, desc) = parse_descriptor(&body[open..])?;
        let head = body[..open].trim_start();

        // A hero created or revealed in PLAY names its seat.
        if is_entity_record(head)
            && desc.zone == Some(Zone::Play)
            && desc.card_id.is_some_and(is_hero_card)
            && !desc.name.is_empty()
            && let Some(seat_id) = desc.player
        {
            return Some(GameEvent::PlayerIdentified {
                name: desc.name.to_string(),
                seat_id,
                is_opponent: None,
            });
        }

        if head.starts_with("TAG_CHANGE") {
            let new_zone = match field(rest, "tag")? {
                "ZONE" => Zone::parse(field(rest, "value")?),
                // Older clients flag the play itself while the entity already shows zone=PLAY.
                "JUST_PLAYED" if desc.zone == Some(Zone::Play) => Zone::Play,
                _ => return None,
            };
            return Some(GameEvent::ZoneChanged {
                entity_id: desc.id,
                new_zone,
                controller_seat_id: desc.player,
                card_id: desc.card_id.map(CardId::from),
            });
        }

        if is_entity_record(head) {
            let card_id = field(rest, "CardID")
                .and_then(non_empty)
                .or(desc.card_id)
                .map(CardId::from);
            return Some(GameEvent::EntityCreated {
                entity_id: desc.id,
                card_id,
                owner_seat_id: desc.player,
                zone: desc.zone,
            });
        }

        None
    }
}

/// Numeric entity ids and the game-level records.
///
/// ```text
/// CREATE_GAME
/// PlayerID=1, PlayerName=Foo#1234
/// FULL_ENTITY - Creating ID=45 CardID=CS2_029
/// SHOW_ENTITY - Updating Entity=45 CardID=CS2_029
/// TAG_CHANGE Entity=45 tag=ZONE value=PLAY
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct CompactDialect;

impl Dialect for CompactDialect {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn try_extract(&self, record: &LogRecord<'_>) -> Option<GameEvent> {
        let body = record.body;

        if body == "CREATE_GAME" {
            if record.source == Some(REPLAY_SOURCE) {
                return None;
            }
            return Some(GameEvent::MatchStarted {
                match_key: record.timestamp.map(str::to_string),
            });
        }

        if body.starts_with("PlayerID=") {
            return parse_player_name(body);
        }

        if body.starts_with("TAG_CHANGE") {
            let entity_id = numeric_entity(body, "Entity")?;
            if field(body, "tag")? != "ZONE" {
                return None;
            }
            return Some(GameEvent::ZoneChanged {
                entity_id,
                new_zone: Zone::parse(field(body, "value")?),
                controller_seat_id: None,
                card_id: None,
            });
        }

        if is_entity_record(body) {
            let entity_id = numeric_entity(body, "ID").or_else(|| numeric_entity(body, "Entity"))?;
            return Some(GameEvent::EntityCreated {
                entity_id,
                card_id: field(body, "CardID").and_then(non_empty).map(CardId::from),
                owner_seat_id: None,
                zone: None,
            });
        }

        None
    }
}

fn is_entity_record(head: &str) -> bool {
    head.starts_with("FULL_ENTITY")
        || head.starts_with("SHOW_ENTITY")
        || head.starts_with("CHANGE_ENTITY")
}

fn is_hero_card(card_id: &str) -> bool {
    card_id
        .strip_prefix(HERO_CARD_PREFIX)
        .is_some_and(|rest| !rest.contains(HERO_POWER_MARKER))
}

fn numeric_entity(body: &str, key: &str) -> Option<EntityId> {
    field(body, key)?.parse::<EntityId>().ok()
}

// PlayerID=1, PlayerName=Foo#1234
fn parse_player_name(body: &str) -> Option<GameEvent> {
    let (seat, name) = body.split_once(',')?;
    let seat_id = seat.trim().strip_prefix("PlayerID=")?.parse::<SeatId>().ok()?;
    let name = non_empty(name.trim().strip_prefix("PlayerName=")?)?;

    Some(GameEvent::PlayerIdentified {
        name: name.to_string(),
        seat_id,
        is_opponent: None,
    })
}

/// Built-in dialects in priority order.
pub fn builtin_dialects() -> Vec<Box<dyn Dialect>> {
    vec![Box::new(DescriptorDialect), Box::new(CompactDialect)]
}
