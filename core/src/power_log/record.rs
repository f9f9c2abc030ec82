//! Low-level line slicing shared by the dialects.
//!
//! Power.log lines look like
//! `D 20:20:36.4373230 PowerTaskList.DebugPrintPower() -     TAG_CHANGE Entity=[...] tag=ZONE value=PLAY`.
//! The header (level, timestamp, logger) is split off once; dialects only see the body.

use memchr::{memchr, memmem};

use super::event::{EntityId, SeatId, Zone};

/// A log line split into header parts and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub timestamp: Option<&'a str>,
    /// Logger name before the first `.` (`GameState`, `PowerTaskList`).
    pub source: Option<&'a str>,
    pub body: &'a str,
}

impl<'a> LogRecord<'a> {
    pub fn split(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(pos) = memmem::find(line.as_bytes(), b"() -") else {
            return Self {
                timestamp: None,
                source: None,
                body: line.trim(),
            };
        };

        let header = &line[..pos];
        let body = line[pos + 4..].trim();

        let mut timestamp = None;
        let mut logger = None;
        for token in header.split_whitespace() {
            if timestamp.is_none() && token.as_bytes().first().is_some_and(u8::is_ascii_digit) {
                timestamp = Some(token);
            } else {
                logger = Some(token);
            }
        }

        let source = logger.map(|l| l.split_once('.').map_or(l, |(name, _)| name));

        Self {
            timestamp,
            source,
            body,
        }
    }
}

/// Value of `key=` among whitespace-separated `key=value` tokens.
pub fn field<'a>(input: &'a str, key: &str) -> Option<&'a str> {
    input.split_whitespace().find_map(|token| {
        let (k, v) = token.split_once('=')?;
        (k == key).then_some(v)
    })
}

pub fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Bracketed entity reference:
/// `[entityName=Fireball id=45 zone=HAND zonePos=3 cardId=CS2_029 player=2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor<'a> {
    pub name: &'a str,
    pub id: EntityId,
    pub zone: Option<Zone>,
    pub card_id: Option<&'a str>,
    pub player: Option<SeatId>,
}

// [entityName=Jaina Proudmoore id=64 zone=PLAY zonePos=0 cardId=HERO_08 player=1]
// [name=Fireball id=45 zone=HAND zonePos=3 cardId=CS2_029 player=2]
// [entityName=UNKNOWN ENTITY [cardType=INVALID] id=45 zone=DECK zonePos=0 cardId= player=2]

const DESCRIPTOR_KEYS: [&str; 5] = [" id=", " zone=", " zonePos=", " cardId=", " player="];

/// Parse a descriptor starting at the first byte of `input` (which must be `[`).
/// Returns the remaining input after the closing bracket.
pub fn parse_descriptor(input: &str) -> Option<(&str, EntityDescriptor<'_>)> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }
    let close = find_matching_bracket(bytes, 0)?;
    let inner = &input[1..close];

    let (name, fields) = if let Some(rest) = inner
        .strip_prefix("entityName=")
        .or_else(|| inner.strip_prefix("name="))
    {
        // Names may contain spaces and nested brackets; they end at the first known key.
        let end = DESCRIPTOR_KEYS
            .iter()
            .filter_map(|key| memmem::find(rest.as_bytes(), key.as_bytes()))
            .min()?;
        (rest[..end].trim(), &rest[end + 1..])
    } else {
        ("", inner)
    };

    let id = field(fields, "id")?.parse::<EntityId>().ok()?;
    let zone = field(fields, "zone").map(Zone::parse);
    let card_id = field(fields, "cardId").and_then(non_empty);
    let player = field(fields, "player").and_then(|p| p.parse::<SeatId>().ok());

    Some((
        &input[close + 1..],
        EntityDescriptor {
            name,
            id,
            zone,
            card_id,
            player,
        },
    ))
}

/// Find the closing bracket matching the `[` at `start`, handling nesting.
fn find_matching_bracket(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Position of the first descriptor in a body, if any.
pub fn find_descriptor(body: &str) -> Option<usize> {
    memchr(b'[', body.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_power_log_header() {
        let line = "D 20:20:36.4373230 GameState.DebugPrintPower() -     TAG_CHANGE Entity=4 tag=ZONE value=PLAY\r\n";
        let record = LogRecord::split(line);
        assert_eq!(record.timestamp, Some("20:20:36.4373230"));
        assert_eq!(record.source, Some("GameState"));
        assert_eq!(record.body, "TAG_CHANGE Entity=4 tag=ZONE value=PLAY");
    }

    #[test]
    fn test_split_bare_line() {
        let record = LogRecord::split("   CREATE_GAME  ");
        assert_eq!(record.timestamp, None);
        assert_eq!(record.source, None);
        assert_eq!(record.body, "CREATE_GAME");
    }

    #[test]
    fn test_descriptor_with_nested_brackets_and_empty_card() {
        let input = "[entityName=UNKNOWN ENTITY [cardType=INVALID] id=45 zone=DECK zonePos=0 cardId= player=2] CardID=CS2_029";
        let (rest, desc) = parse_descriptor(input).expect("Should parse");
        assert_eq!(desc.name, "UNKNOWN ENTITY [cardType=INVALID]");
        assert_eq!(desc.id, 45);
        assert_eq!(desc.zone, Some(Zone::Deck));
        assert_eq!(desc.card_id, None);
        assert_eq!(desc.player, Some(2));
        assert_eq!(rest, " CardID=CS2_029");
    }

    #[test]
    fn test_descriptor_legacy_name_key_and_reordered_fields() {
        let input = "[name=Fireball player=2 cardId=CS2_029 id=45 zone=HAND]";
        let (_, desc) = parse_descriptor(input).expect("Should parse");
        assert_eq!(desc.name, "Fireball");
        assert_eq!(desc.id, 45);
        assert_eq!(desc.zone, Some(Zone::Hand));
        assert_eq!(desc.card_id, Some("CS2_029"));
        assert_eq!(desc.player, Some(2));
    }

    #[test]
    fn test_descriptor_without_name() {
        let (_, desc) = parse_descriptor("[id=7 cardId=EX1_001 player=1]").expect("Should parse");
        assert_eq!(desc.name, "");
        assert_eq!(desc.id, 7);
        assert_eq!(desc.card_id, Some("EX1_001"));
        assert_eq!(desc.player, Some(1));
    }

    #[test]
    fn test_descriptor_rejects_unterminated_or_idless() {
        assert!(parse_descriptor("[entityName=Fireball id=45 zone=HAND").is_none());
        assert!(parse_descriptor("[entityName=Fireball zone=HAND]").is_none());
        assert!(parse_descriptor("entityName=Fireball id=45]").is_none());
    }
}
