use super::dialect::{Dialect, builtin_dialects};
use super::event::GameEvent;
use super::record::LogRecord;

/// Turns raw lines into typed events by trying each dialect in order.
///
/// Stateless per call: the only configuration is the dialect list and the
/// optional local player name used to classify `PlayerIdentified` events.
pub struct Extractor {
    dialects: Vec<Box<dyn Dialect>>,
    local_player: Option<String>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Extractor {
    pub fn new(local_player: Option<&str>) -> Self {
        Self::with_dialects(builtin_dialects(), local_player)
    }

    pub fn with_dialects(dialects: Vec<Box<dyn Dialect>>, local_player: Option<&str>) -> Self {
        Self {
            dialects,
            local_player: local_player.map(str::to_string),
        }
    }

    pub fn dialect_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dialects.iter().map(|d| d.name())
    }

    pub fn extract(&self, line: &str) -> Option<GameEvent> {
        let record = LogRecord::split(line);
        if record.body.is_empty() {
            return None;
        }

        let event = self
            .dialects
            .iter()
            .find_map(|dialect| dialect.try_extract(&record))?;

        Some(self.classify(event))
    }

    fn classify(&self, event: GameEvent) -> GameEvent {
        match event {
            GameEvent::PlayerIdentified {
                name,
                seat_id,
                is_opponent: None,
            } => {
                let is_opponent = self.local_player.as_deref().and_then(|local| {
                    if names_match(local, &name) {
                        Some(false)
                    } else if is_account_name(&name) {
                        Some(true)
                    } else {
                        // Hero names say nothing about who is sitting there.
                        None
                    }
                });
                GameEvent::PlayerIdentified {
                    name,
                    seat_id,
                    is_opponent,
                }
            }
            other => other,
        }
    }
}

/// Account names carry a `#discriminator`; hero card names never do.
fn is_account_name(name: &str) -> bool {
    name.contains('#')
}

/// Compare display names, ignoring the `#discriminator` when either side omits it.
fn names_match(local: &str, seen: &str) -> bool {
    if local.contains('#') && seen.contains('#') {
        return local.eq_ignore_ascii_case(seen);
    }
    let strip = |n: &str| n.split('#').next().unwrap_or(n).trim().to_string();
    strip(local).eq_ignore_ascii_case(&strip(seen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power_log::event::{CardId, Zone};

    #[test]
    fn test_unrecognized_lines_yield_nothing() {
        let extractor = Extractor::default();
        for line in [
            "",
            "   ",
            "D 20:20:36.4373230 GameState.DebugPrintPower() -",
            "D 20:20:36.4373230 GameState.DebugPrintPower() -     tag=CONTROLLER value=1",
            "D 20:20:36.4373230 PowerTaskList.DebugPrintPower() - BLOCK_END",
            "D 20:20:36.4373230 LoadingScreen.OnSceneLoaded() - prevMode=HUB currMode=GAMEPLAY",
            "TAG_CHANGE Entity=[entityName=Fireball id=45",
            "garbage [[[ ]]] id=",
            "FULL_ENTITY - Creating ID=abc CardID=X",
        ] {
            assert_eq!(extractor.extract(line), None, "line: {line:?}");
        }
    }

    #[test]
    fn test_dialects_tried_in_order() {
        let extractor = Extractor::default();
        let names: Vec<_> = extractor.dialect_names().collect();
        assert_eq!(names, vec!["descriptor", "compact"]);

        let descriptor_line = "D 20:21:00.0000000 PowerTaskList.DebugPrintPower() -     TAG_CHANGE Entity=[entityName=Fireball id=45 zone=HAND zonePos=3 cardId=CS2_029 player=2] tag=ZONE value=PLAY";
        let compact_line = "D 20:21:00.0000000 GameState.DebugPrintPower() - TAG_CHANGE Entity=45 tag=ZONE value=PLAY";

        assert_eq!(
            extractor.extract(descriptor_line),
            Some(GameEvent::ZoneChanged {
                entity_id: 45,
                new_zone: Zone::Play,
                controller_seat_id: Some(2),
                card_id: Some(CardId::from("CS2_029")),
            })
        );
        assert_eq!(
            extractor.extract(compact_line),
            Some(GameEvent::ZoneChanged {
                entity_id: 45,
                new_zone: Zone::Play,
                controller_seat_id: None,
                card_id: None,
            })
        );
    }

    #[test]
    fn test_player_classification_with_local_name() {
        let extractor = Extractor::new(Some("Me"));

        let local = extractor.extract("D 1:00:00.0 GameState.DebugPrintGame() - PlayerID=1, PlayerName=Me#1111");
        let foe = extractor.extract("D 1:00:00.0 GameState.DebugPrintGame() - PlayerID=2, PlayerName=Foe#2222");
        let hero = extractor.extract(
            "FULL_ENTITY - Updating [entityName=Rexxar id=66 zone=PLAY zonePos=0 cardId=HERO_05 player=2] CardID=HERO_05",
        );

        assert!(matches!(
            local,
            Some(GameEvent::PlayerIdentified { seat_id: 1, is_opponent: Some(false), .. })
        ));
        assert!(matches!(
            foe,
            Some(GameEvent::PlayerIdentified { seat_id: 2, is_opponent: Some(true), .. })
        ));
        assert!(matches!(
            hero,
            Some(GameEvent::PlayerIdentified { seat_id: 2, is_opponent: None, .. })
        ));
    }

    #[test]
    fn test_player_unclassified_without_local_name() {
        let extractor = Extractor::default();
        let event = extractor.extract("PlayerID=2, PlayerName=Foe#2222");
        assert!(matches!(
            event,
            Some(GameEvent::PlayerIdentified { is_opponent: None, .. })
        ));
    }

    #[test]
    fn test_names_match_ignores_discriminator_when_missing() {
        assert!(names_match("Me", "Me#1111"));
        assert!(names_match("me#1111", "Me#1111"));
        assert!(!names_match("Me#2222", "Me#1111"));
        assert!(!names_match("Meow", "Me#1111"));
    }
}
