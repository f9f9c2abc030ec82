use std::io::Write;

use deckwatch_core::{Announcement, AnnouncementHandler};

/// Prints each archetype announcement as a banner on stdout.
#[derive(Debug, Default)]
pub struct BannerPrinter;

pub fn render(announcement: &Announcement) -> String {
    let cards = announcement
        .matched_cards
        .iter()
        .map(|card| card.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "==================================================\n\
         Match {}: opponent is playing {}\n\
         {} matching cards: {}\n\
         ==================================================",
        announcement.match_id, announcement.archetype, announcement.score, cards
    )
}

impl AnnouncementHandler for BannerPrinter {
    fn handle_announcement(&mut self, announcement: &Announcement) {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{}", render(announcement)).and_then(|()| stdout.flush()) {
            tracing::warn!(error = %err, "Failed to print announcement");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckwatch_core::{CardId, MatchId};

    #[test]
    fn test_render_lists_matched_cards() {
        let banner = render(&Announcement {
            match_id: MatchId(3),
            archetype: "Aggro Foo".to_string(),
            score: 3,
            matched_cards: vec![CardId::from("C1"), CardId::from("C2"), CardId::from("C3")],
        });

        assert!(banner.contains("Match #3: opponent is playing Aggro Foo"));
        assert!(banner.contains("3 matching cards: C1, C2, C3"));
    }
}
