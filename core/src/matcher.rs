//! Archetype scoring.
//!
//! Every new opponent card triggers a full rescore of the catalogue: the
//! score of a deck is the size of its intersection with the opponent's
//! cards. The first deck in catalogue order wins ties. Only a verdict whose
//! score strictly exceeds the confidence threshold, and whose archetype
//! differs from the last one announced this match, reaches observers.

use hashbrown::HashSet;

use crate::catalogue::Catalogue;
use crate::events::{Announcement, MatchId};
use crate::power_log::CardId;

/// Best guess for the opponent's archetype.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchetypeVerdict {
    /// `None` when no deck clears the confidence threshold.
    pub archetype: Option<String>,
    pub score: usize,
    /// Sorted for stable display.
    pub matched_cards: Vec<CardId>,
}

impl ArchetypeVerdict {
    pub fn is_unknown(&self) -> bool {
        self.archetype.is_none()
    }
}

/// Score `cards` against the catalogue, gating on `min_confidence`.
pub fn score(cards: &HashSet<CardId>, catalogue: &Catalogue, min_confidence: usize) -> ArchetypeVerdict {
    let mut best: Option<(usize, usize)> = None;

    for (idx, deck) in catalogue.decks().iter().enumerate() {
        let score = deck.cards.iter().filter(|card| cards.contains(*card)).count();
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }

    let Some((idx, best_score)) = best else {
        return ArchetypeVerdict::default();
    };

    if best_score <= min_confidence {
        return ArchetypeVerdict {
            archetype: None,
            score: best_score,
            matched_cards: Vec::new(),
        };
    }

    let deck = &catalogue.decks()[idx];
    let mut matched_cards: Vec<CardId> = deck
        .cards
        .iter()
        .filter(|card| cards.contains(*card))
        .cloned()
        .collect();
    matched_cards.sort();

    ArchetypeVerdict {
        archetype: Some(deck.archetype.clone()),
        score: best_score,
        matched_cards,
    }
}

/// Per-match announcement state around `score`.
#[derive(Debug, Clone)]
pub struct ArchetypeMatcher {
    min_confidence: usize,
    last_announced: Option<String>,
    last_verdict: ArchetypeVerdict,
}

impl ArchetypeMatcher {
    pub fn new(min_confidence: usize) -> Self {
        Self {
            min_confidence,
            last_announced: None,
            last_verdict: ArchetypeVerdict::default(),
        }
    }

    pub fn min_confidence(&self) -> usize {
        self.min_confidence
    }

    /// Archetype last surfaced in the current match, if any.
    pub fn last_announced(&self) -> Option<&str> {
        self.last_announced.as_deref()
    }

    pub fn last_verdict(&self) -> &ArchetypeVerdict {
        &self.last_verdict
    }

    /// Forget everything about the previous match.
    pub fn reset(&mut self) {
        self.last_announced = None;
        self.last_verdict = ArchetypeVerdict::default();
    }

    /// Rescore after a new opponent card. Returns an announcement only when
    /// the verdict clears the threshold and names a different archetype.
    pub fn update(
        &mut self,
        match_id: MatchId,
        cards: &HashSet<CardId>,
        catalogue: &Catalogue,
    ) -> Option<Announcement> {
        let verdict = score(cards, catalogue, self.min_confidence);
        self.last_verdict = verdict.clone();

        let Some(archetype) = verdict.archetype else {
            tracing::debug!(score = verdict.score, "[MATCHER] Below confidence threshold");
            return None;
        };

        if self.last_announced.as_deref() == Some(archetype.as_str()) {
            tracing::debug!(archetype = %archetype, score = verdict.score, "[MATCHER] Verdict unchanged");
            return None;
        }

        tracing::info!(
            "[MATCHER] Opponent archetype: {} ({} matching cards)",
            archetype,
            verdict.score
        );
        self.last_announced = Some(archetype.clone());

        Some(Announcement {
            match_id,
            archetype,
            score: verdict.score,
            matched_cards: verdict.matched_cards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::MetaDeck;

    fn cards(ids: &[&str]) -> HashSet<CardId> {
        ids.iter().map(|id| CardId::from(*id)).collect()
    }

    fn catalogue() -> Catalogue {
        Catalogue::from_decks(vec![
            MetaDeck::new("Aggro Foo", ["C1", "C2", "C3"]),
            MetaDeck::new("Control Bar", ["C4", "C5"]),
        ])
    }

    #[test]
    fn test_score_counts_intersection() {
        let verdict = score(&cards(&["C1", "C2", "C3", "X9"]), &catalogue(), 2);
        assert_eq!(verdict.archetype.as_deref(), Some("Aggro Foo"));
        assert_eq!(verdict.score, 3);
        assert_eq!(verdict.matched_cards, vec![CardId::from("C1"), CardId::from("C2"), CardId::from("C3")]);
    }

    #[test]
    fn test_tie_goes_to_earlier_deck() {
        let catalogue = Catalogue::from_decks(vec![
            MetaDeck::new("First", ["A", "B", "X"]),
            MetaDeck::new("Second", ["A", "B", "Y"]),
            MetaDeck::new("Third", ["A", "B"]),
        ]);
        let verdict = score(&cards(&["A", "B"]), &catalogue, 1);
        assert_eq!(verdict.archetype.as_deref(), Some("First"));
        assert_eq!(verdict.score, 2);
    }

    #[test]
    fn test_score_at_threshold_is_unknown() {
        let verdict = score(&cards(&["C1", "C2"]), &catalogue(), 2);
        assert!(verdict.is_unknown());
        assert_eq!(verdict.score, 2);
        assert!(verdict.matched_cards.is_empty());
    }

    #[test]
    fn test_empty_catalogue_is_unknown() {
        let verdict = score(&cards(&["C1"]), &Catalogue::default(), 0);
        assert_eq!(verdict, ArchetypeVerdict::default());
    }

    #[test]
    fn test_zero_threshold_still_requires_a_match() {
        let verdict = score(&cards(&["Z"]), &catalogue(), 0);
        assert!(verdict.is_unknown());
    }

    #[test]
    fn test_same_archetype_announced_once() {
        let catalogue = catalogue();
        let mut matcher = ArchetypeMatcher::new(2);

        let first = matcher.update(MatchId(1), &cards(&["C1", "C2", "C3"]), &catalogue);
        assert_eq!(first.map(|a| a.archetype).as_deref(), Some("Aggro Foo"));

        let second = matcher.update(MatchId(1), &cards(&["C1", "C2", "C3", "X"]), &catalogue);
        assert_eq!(second, None);
        assert_eq!(matcher.last_announced(), Some("Aggro Foo"));
        assert_eq!(matcher.last_verdict().score, 3);
    }

    #[test]
    fn test_changed_archetype_is_announced() {
        let catalogue = catalogue();
        let mut matcher = ArchetypeMatcher::new(1);

        assert!(matcher.update(MatchId(1), &cards(&["C1", "C2"]), &catalogue).is_some());

        let switched = matcher
            .update(MatchId(1), &cards(&["C1", "C2", "C4", "C5", "C6"]), &catalogue)
            .map(|a| a.archetype);
        // Still a 2-2 tie, so the earlier deck keeps the verdict.
        assert_eq!(switched, None);

        let catalogue = Catalogue::from_decks(vec![
            MetaDeck::new("Aggro Foo", ["C1", "C2", "C3"]),
            MetaDeck::new("Control Bar", ["C4", "C5", "C6"]),
        ]);
        let switched = matcher
            .update(MatchId(1), &cards(&["C1", "C2", "C4", "C5", "C6"]), &catalogue)
            .map(|a| a.archetype);
        assert_eq!(switched.as_deref(), Some("Control Bar"));
    }

    #[test]
    fn test_below_threshold_is_silent_even_after_reset() {
        let catalogue = catalogue();
        let mut matcher = ArchetypeMatcher::new(2);
        assert!(matcher.update(MatchId(1), &cards(&["C1", "C2", "C3"]), &catalogue).is_some());

        matcher.reset();
        assert_eq!(matcher.last_announced(), None);
        assert_eq!(matcher.update(MatchId(2), &cards(&["C4"]), &catalogue), None);
        assert!(matcher.last_verdict().is_unknown());
    }

    #[test]
    fn test_reset_allows_same_archetype_next_match() {
        let catalogue = catalogue();
        let mut matcher = ArchetypeMatcher::new(2);
        let full = cards(&["C1", "C2", "C3"]);

        assert!(matcher.update(MatchId(1), &full, &catalogue).is_some());
        matcher.reset();
        let again = matcher.update(MatchId(2), &full, &catalogue);
        assert_eq!(again.map(|a| a.match_id), Some(MatchId(2)));
    }
}
