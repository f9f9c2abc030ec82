//! Meta deck catalogue.
//!
//! Loaded once from a JSON array before monitoring starts and never mutated
//! afterwards, so it is shared behind an `Arc` without locking.
//!
//! ```json
//! [
//!   { "archetype": "Aggro Foo", "card_ids": ["C1", "C2", "C3"] },
//!   { "archetype": "Control Bar", "card_ids": ["C4", "C5"] }
//! ]
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use hashbrown::HashSet;
use serde::Deserialize;

use crate::error::CatalogueError;
use crate::power_log::CardId;

/// Name given to records that carry no `archetype` field.
pub const UNNAMED_ARCHETYPE: &str = "Unnamed Archetype";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDeck {
    pub archetype: String,
    pub cards: HashSet<CardId>,
}

impl MetaDeck {
    pub fn new<I, C>(archetype: impl Into<String>, cards: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CardId>,
    {
        Self {
            archetype: archetype.into(),
            cards: cards.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeckRecord {
    archetype: Option<String>,
    #[serde(default)]
    card_ids: Vec<CardId>,
}

impl From<DeckRecord> for MetaDeck {
    fn from(record: DeckRecord) -> Self {
        Self {
            archetype: record
                .archetype
                .unwrap_or_else(|| UNNAMED_ARCHETYPE.to_string()),
            cards: record.card_ids.into_iter().collect(),
        }
    }
}

/// Ordered list of archetypes. Order matters: it breaks scoring ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogue {
    decks: Vec<MetaDeck>,
}

impl Catalogue {
    pub fn from_decks(decks: Vec<MetaDeck>) -> Self {
        Self { decks }
    }

    pub fn decks(&self) -> &[MetaDeck] {
        &self.decks
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<DeckRecord> = serde_json::from_str(json)?;
        Ok(Self::from_decks(records.into_iter().map(MetaDeck::from).collect()))
    }
}

/// Load the catalogue file. A missing or malformed file is a startup error.
pub fn load_catalogue<P: AsRef<Path>>(path: P) -> Result<Catalogue, CatalogueError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => CatalogueError::NotFound {
            path: path.to_path_buf(),
        },
        _ => CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let catalogue = Catalogue::from_json(&contents).map_err(|source| CatalogueError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    if catalogue.is_empty() {
        tracing::warn!(path = %path.display(), "Meta deck catalogue is empty, no archetype will ever be reported");
    } else {
        tracing::info!(path = %path.display(), decks = catalogue.len(), "Loaded meta deck catalogue");
    }

    Ok(catalogue)
}
