pub mod catalogue;
pub mod error;
pub mod events;
pub mod matcher;
pub mod power_log;
pub mod reader;
pub mod session;
pub mod tracker;

// Re-exports for convenience
pub use catalogue::{Catalogue, MetaDeck, load_catalogue};
pub use error::{CatalogueError, LogSourceError, WatchError};
pub use events::{Announcement, AnnouncementHandler, GameSignal, MatchId};
pub use matcher::{ArchetypeMatcher, ArchetypeVerdict};
pub use power_log::{CardId, Extractor, GameEvent, LogLine, Zone};
pub use reader::{LogTail, StartPosition};
pub use session::{WatchSession, WatchSummary, watch};
pub use tracker::{MatchSnapshot, MatchTracker};
