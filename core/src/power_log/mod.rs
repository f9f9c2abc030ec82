//! Power.log event extraction.

pub mod dialect;
pub mod event;
pub mod extractor;
pub mod record;

pub use dialect::{CompactDialect, DescriptorDialect, Dialect};
pub use event::{CardId, EntityId, GameEvent, LogLine, SeatId, Zone};
pub use extractor::Extractor;
