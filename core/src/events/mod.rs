pub mod handler;
pub mod signal;

pub use handler::AnnouncementHandler;
pub use signal::{Announcement, GameSignal, MatchId};
