//! Data structures for the EXP ledger: observations, records, images, statistics, sessions.

mod image;
mod ledger;
mod player;
mod session;
mod stats;

pub use image::ProcessedImageResult;
pub use ledger::Ledger;
pub use player::{PlayerObservation, PlayerRecord};
pub use session::{BatchState, ExpSession, SessionError, SessionId, SessionSnapshot, ViewKind};
pub use stats::AggregatedStatistics;
