//! EXP leaderboard web app: library with models, aggregation logic and the HTTP surface.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod logic;
pub mod models;

pub use backend::{ExtractionBackend, HttpExtractionBackend, UploadedImage};
pub use config::AppConfig;
pub use error::{ProcessingError, UploadError};
pub use logic::{
    apply_batch, complete_upload, format_exp, goal_progress, ledger_from_records,
    map_backend_response, matches, merge, parse_exp_amount, rank_order, recompute,
    sanitize_digits, sanitize_exp, snapshot, snapshot_of, GoalProgress, MappedBatch, RecordSection, SkippedRecord,
};
pub use models::{
    AggregatedStatistics, BatchState, ExpSession, Ledger, PlayerObservation, PlayerRecord,
    ProcessedImageResult, SessionError, SessionId, SessionSnapshot, ViewKind,
};
