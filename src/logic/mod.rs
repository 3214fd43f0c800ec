//! EXP ledger logic: sanitizing, mapping, merging, statistics, views, goal progress.

mod batch;
mod goal;
mod ledger;
mod mapper;
mod sanitize;
mod stats;
mod view;

pub use batch::{apply_batch, complete_upload};
pub use goal::{format_exp, goal_progress, parse_exp_amount, GoalProgress};
pub use ledger::{ledger_from_records, merge};
pub use mapper::{map_backend_response, MappedBatch, RecordSection, SkippedRecord};
pub use sanitize::{sanitize_digits, sanitize_exp, CORRUPT_PREFIX_LEN, MAX_EXP_DIGITS};
pub use stats::recompute;
pub use view::{matches, rank_order, snapshot, snapshot_of};
