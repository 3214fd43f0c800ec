//! Summary counters for a ledger snapshot.

use serde::{Deserialize, Serialize};

/// Derived from a ledger plus its image list; rebuilt after every change, never patched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStatistics {
    pub unique_players: u32,
    pub total_images: u32,
    pub total_exp: u64,
    /// Floor of `total_exp / unique_players`, 0 for an empty ledger.
    pub avg_exp: u64,
}
