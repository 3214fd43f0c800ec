//! Statistics recomputation over a full ledger snapshot.

use crate::models::{AggregatedStatistics, Ledger};

/// Rebuild the summary counters from scratch. An empty ledger yields all zeros.
/// `total_exp` saturates rather than overflowing.
pub fn recompute(ledger: &Ledger, image_count: usize) -> AggregatedStatistics {
    let unique_players = ledger.len() as u64;
    let total_exp = ledger
        .records()
        .fold(0u64, |acc, r| acc.saturating_add(r.total_exp));
    let avg_exp = if unique_players > 0 {
        total_exp / unique_players
    } else {
        0
    };
    AggregatedStatistics {
        unique_players: unique_players as u32,
        total_images: image_count as u32,
        total_exp,
        avg_exp,
    }
}
