//! Ledger merge: fold a batch of per-nickname records into an existing ledger.

use crate::models::{Ledger, PlayerRecord};
use std::collections::hash_map::Entry;

/// Merge `incoming` into a copy of `existing` and return the result.
///
/// 1. Start from a copy of every existing record.
/// 2. An unseen nickname is inserted as-is.
/// 3. A known nickname gets `total_exp` and `appearances` summed and the incoming images
///    appended after the existing ones.
///
/// `existing` is left untouched, so a caller can build the new ledger before committing it.
/// Not idempotent: merging the same batch twice counts it twice.
pub fn merge(existing: &Ledger, incoming: &[PlayerRecord]) -> Ledger {
    let mut merged = existing.clone();
    absorb(&mut merged, incoming);
    merged
}

/// Build a ledger from records, combining any that share a nickname.
pub fn ledger_from_records(records: &[PlayerRecord]) -> Ledger {
    merge(&Ledger::new(), records)
}

fn absorb(ledger: &mut Ledger, incoming: &[PlayerRecord]) {
    for record in incoming {
        match ledger.entries.entry(record.nickname.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().absorb(record),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
            }
        }
    }
}
