//! Ledger: one PlayerRecord per unique nickname.

use crate::models::player::PlayerRecord;
use std::collections::HashMap;

/// Nickname -> aggregated record. Keys are exact (case-sensitive) nicknames.
///
/// Only `logic::ledger` builds non-empty ledgers, so the key always equals the record's nickname.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ledger {
    pub(crate) entries: HashMap<String, PlayerRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, nickname: &str) -> Option<&PlayerRecord> {
        self.entries.get(nickname)
    }

    /// Records in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.entries.values()
    }
}
