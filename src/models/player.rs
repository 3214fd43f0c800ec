//! PlayerObservation and PlayerRecord data structures.

use serde::{Deserialize, Serialize};

/// One sanitized `(nickname, exp)` pair read from a single image.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerObservation {
    pub nickname: String,
    pub exp: u64,
    pub source_image: String,
}

impl PlayerObservation {
    pub fn new(nickname: impl Into<String>, exp: u64, source_image: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            exp,
            source_image: source_image.into(),
        }
    }
}

/// Ledger entry: everything known about one nickname (case-sensitive).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub nickname: String,
    /// Sum of sanitized EXP observations.
    pub total_exp: u64,
    pub appearances: u32,
    /// Every contributing image, in merge order. Not deduplicated.
    pub images: Vec<String>,
}

impl PlayerRecord {
    /// A record for a nickname seen once, in one image.
    pub fn new(nickname: impl Into<String>, exp: u64, image: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            total_exp: exp,
            appearances: 1,
            images: vec![image.into()],
        }
    }

    /// Fold another record for the same nickname into this one. Totals saturate at the type's
    /// maximum instead of wrapping.
    pub fn absorb(&mut self, other: &PlayerRecord) {
        self.total_exp = self.total_exp.saturating_add(other.total_exp);
        self.appearances = self.appearances.saturating_add(other.appearances);
        self.images.extend(other.images.iter().cloned());
    }

    /// `appearances` agrees with the number of contributing images.
    pub fn is_consistent(&self) -> bool {
        self.appearances as usize == self.images.len()
    }
}
