//! ProcessedImageResult: what the backend made of one uploaded image.

use crate::models::player::PlayerObservation;
use serde::{Deserialize, Serialize};

/// Per-image outcome. Never mutated after the mapper builds it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProcessedImageResult {
    pub filename: String,
    pub player_count: u32,
    /// Rows read from this image (sanitized).
    #[serde(default)]
    pub players: Vec<PlayerObservation>,
    /// Backend-side failure for this image only (OCR error, unreadable file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessedImageResult {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}
