//! ExpSession: the per-user state object owning both ledgers, the view selector and the filter.

use crate::models::image::ProcessedImageResult;
use crate::models::ledger::Ledger;
use crate::models::player::PlayerRecord;
use crate::models::stats::AggregatedStatistics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during session operations.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// A batch is still waiting on the extraction backend.
    #[error("An upload is already being processed")]
    UploadInProgress,
    /// Clear-all was requested without explicit confirmation.
    #[error("Clearing all data must be confirmed")]
    ConfirmationRequired,
    #[error("No session")]
    NotFound,
}

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// Which record set the caller is looking at.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Most recent batch only.
    #[default]
    Session,
    /// Every batch since the last clear-all.
    Cumulative,
}

/// Ledger, images and statistics for one view.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BatchState {
    pub ledger: Ledger,
    pub images: Vec<ProcessedImageResult>,
    pub statistics: AggregatedStatistics,
}

/// One user's working state. Mutated only through its own methods and `logic::apply_batch`.
#[derive(Clone, Debug)]
pub struct ExpSession {
    pub id: SessionId,
    /// Replaced wholesale by every upload.
    pub current: BatchState,
    /// Grows with every upload until cleared.
    pub cumulative: BatchState,
    pub active_view: ViewKind,
    pub filter: String,
    pub batches_merged: u32,
    pub last_upload_at: Option<DateTime<Utc>>,
    upload_in_flight: bool,
}

impl Default for ExpSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpSession {
    /// Create an empty session showing the session view with no filter.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            current: BatchState::default(),
            cumulative: BatchState::default(),
            active_view: ViewKind::Session,
            filter: String::new(),
            batches_merged: 0,
            last_upload_at: None,
            upload_in_flight: false,
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.upload_in_flight
    }

    /// Claim the session for one batch. Fails while another batch is in flight.
    pub fn begin_upload(&mut self) -> Result<(), SessionError> {
        if self.upload_in_flight {
            return Err(SessionError::UploadInProgress);
        }
        self.upload_in_flight = true;
        Ok(())
    }

    /// Release the claim taken by `begin_upload`, whether or not the batch was applied.
    pub fn finish_upload(&mut self) {
        self.upload_in_flight = false;
    }

    pub fn set_view(&mut self, view: ViewKind) {
        self.active_view = view;
    }

    pub fn set_filter(&mut self, term: impl Into<String>) {
        self.filter = term.into();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }

    /// The state behind a view.
    pub fn batch(&self, view: ViewKind) -> &BatchState {
        match view {
            ViewKind::Session => &self.current,
            ViewKind::Cumulative => &self.cumulative,
        }
    }

    /// Drop every ledger, image and statistic (session and cumulative), reset the filter and
    /// go back to the session view. Irreversible, so the caller must pass `confirmed = true`.
    /// Refused while a batch is in flight, since that batch would land in the cleared state.
    pub fn clear_all(&mut self, confirmed: bool) -> Result<(), SessionError> {
        if !confirmed {
            return Err(SessionError::ConfirmationRequired);
        }
        if self.upload_in_flight {
            return Err(SessionError::UploadInProgress);
        }
        self.current = BatchState::default();
        self.cumulative = BatchState::default();
        self.active_view = ViewKind::Session;
        self.filter.clear();
        self.batches_merged = 0;
        self.last_upload_at = None;
        Ok(())
    }
}

/// Read-only rendering of one view (for API responses).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub view: ViewKind,
    pub filter: String,
    /// Filtered players, ranked by EXP.
    pub players: Vec<PlayerRecord>,
    pub images: Vec<ProcessedImageResult>,
    pub statistics: AggregatedStatistics,
    /// Image counts for the view toggle labels.
    pub session_images: u32,
    pub cumulative_images: u32,
    pub batches_merged: u32,
    pub processing: bool,
    pub last_upload_at: Option<DateTime<Utc>>,
}
