//! Apply one mapped batch to a session: replace the session view, grow the cumulative view.

use crate::logic::ledger::{ledger_from_records, merge};
use crate::error::ProcessingError;
use crate::logic::mapper::MappedBatch;
use crate::logic::stats::recompute;
use crate::models::{BatchState, ExpSession};
use chrono::Utc;

/// Merge a batch into the session. Call exactly once per physical upload.
///
/// Both new states are built before either is stored, so the session never holds a half-applied
/// batch.
pub fn apply_batch(session: &mut ExpSession, batch: &MappedBatch) {
    let ledger = ledger_from_records(&batch.players);
    let statistics = recompute(&ledger, batch.images.len());
    if let Some(reported) = batch.reported_statistics {
        if reported != statistics {
            log::warn!(
                "Backend statistics {:?} differ from recomputed {:?}",
                reported,
                statistics
            );
        }
    }
    let current = BatchState {
        ledger,
        images: batch.images.clone(),
        statistics,
    };

    let cumulative_ledger = merge(&session.cumulative.ledger, &batch.players);
    let mut cumulative_images = session.cumulative.images.clone();
    cumulative_images.extend(batch.images.iter().cloned());
    let cumulative_statistics = recompute(&cumulative_ledger, cumulative_images.len());
    let cumulative = BatchState {
        ledger: cumulative_ledger,
        images: cumulative_images,
        statistics: cumulative_statistics,
    };

    session.current = current;
    session.cumulative = cumulative;
    session.batches_merged += 1;
    session.last_upload_at = Some(Utc::now());

    log::info!(
        "Session {}: merged batch #{} ({} images, {} failed, {} players, {} skipped); cumulative {} players, {} EXP",
        session.id,
        session.batches_merged,
        session.current.statistics.total_images,
        batch.images.iter().filter(|i| i.failed()).count(),
        session.current.statistics.unique_players,
        batch.skipped.len(),
        session.cumulative.statistics.unique_players,
        session.cumulative.statistics.total_exp
    );
}

/// Release the session's upload claim and, when the backend produced a batch, apply it.
///
/// Both happen under one borrow of the session, so no other request can clear it or start a new
/// upload between the release and the merge.
pub fn complete_upload(
    session: &mut ExpSession,
    result: Result<MappedBatch, ProcessingError>,
) -> Result<MappedBatch, ProcessingError> {
    session.finish_upload();
    let batch = result?;
    apply_batch(session, &batch);
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerRecord, ProcessedImageResult};

    fn batch(players: Vec<PlayerRecord>, files: &[&str]) -> MappedBatch {
        MappedBatch {
            images: files
                .iter()
                .map(|f| ProcessedImageResult {
                    filename: f.to_string(),
                    player_count: 1,
                    players: Vec::new(),
                    error: None,
                })
                .collect(),
            players,
            ..MappedBatch::default()
        }
    }

    #[test]
    fn session_view_is_replaced_cumulative_grows() {
        let mut s = ExpSession::new();
        apply_batch(&mut s, &batch(vec![PlayerRecord::new("A", 10, "1.png")], &["1.png"]));
        apply_batch(&mut s, &batch(vec![PlayerRecord::new("B", 4, "2.png")], &["2.png"]));

        assert!(s.current.ledger.get("A").is_none());
        assert_eq!(s.current.statistics.total_exp, 4);
        assert_eq!(s.current.statistics.total_images, 1);

        assert_eq!(s.cumulative.statistics.unique_players, 2);
        assert_eq!(s.cumulative.statistics.total_images, 2);
        assert_eq!(s.cumulative.statistics.total_exp, 14);
        assert_eq!(s.cumulative.statistics.avg_exp, 7);
        assert_eq!(s.batches_merged, 2);
        assert!(s.last_upload_at.is_some());
    }

    #[test]
    fn completing_releases_claim_and_applies() {
        let mut s = ExpSession::new();
        s.begin_upload().unwrap();
        let b = batch(vec![PlayerRecord::new("A", 10, "1.png")], &["1.png"]);
        complete_upload(&mut s, Ok(b)).unwrap();
        assert!(!s.is_uploading());
        assert_eq!(s.batches_merged, 1);
        assert_eq!(s.cumulative.statistics.total_exp, 10);
        assert!(s.begin_upload().is_ok());
    }

    #[test]
    fn completing_with_error_releases_claim_only() {
        let mut s = ExpSession::new();
        apply_batch(&mut s, &batch(vec![PlayerRecord::new("A", 10, "1.png")], &["1.png"]));
        let before = s.cumulative.clone();
        s.begin_upload().unwrap();
        let err = complete_upload(&mut s, Err(ProcessingError::Rejected("down".into())));
        assert_eq!(err, Err(ProcessingError::Rejected("down".into())));
        assert!(!s.is_uploading());
        assert_eq!(s.cumulative, before);
        assert_eq!(s.batches_merged, 1);
    }
}
