//! Read views: nickname filter, leaderboard ranking and session snapshots.

use crate::models::{ExpSession, PlayerRecord, SessionSnapshot, ViewKind};
use std::cmp::Ordering;

/// Case-insensitive substring test of `term` against the nickname. An empty term matches all.
pub fn matches(record: &PlayerRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    record.nickname.to_lowercase().contains(&term.to_lowercase())
}

/// Leaderboard order: highest EXP first, nickname ascending on ties.
pub fn rank_order(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    b.total_exp
        .cmp(&a.total_exp)
        .then_with(|| a.nickname.cmp(&b.nickname))
}

/// Render the session's active view with its stored filter.
pub fn snapshot(session: &ExpSession) -> SessionSnapshot {
    snapshot_of(session, session.active_view, &session.filter)
}

/// Render any view with any term. Reads only; the session is not modified.
pub fn snapshot_of(session: &ExpSession, view: ViewKind, term: &str) -> SessionSnapshot {
    let batch = session.batch(view);
    let mut players: Vec<PlayerRecord> = batch
        .ledger
        .records()
        .filter(|r| matches(r, term))
        .cloned()
        .collect();
    players.sort_by(rank_order);

    SessionSnapshot {
        id: session.id,
        view,
        filter: term.to_string(),
        players,
        images: batch.images.clone(),
        statistics: batch.statistics,
        session_images: session.current.statistics.total_images,
        cumulative_images: session.cumulative.statistics.total_images,
        batches_merged: session.batches_merged,
        processing: session.is_uploading(),
        last_upload_at: session.last_upload_at,
    }
}
