use crate::LeaderboardSummary;
use reflex_core::{NewScore, ScoreRecord};
use std::sync::Arc;
use thiserror::Error;

/// How many rows the leaderboard view reads.
pub const DEFAULT_TOP_N: usize = 50;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("leaderboard io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("leaderboard json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("leaderboard http error: {0}")]
    Http(#[from] ureq::Error),
    #[error("leaderboard returned status {0}")]
    Status(u16),
    #[error("leaderboard returned no row for the inserted score")]
    EmptyInsert,
    #[error("leaderboard lock poisoned")]
    Poisoned,
}

/// Append-only score persistence, read back lowest-first.
pub trait LeaderboardStore {
    fn append(&self, score: NewScore) -> Result<ScoreRecord, StoreError>;

    /// The `n` lowest scores, ascending.
    fn top_n(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError>;

    fn best(&self) -> Result<Option<ScoreRecord>, StoreError> {
        Ok(self.top_n(1)?.into_iter().next())
    }

    fn summary(&self, n: usize) -> Result<LeaderboardSummary, StoreError> {
        Ok(LeaderboardSummary::from_records(&self.top_n(n)?))
    }
}

impl<T: LeaderboardStore + ?Sized> LeaderboardStore for Arc<T> {
    fn append(&self, score: NewScore) -> Result<ScoreRecord, StoreError> {
        (**self).append(score)
    }

    fn top_n(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        (**self).top_n(n)
    }
}

/// Sorts ascending by score; ties go to the earlier entry.
pub fn rank(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| {
        a.score_ms
            .cmp(&b.score_ms)
            .then(a.created_at.cmp(&b.created_at))
            .then_with(|| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id)))
    });
}

/// One past the highest numeric id; non-numeric ids are skipped.
pub fn next_sequential_id(records: &[ScoreRecord]) -> String {
    let last = records.iter().filter_map(ScoreRecord::sequence).max();
    (last.unwrap_or(0) + 1).to_string()
}
