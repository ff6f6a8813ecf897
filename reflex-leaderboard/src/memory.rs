use crate::store::{LeaderboardStore, StoreError, next_sequential_id, rank};
use chrono::Utc;
use reflex_core::{NewScore, ScoreRecord};
use std::sync::Mutex;

/// Process-local leaderboard; lost on exit.
#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    records: Mutex<Vec<ScoreRecord>>,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LeaderboardStore for MemoryLeaderboard {
    fn append(&self, score: NewScore) -> Result<ScoreRecord, StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        let id = next_sequential_id(&records);
        let record = ScoreRecord::from_new(id, score, Utc::now());
        records.push(record.clone());
        Ok(record)
    }

    fn top_n(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut all = self.records.lock().map_err(|_| StoreError::Poisoned)?.clone();
        rank(&mut all);
        all.truncate(n);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_TOP_N;

    fn score(ms: u64, name: &str) -> NewScore {
        NewScore {
            score_ms: ms,
            player_name: name.into(),
            player_email: None,
        }
    }

    #[test]
    fn appended_scores_come_back_ascending() {
        let board = MemoryLeaderboard::new();
        for (ms, name) in [(310, "a"), (190, "b"), (250, "c")] {
            board.append(score(ms, name)).unwrap();
        }
        let top = board.top_n(DEFAULT_TOP_N).unwrap();
        let names: Vec<_> = top.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
        assert_eq!(board.best().unwrap().unwrap().score_ms, 190);
    }

    #[test]
    fn top_n_keeps_only_the_lowest() {
        let board = MemoryLeaderboard::new();
        for ms in (100..160).rev() {
            board.append(score(ms, "p")).unwrap();
        }
        assert_eq!(board.len(), 60);
        let top = board.top_n(DEFAULT_TOP_N).unwrap();
        assert_eq!(top.len(), 50);
        assert_eq!(top.first().unwrap().score_ms, 100);
        assert_eq!(top.last().unwrap().score_ms, 149);
    }

    #[test]
    fn ids_are_sequential() {
        let board = MemoryLeaderboard::new();
        assert_eq!(board.append(score(1, "a")).unwrap().id, "1");
        assert_eq!(board.append(score(2, "b")).unwrap().id, "2");
    }

    #[test]
    fn empty_board_has_no_best() {
        assert!(MemoryLeaderboard::new().best().unwrap().is_none());
    }
}
