use reflex_core::{Millis, ScoreRecord};
use serde::Serialize;

/// Footer numbers for a leaderboard listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LeaderboardSummary {
    pub best_ms: Option<Millis>,
    pub count: usize,
    pub average_ms: Option<Millis>,
}

impl LeaderboardSummary {
    /// Expects `records` ranked ascending, as `top_n` returns them.
    pub fn from_records(records: &[ScoreRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let sum: u128 = records.iter().map(|r| r.score_ms as u128).sum();
        let average = (sum as f64 / records.len() as f64).round() as Millis;
        Self {
            best_ms: records.first().map(|r| r.score_ms),
            count: records.len(),
            average_ms: Some(average),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reflex_core::NewScore;

    fn rec(id: &str, ms: Millis) -> ScoreRecord {
        ScoreRecord::from_new(
            id,
            NewScore {
                score_ms: ms,
                player_name: String::new(),
                player_email: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn empty_listing() {
        assert_eq!(LeaderboardSummary::from_records(&[]), LeaderboardSummary::default());
    }

    #[test]
    fn average_is_rounded() {
        let s = LeaderboardSummary::from_records(&[rec("1", 200), rec("2", 201)]);
        assert_eq!(s.best_ms, Some(200));
        assert_eq!(s.count, 2);
        // 200.5 rounds away from zero
        assert_eq!(s.average_ms, Some(201));
    }
}
