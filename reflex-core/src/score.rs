use crate::{Millis, PlayerSession};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Shown in place of a blank stored name.
pub const ANONYMOUS_PLAYER: &str = "Anonymous Player";

/// A score about to be appended to the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScore {
    #[serde(rename = "score")]
    pub score_ms: Millis,
    #[serde(rename = "user_name")]
    pub player_name: String,
    #[serde(rename = "user_email", default)]
    pub player_email: Option<String>,
}

impl NewScore {
    pub fn for_player(score_ms: Millis, player: &PlayerSession) -> Self {
        Self {
            score_ms,
            player_name: player.name.clone(),
            player_email: player.email.clone(),
        }
    }
}

/// Persisted leaderboard row. Lower `score_ms` ranks higher.
///
/// `id` is whatever the store assigned: a UUID from a remote table, or a
/// sequence number from the local stores. Numeric ids in JSON are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(rename = "score")]
    pub score_ms: Millis,
    #[serde(rename = "user_name")]
    pub player_name: String,
    #[serde(rename = "user_email", default)]
    pub player_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn from_new(id: impl Into<String>, score: NewScore, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            score_ms: score.score_ms,
            player_name: score.player_name,
            player_email: score.player_email,
            created_at,
        }
    }

    /// The id as a sequence number, for stores that hand out counters.
    pub fn sequence(&self) -> Option<u64> {
        self.id.parse().ok()
    }

    pub fn display_name(&self) -> &str {
        let name = self.player_name.trim();
        if name.is_empty() { ANONYMOUS_PLAYER } else { name }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(d)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
