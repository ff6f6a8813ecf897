use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("player name must not be empty")]
    EmptyName,
}

/// Self-declared player identity, supplied to each trial for attribution.
///
/// Nothing here is verified; the name is just a label shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PlayerSession {
    /// Registers a player at the current wall-clock time.
    pub fn register(name: &str, email: Option<&str>) -> Result<Self, PlayerError> {
        Self::register_at(name, email, Utc::now())
    }

    pub fn register_at(
        name: &str,
        email: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PlayerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlayerError::EmptyName);
        }
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        Ok(Self {
            id: created_at.timestamp_millis().to_string(),
            name: name.to_string(),
            email,
            created_at,
        })
    }
}
