use crate::store::{LeaderboardStore, StoreError};
use log::{info, warn};
use reflex_core::{NewScore, ScoreRecord};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SELECT_COLUMNS: &str = "id,score,user_name,user_email,created_at";

/// Leaderboard table behind a PostgREST-style HTTP endpoint.
pub struct RestLeaderboard {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestLeaderboard {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl LeaderboardStore for RestLeaderboard {
    fn append(&self, score: NewScore) -> Result<ScoreRecord, StoreError> {
        let url = self.endpoint();
        let response = self
            .agent
            .post(url.as_str())
            .header("apikey", self.api_key.as_str())
            .header("Authorization", self.bearer())
            .header("Prefer", "return=representation")
            .send_json(&score)?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            warn!("Score insert returned status {}", status);
            return Err(StoreError::Status(status));
        }

        let rows: Vec<ScoreRecord> = response.into_body().read_json()?;
        let record = rows.into_iter().next().ok_or(StoreError::EmptyInsert)?;
        info!("Inserted score #{} into '{}'", record.id, self.table);
        Ok(record)
    }

    fn top_n(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let url = self.endpoint();
        let limit = n.to_string();
        let response = self
            .agent
            .get(url.as_str())
            .header("apikey", self.api_key.as_str())
            .header("Authorization", self.bearer())
            .query("select", SELECT_COLUMNS)
            .query("order", "score.asc")
            .query("limit", limit.as_str())
            .call()?;

        let status = response.status().as_u16();
        if status != 200 {
            warn!("Leaderboard read returned status {}", status);
            return Err(StoreError::Status(status));
        }
        Ok(response.into_body().read_json()?)
    }
}
