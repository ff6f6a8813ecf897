use crate::store::{LeaderboardStore, StoreError, next_sequential_id, rank};
use chrono::Utc;
use log::{debug, info};
use reflex_core::{NewScore, ScoreRecord};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Leaderboard kept as one pretty-printed JSON array on disk.
#[derive(Debug)]
pub struct JsonFileLeaderboard {
    path: PathBuf,
    // serializes read-modify-write between submitter threads
    lock: Mutex<()>,
}

impl JsonFileLeaderboard {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!("Using leaderboard file {:?}", path);
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<ScoreRecord>, StoreError> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, records: &[ScoreRecord]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LeaderboardStore for JsonFileLeaderboard {
    fn append(&self, score: NewScore) -> Result<ScoreRecord, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.load()?;
        let id = next_sequential_id(&records);
        let record = ScoreRecord::from_new(id, score, Utc::now());
        records.push(record.clone());
        self.save(&records)?;
        info!("Stored score #{} in {:?}", record.id, self.path);
        Ok(record)
    }

    fn top_n(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.load()?;
        rank(&mut records);
        records.truncate(n);
        Ok(records)
    }
}
