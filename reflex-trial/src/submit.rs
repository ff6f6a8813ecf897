use log::{info, warn};
use reflex_core::NewScore;
use reflex_leaderboard::LeaderboardStore;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Where the controller hands finished scores. Submission is fire-and-forget:
/// nothing flows back into the trial.
pub trait ScoreSink {
    fn submit(&self, score: NewScore);
}

/// Appends each score to a store on its own background thread and logs the outcome.
pub struct DetachedSubmitter<S: LeaderboardStore + ?Sized> {
    store: Arc<S>,
}

impl<S> DetachedSubmitter<S>
where
    S: LeaderboardStore + Send + Sync + ?Sized + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn spawn(&self, score: NewScore) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        thread::spawn(move || {
            let (ms, name) = (score.score_ms, score.player_name.clone());
            match store.append(score) {
                Ok(rec) => info!("Saved score {}ms for '{}' as #{}", ms, name, rec.id),
                Err(e) => warn!("Error saving score {}ms for '{}': {}", ms, name, e),
            }
        })
    }
}

impl<S> ScoreSink for DetachedSubmitter<S>
where
    S: LeaderboardStore + Send + Sync + ?Sized + 'static,
{
    fn submit(&self, score: NewScore) {
        let _ = self.spawn(score);
    }
}

impl<T: ScoreSink + ?Sized> ScoreSink for Arc<T> {
    fn submit(&self, score: NewScore) {
        (**self).submit(score)
    }
}
