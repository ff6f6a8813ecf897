use reflex_core::{Millis, PlayerSession, TrialState};
use reflex_timing::TimerHandle;
use std::time::Duration;

/// Payload of a delayed-cue task: which trial scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueTicket {
    pub epoch: u64,
}

/// One play-through, from initiation to resolution
#[derive(Debug, Clone, Default)]
pub struct Trial {
    /// Bumped on every initiate; cue tickets must match it.
    pub epoch: u64,
    pub state: TrialState,
    pub player: Option<PlayerSession>,
    pub delay: Option<Duration>,
    pub timestamps: TrialTimestamps,
    pub pending: Option<TimerHandle>,
    pub score: Option<Millis>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialTimestamps {
    pub armed_at: Option<Millis>,
    pub cue_at: Option<Millis>,
    pub reacted_at: Option<Millis>,
}

impl Trial {
    pub fn accepts(&self, ticket: CueTicket) -> bool {
        self.state == TrialState::Armed && self.epoch == ticket.epoch && self.pending.is_some()
    }
}
