use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Milliseconds on the game clock.
pub type Millis = u64;

/// Trial state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrialState {
    #[default]
    Idle,
    Armed,
    Reacting,
    Success,
    Penalty,
}

impl TrialState {
    /// Terminal display states; only `Acknowledge` leaves them.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Success | Self::Penalty)
    }

    /// The input a single click stands for in this state.
    pub fn click_input(&self) -> TrialInput {
        match self {
            Self::Idle => TrialInput::Initiate,
            Self::Armed | Self::Reacting => TrialInput::ReactOrMiss,
            Self::Success | Self::Penalty => TrialInput::Acknowledge,
        }
    }
}

/// Inputs the presentation layer feeds into a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialInput {
    Initiate,
    ReactOrMiss,
    Acknowledge,
}

/// What a handled input or timer firing did to the trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Input not valid in the current state, or a stale cue firing.
    Ignored,
    Armed { delay: Duration },
    CueShown { cue_at: Millis },
    Scored { score: Millis },
    Penalized,
    /// Penalty acknowledged, back to idle.
    Reset,
    /// Success acknowledged; the caller shows the summary view.
    Summary { score: Millis },
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}
