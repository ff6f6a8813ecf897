use reflex_core::TrialState;

pub type Rgba = [u8; 4];

pub const IDLE: Rgba = [15, 23, 42, 255];
pub const ARMED: Rgba = [234, 179, 8, 255];
pub const REACTING: Rgba = [34, 197, 94, 255];
pub const SUCCESS: Rgba = [59, 130, 246, 255];
pub const PENALTY: Rgba = [239, 68, 68, 255];
pub const SUMMARY: Rgba = [30, 41, 59, 255];

pub const INK: Rgba = [255, 255, 255, 255];
pub const BEST: Rgba = [253, 224, 71, 255];

/// Row colours for the top three places, then everyone else.
pub const GOLD: Rgba = [234, 179, 8, 255];
pub const SILVER: Rgba = [156, 163, 175, 255];
pub const BRONZE: Rgba = [217, 119, 6, 255];
pub const ROW: Rgba = [100, 116, 139, 255];

pub fn background(state: TrialState) -> Rgba {
    match state {
        TrialState::Idle => IDLE,
        TrialState::Armed => ARMED,
        TrialState::Reacting => REACTING,
        TrialState::Success => SUCCESS,
        TrialState::Penalty => PENALTY,
    }
}

pub fn rank(index: usize) -> Rgba {
    match index {
        0 => GOLD,
        1 => SILVER,
        2 => BRONZE,
        _ => ROW,
    }
}
