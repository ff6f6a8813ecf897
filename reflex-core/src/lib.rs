pub mod player;
pub mod score;
pub mod trial;

pub use player::{PlayerError, PlayerSession};
pub use score::{ANONYMOUS_PLAYER, NewScore, ScoreRecord};
pub use trial::{Millis, Transition, TrialInput, TrialState};
