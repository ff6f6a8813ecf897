pub mod config;
pub mod controller;
pub mod submit;
pub mod trial;
pub use config::TrialConfig;
pub use controller::TrialController;
pub use submit::{DetachedSubmitter, ScoreSink};
pub use trial::{CueTicket, Trial, TrialTimestamps};
