pub mod clock;
pub mod delay;
pub mod frames;
pub mod schedule;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use delay::{DelayPolicy, compute_score, draw_delay};
pub use frames::{FramePacing, FrameWindow};
pub use schedule::{DeadlineQueue, Scheduler, TimerHandle};
