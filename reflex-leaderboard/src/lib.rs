pub mod file;
pub mod memory;
pub mod rest;
pub mod store;
pub mod summary;

pub use file::JsonFileLeaderboard;
pub use memory::MemoryLeaderboard;
pub use rest::RestLeaderboard;
pub use store::{DEFAULT_TOP_N, LeaderboardStore, StoreError, next_sequential_id, rank};
pub use summary::LeaderboardSummary;
