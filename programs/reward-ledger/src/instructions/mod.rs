use crate::states::{RewardConfig, UserRecord};

/// Everything an operation may touch, handed out inside the per-user critical
/// section. Operations validate before they mutate `record`.
pub struct Context<'a> {
    pub record: &'a mut UserRecord,
    pub config: &'a RewardConfig,
    /// Millisecond timestamp fixed for the whole operation.
    pub now: u64,
}

pub mod daily_reset;
pub use daily_reset::*;

pub mod snapshot;
pub use snapshot::*;

pub mod spin;
pub use spin::*;

pub mod daily_bonus;
pub use daily_bonus::*;

pub mod verify_task;
pub use verify_task::*;

pub mod payment;
pub use payment::*;
