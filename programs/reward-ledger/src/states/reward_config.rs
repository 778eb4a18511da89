use crate::error::{ErrorCode, Result};
use crate::{
    DAILY_BONUS_POINTS, MAX_QUIZ_ATTEMPTS, MAX_SPIN_ATTEMPTS, PAYMENT_CONFIRM_DELAY_SECS,
    RESET_WINDOW_MS,
};
use std::time::Duration;

//
// ──────────────────────────────────────────────────────────────────────────────
// Reward Configuration
// ──────────────────────────────────────────────────────────────────────────────
//

/// Ordered prize table used by the spin wheel. The `0` entry is the "no win" slot.
pub const PRIZE_TABLE: [u64; 7] = [50, 100, 150, 200, 250, 500, 0];

/// How exhausted attempts come back after the cooldown window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetMode {
    /// Restore only once attempts hit zero and the window has elapsed since the
    /// last use; the last-use timestamp is cleared.
    #[default]
    Exhausted,
    /// Restore whenever the window has elapsed since a recorded last use,
    /// exhausted or not; the last-use timestamp is kept.
    Elapsed,
}

impl std::str::FromStr for ResetMode {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exhausted" => Ok(ResetMode::Exhausted),
            "elapsed" => Ok(ResetMode::Elapsed),
            _ => Err(ErrorCode::InvalidConfig("reset_mode must be `exhausted` or `elapsed`")),
        }
    }
}

/// One verifiable social action a user can complete for points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogTask {
    /// Wire identifier, e.g. `TG_CH`.
    pub id: String,
    pub title: String,
    /// Server-side reward for completing the task.
    pub points: u64,
}

impl CatalogTask {
    pub fn new(id: &str, title: &str, points: u64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            points,
        }
    }
}

/// The default catalog: join channel, join group, subscribe to the video channel.
pub fn default_task_catalog() -> Vec<CatalogTask> {
    vec![
        CatalogTask::new("TG_CH", "Join the Telegram channel", 150),
        CatalogTask::new("TG_GP", "Join the Telegram group", 100),
        CatalogTask::new("YT_SUB", "Subscribe on YouTube", 300),
    ]
}

/// Process-wide reward parameters.
///
/// Every user record is created from, and every rule is evaluated against,
/// one instance of this struct owned by the ledger. It holds both the
/// **static tables** (prizes, task catalog) and the **tunable limits**
/// (attempt caps, cooldown window, grants).
#[derive(Clone, Debug, PartialEq)]
pub struct RewardConfig {
    /// Points granted to a freshly created user.
    pub starting_points: u64,

    /// Points awarded per successful daily-bonus claim.
    pub daily_bonus_points: u64,

    /// Spin attempts available per cooldown window.
    pub max_spin_attempts: u32,

    /// Quiz attempts available per cooldown window.
    pub max_quiz_attempts: u32,

    /// Cooldown window gating attempt resets and bonus re-claims (milliseconds).
    pub reset_window_ms: u64,

    /// Which reset rule applies to spin/quiz attempts.
    pub reset_mode: ResetMode,

    /// Delay before a mock payment is confirmed.
    pub payment_confirm_delay: Duration,

    /// Award the caller-supplied `points` of a social task instead of the
    /// catalog value.
    pub trust_client_points: bool,

    /// Ordered, uniformly sampled spin prizes.
    pub prize_table: Vec<u64>,

    /// Tasks every user record starts with.
    pub task_catalog: Vec<CatalogTask>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            starting_points: 0,
            daily_bonus_points: DAILY_BONUS_POINTS,
            max_spin_attempts: MAX_SPIN_ATTEMPTS,
            max_quiz_attempts: MAX_QUIZ_ATTEMPTS,
            reset_window_ms: RESET_WINDOW_MS,
            reset_mode: ResetMode::default(),
            payment_confirm_delay: Duration::from_secs(PAYMENT_CONFIRM_DELAY_SECS),
            trust_client_points: false,
            prize_table: PRIZE_TABLE.to_vec(),
            task_catalog: default_task_catalog(),
        }
    }
}

impl RewardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.prize_table.is_empty() {
            return Err(ErrorCode::InvalidConfig("prize table must not be empty"));
        }
        if self.reset_window_ms == 0 {
            return Err(ErrorCode::InvalidConfig("reset window must be positive"));
        }
        if self.max_spin_attempts == 0 || self.max_quiz_attempts == 0 {
            return Err(ErrorCode::InvalidConfig("attempt caps must be positive"));
        }
        let mut ids: Vec<&str> = self.task_catalog.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != self.task_catalog.len() {
            return Err(ErrorCode::InvalidConfig("task ids must be unique"));
        }
        Ok(())
    }
}
