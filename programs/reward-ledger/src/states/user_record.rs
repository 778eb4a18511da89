use crate::states::RewardConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//
// ──────────────────────────────────────────────────────────────────────────────
// UserRecord
// ──────────────────────────────────────────────────────────────────────────────
//

/// Opaque Telegram user identifier. Numeric ids are kept in their decimal form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId(id)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id.to_string())
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId(id.to_string())
    }
}

pub type TaskId = String;

/// Attempts left for a chance-based action and when it was last used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptState {
    /// Always within `[0, max]` for the action's configured maximum.
    pub attempts_remaining: u32,
    /// Millisecond timestamp of the last use, `0` when unused since the last reset.
    pub last_at: u64,
}

impl AttemptState {
    pub fn full(max: u32) -> Self {
        Self {
            attempts_remaining: max,
            last_at: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBonus {
    /// Millisecond timestamp of the last successful claim, `0` if never claimed.
    pub last_claim_at: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    New,
    Pending,
    Done,
    Failed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    /// Flips `false -> true` at most once.
    pub completed: bool,
    pub claimed: bool,
    pub status: TaskStatus,
    /// Catalog reward, surfaced so the mini app can render it.
    pub points: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
}

/// One checkout attempt. Entries are only ever appended to `cart_history`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub total_amount: f64,
    pub items: Vec<serde_json::Value>,
    pub status: PaymentStatus,
    pub timestamp: u64,
}

/// All reward state for a single user.
///
/// Created with catalog defaults on first reference and owned by the ledger
/// for the rest of the process lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Reward balance in points.
    pub points: u64,

    /// Currency credited by confirmed payments.
    pub balance: f64,

    pub spin: AttemptState,

    pub quiz: AttemptState,

    pub daily_bonus: DailyBonus,

    /// Keys are fixed at creation from the task catalog.
    pub tasks: BTreeMap<TaskId, TaskState>,

    /// Append-only payment history.
    pub cart_history: Vec<PaymentRecord>,
}

impl UserRecord {
    pub fn new(config: &RewardConfig) -> Self {
        let tasks = config
            .task_catalog
            .iter()
            .map(|task| {
                (
                    task.id.clone(),
                    TaskState {
                        points: task.points,
                        ..TaskState::default()
                    },
                )
            })
            .collect();

        Self {
            points: config.starting_points,
            balance: 0.0,
            spin: AttemptState::full(config.max_spin_attempts),
            quiz: AttemptState::full(config.max_quiz_attempts),
            daily_bonus: DailyBonus::default(),
            tasks,
            cart_history: Vec::new(),
        }
    }

    /// Most recent of the bonus, spin and quiz timestamps.
    pub fn last_operation_time(&self) -> u64 {
        self.daily_bonus
            .last_claim_at
            .max(self.spin.last_at)
            .max(self.quiz.last_at)
    }
}
