use crate::states::{AttemptState, PaymentStatus, TaskId, TaskState};
use serde::Serialize;
use std::collections::BTreeMap;

//
// ──────────────────────────────────────────────────────────────────────────────
// Results: returned by ledger operations for the gateway to put on the wire
// ──────────────────────────────────────────────────────────────────────────────
//

/// Read-only view of a user's reward state after the lazy daily reset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub points: u64,
    pub balance: f64,
    pub spin: AttemptState,
    pub quiz: AttemptState,
    /// Last successful bonus claim (ms), `0` if never.
    pub last_claim_at: u64,
    /// Points the next bonus claim is worth.
    pub daily_bonus_points: u64,
    pub tasks: BTreeMap<TaskId, TaskState>,
    /// Max of the bonus, spin and quiz timestamps; drives the mini app's countdown.
    pub last_operation_time: u64,
}

/// Outcome of a spin. Running out of attempts is a result, not an error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SpinResult {
    Won {
        /// Prize drawn from the table (may be `0`).
        prize_won: u64,
        /// Points balance after the prize was added.
        new_points: u64,
        attempts_left: u32,
        /// Timestamp recorded for this spin.
        last_spin_at: u64,
    },
    /// No attempts were left; nothing was mutated.
    Exhausted {
        attempts_left: u32,
        last_spin_at: u64,
    },
}

/// Outcome of a daily-bonus claim.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum BonusResult {
    Claimed {
        points_awarded: u64,
        new_points: u64,
        last_claim_at: u64,
    },
    /// Still inside the cooldown window; nothing was mutated.
    AlreadyClaimed {
        last_claim_at: u64,
        /// Earliest timestamp at which the next claim succeeds.
        next_claim_at: u64,
    },
}

/// Outcome of a social-task verification that passed input validation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TaskResult {
    Verified {
        task_id: TaskId,
        points_gained: u64,
        new_points: u64,
        tasks: BTreeMap<TaskId, TaskState>,
    },
    /// The verifier refused; the task is left `FAILED` and may be retried.
    Rejected {
        task_id: TaskId,
        tasks: BTreeMap<TaskId, TaskState>,
    },
}

/// Immediate acknowledgement of a checkout. Settlement happens later, if at all.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentInitiated {
    /// Position of the record in the user's `cart_history`.
    pub payment_id: usize,
    pub total_amount: f64,
    pub item_count: usize,
    pub status: PaymentStatus,
}

/// Emitted by the deferred confirmation job.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentConfirmed {
    pub payment_id: usize,
    pub total_amount: f64,
    pub new_balance: f64,
}
