//! Daily-cooldown reward ledger for the School Library Shop mini app.
//!
//! Per-user points, spin/quiz attempts with lazy 24h resets, a daily bonus,
//! one-shot social tasks and mock payments.

pub const RESET_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;
pub const MAX_SPIN_ATTEMPTS: u32 = 5;
pub const MAX_QUIZ_ATTEMPTS: u32 = 5;
pub const DAILY_BONUS_POINTS: u64 = 500;
pub const PAYMENT_CONFIRM_DELAY_SECS: u64 = 10;

pub mod clock;
pub mod error;
pub mod instructions;
pub mod jobs;
pub mod ledger;
pub mod notify;
pub mod policy;
pub mod states;
pub mod store;


pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorCode, Result};
pub use instructions::{apply_daily_reset, TaskVerifier, TrustingVerifier};
pub use jobs::{DeferredJobs, JobKind, JobOutcome, JobReport, MAX_RETAINED_REPORTS};
pub use ledger::{LedgerBuilder, RewardLedger};
pub use notify::{LaunchButton, NotificationPort, OutboundMessage};
pub use policy::{FixedPicker, PrizePicker, RewardPolicy, SeededPicker, ThreadRngPicker};
pub use states::*;
pub use store::{InMemoryStore, UserStore};
