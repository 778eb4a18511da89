use crate::policy::RewardPolicy;
use crate::states::{RewardConfig, UserRecord};
use log::debug;

/// Lazily refills spin and quiz attempts whose cooldown window has passed.
///
/// There is no timer behind resets: this runs at the start of every ledger
/// operation, so state is always evaluated against the current clock.
pub fn apply_daily_reset(record: &mut UserRecord, config: &RewardConfig, now: u64) {
    let window = config.reset_window_ms;
    let mode = config.reset_mode;

    if RewardPolicy::apply_reset(&mut record.spin, config.max_spin_attempts, now, window, mode) {
        debug!("spin attempts restored to {}", config.max_spin_attempts);
    }
    if RewardPolicy::apply_reset(&mut record.quiz, config.max_quiz_attempts, now, window, mode) {
        debug!("quiz attempts restored to {}", config.max_quiz_attempts);
    }
}
