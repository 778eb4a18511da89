//! Reward rules

use crate::policy::PrizePicker;
use crate::states::{AttemptState, CatalogTask, ResetMode};

/// Pure, side-effect-free reward rules. Nothing here reads the clock or the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardPolicy;

impl RewardPolicy {
    /// Uniform choice over the ordered prize table. Duplicates are allowed and
    /// weigh their value accordingly; an empty table yields `0`.
    pub fn pick_prize(prize_table: &[u64], picker: &dyn PrizePicker) -> u64 {
        if prize_table.is_empty() {
            return 0;
        }
        let index = picker.pick_index(prize_table.len());
        prize_table.get(index).copied().unwrap_or(0)
    }

    /// `last_at == 0` (never) or at least `window` ms have passed.
    ///
    /// A clock that reads earlier than `last_at` counts as zero elapsed time.
    pub fn is_cooldown_elapsed(last_at: u64, now: u64, window: u64) -> bool {
        last_at == 0 || now.saturating_sub(last_at) >= window
    }

    /// Catalog reward for `task_id`, `None` for ids outside the catalog.
    pub fn points_for_task(catalog: &[CatalogTask], task_id: &str) -> Option<u64> {
        catalog
            .iter()
            .find(|task| task.id == task_id)
            .map(|task| task.points)
    }

    /// Whether `state` is due for a refill at `now`.
    pub fn is_reset_due(state: &AttemptState, now: u64, window: u64, mode: ResetMode) -> bool {
        match mode {
            ResetMode::Exhausted => {
                state.attempts_remaining == 0
                    && Self::is_cooldown_elapsed(state.last_at, now, window)
            }
            ResetMode::Elapsed => {
                state.last_at > 0 && Self::is_cooldown_elapsed(state.last_at, now, window)
            }
        }
    }

    /// Refills `state` to `max` if a reset is due. Returns whether it did.
    pub fn apply_reset(
        state: &mut AttemptState,
        max: u32,
        now: u64,
        window: u64,
        mode: ResetMode,
    ) -> bool {
        if !Self::is_reset_due(state, now, window, mode) {
            return false;
        }
        state.attempts_remaining = max;
        if mode == ResetMode::Exhausted {
            state.last_at = 0;
        }
        true
    }

    /// Points to award for a caller-supplied value: missing counts as `0` and
    /// negative values clamp to `0`.
    pub fn sanitize_client_points(points: Option<i64>) -> u64 {
        points.map(|p| p.max(0) as u64).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FixedPicker;
    use crate::states::{default_task_catalog, PRIZE_TABLE};
    use crate::RESET_WINDOW_MS;

    #[test]
    fn test_pick_prize_uses_picker_index() {
        assert_eq!(RewardPolicy::pick_prize(&PRIZE_TABLE, &FixedPicker(0)), 50);
        assert_eq!(RewardPolicy::pick_prize(&PRIZE_TABLE, &FixedPicker(5)), 500);
        assert_eq!(RewardPolicy::pick_prize(&PRIZE_TABLE, &FixedPicker(6)), 0);
        // wraps instead of indexing out of bounds
        assert_eq!(RewardPolicy::pick_prize(&PRIZE_TABLE, &FixedPicker(7)), 50);
        assert_eq!(RewardPolicy::pick_prize(&[], &FixedPicker(0)), 0);
    }

    #[test]
    fn test_cooldown_boundary() {
        let t = 1_700_000_000_000;
        assert!(RewardPolicy::is_cooldown_elapsed(0, t, RESET_WINDOW_MS));
        assert!(!RewardPolicy::is_cooldown_elapsed(t, t + RESET_WINDOW_MS - 1, RESET_WINDOW_MS));
        assert!(RewardPolicy::is_cooldown_elapsed(t, t + RESET_WINDOW_MS, RESET_WINDOW_MS));
        // clock skew backwards never unlocks a cooldown
        assert!(!RewardPolicy::is_cooldown_elapsed(t, t - 10, RESET_WINDOW_MS));
    }

    #[test]
    fn test_points_for_task() {
        let catalog = default_task_catalog();
        assert_eq!(RewardPolicy::points_for_task(&catalog, "TG_CH"), Some(150));
        assert_eq!(RewardPolicy::points_for_task(&catalog, "TG_GP"), Some(100));
        assert_eq!(RewardPolicy::points_for_task(&catalog, "YT_SUB"), Some(300));
        assert_eq!(RewardPolicy::points_for_task(&catalog, "IG_FOLLOW"), None);
    }

    #[test]
    fn test_exhausted_mode_requires_zero_attempts() {
        let t = 1_000;
        let mut state = AttemptState { attempts_remaining: 2, last_at: t };
        let later = t + RESET_WINDOW_MS * 3;
        assert!(!RewardPolicy::apply_reset(&mut state, 5, later, RESET_WINDOW_MS, ResetMode::Exhausted));
        assert_eq!(state.attempts_remaining, 2);

        state.attempts_remaining = 0;
        assert!(RewardPolicy::apply_reset(&mut state, 5, later, RESET_WINDOW_MS, ResetMode::Exhausted));
        assert_eq!(state, AttemptState { attempts_remaining: 5, last_at: 0 });
    }

    #[test]
    fn test_elapsed_mode_refills_partial_and_keeps_timestamp() {
        let t = 1_000;
        let mut state = AttemptState { attempts_remaining: 3, last_at: t };
        assert!(RewardPolicy::apply_reset(&mut state, 5, t + RESET_WINDOW_MS, RESET_WINDOW_MS, ResetMode::Elapsed));
        assert_eq!(state, AttemptState { attempts_remaining: 5, last_at: t });

        // never used: nothing to reset
        let mut fresh = AttemptState { attempts_remaining: 0, last_at: 0 };
        assert!(!RewardPolicy::apply_reset(&mut fresh, 5, t, RESET_WINDOW_MS, ResetMode::Elapsed));
    }

    #[test]
    fn test_sanitize_client_points() {
        assert_eq!(RewardPolicy::sanitize_client_points(Some(150)), 150);
        assert_eq!(RewardPolicy::sanitize_client_points(Some(-5)), 0);
        assert_eq!(RewardPolicy::sanitize_client_points(None), 0);
    }
}
