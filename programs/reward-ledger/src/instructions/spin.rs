use crate::error::{ErrorCode, Result};
use crate::instructions::Context;
use crate::policy::{PrizePicker, RewardPolicy};
use crate::states::SpinResult;

/// Spins the prize wheel once.
///
/// Steps:
/// 1) With no attempts left, report `Exhausted` and touch nothing.
/// 2) Draw a prize uniformly from the configured table.
/// 3) Credit the prize, consume one attempt, stamp `last_at = now`.
pub fn spin(ctx: Context, picker: &dyn PrizePicker) -> Result<SpinResult> {
    let record = ctx.record;

    // --- 1) Attempts gate ---
    if record.spin.attempts_remaining == 0 {
        return Ok(SpinResult::Exhausted {
            attempts_left: 0,
            last_spin_at: record.spin.last_at,
        });
    }

    // --- 2) Draw ---
    let prize_won = RewardPolicy::pick_prize(&ctx.config.prize_table, picker);

    // --- 3) Apply ---
    let new_points = record
        .points
        .checked_add(prize_won)
        .ok_or(ErrorCode::Overflow)?;
    record.points = new_points;
    record.spin.attempts_remaining -= 1;
    record.spin.last_at = ctx.now;

    Ok(SpinResult::Won {
        prize_won,
        new_points,
        attempts_left: record.spin.attempts_remaining,
        last_spin_at: ctx.now,
    })
}
