use crate::error::{ErrorCode, Result};
use crate::instructions::Context;
use crate::policy::RewardPolicy;
use crate::states::BonusResult;

/// Awards the daily bonus if the cooldown since the previous claim has elapsed.
///
/// `last_claim_at` only ever moves forward: a claim succeeds at `now` only when
/// `now >= last_claim_at + window` (or on the very first claim).
pub fn claim_daily_bonus(ctx: Context) -> Result<BonusResult> {
    let record = ctx.record;
    let last_claim_at = record.daily_bonus.last_claim_at;
    let window = ctx.config.reset_window_ms;

    if !RewardPolicy::is_cooldown_elapsed(last_claim_at, ctx.now, window) {
        return Ok(BonusResult::AlreadyClaimed {
            last_claim_at,
            next_claim_at: last_claim_at.saturating_add(window),
        });
    }

    let points_awarded = ctx.config.daily_bonus_points;
    let new_points = record
        .points
        .checked_add(points_awarded)
        .ok_or(ErrorCode::Overflow)?;
    record.points = new_points;
    record.daily_bonus.last_claim_at = ctx.now;

    Ok(BonusResult::Claimed {
        points_awarded,
        new_points,
        last_claim_at: ctx.now,
    })
}
