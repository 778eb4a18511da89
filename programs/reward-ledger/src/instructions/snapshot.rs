use crate::instructions::Context;
use crate::states::Snapshot;

pub fn request_snapshot(ctx: Context) -> Snapshot {
    let record = &*ctx.record;
    Snapshot {
        points: record.points,
        balance: record.balance,
        spin: record.spin,
        quiz: record.quiz,
        last_claim_at: record.daily_bonus.last_claim_at,
        daily_bonus_points: ctx.config.daily_bonus_points,
        tasks: record.tasks.clone(),
        last_operation_time: record.last_operation_time(),
    }
}
