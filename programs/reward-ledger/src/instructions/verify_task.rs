use crate::error::{ErrorCode, Result};
use crate::instructions::Context;
use crate::policy::RewardPolicy;
use crate::states::{TaskResult, TaskStatus, UserId};
use log::warn;

/// Decides whether a user really performed a social task.
pub trait TaskVerifier: Send + Sync {
    fn verify(&self, user_id: &UserId, task_id: &str) -> bool;
}

/// Accepts every claim. Stands in for a membership lookup against the chat or
/// channel, which is not wired up.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrustingVerifier;

impl TaskVerifier for TrustingVerifier {
    fn verify(&self, _user_id: &UserId, _task_id: &str) -> bool {
        true
    }
}

/// Verifies a social task and credits its points once.
///
/// Points come from the catalog unless `trust_client_points` is set; in that
/// case the caller's value is awarded as-is (clamped at zero). A value sent by
/// the caller that disagrees with the catalog is logged and ignored.
///
/// # Errors
/// - `InvalidTask`: `task_id` is not one of the user's catalog tasks.
/// - `TaskAlreadyCompleted`: the task was verified before; nothing is awarded.
pub fn verify_task(
    ctx: Context,
    user_id: &UserId,
    task_id: &str,
    client_points: Option<i64>,
    verifier: &dyn TaskVerifier,
) -> Result<TaskResult> {
    let record = ctx.record;
    let task = record.tasks.get(task_id).ok_or(ErrorCode::InvalidTask)?;
    if task.completed {
        return Err(ErrorCode::TaskAlreadyCompleted);
    }

    let catalog_points =
        RewardPolicy::points_for_task(&ctx.config.task_catalog, task_id).unwrap_or(task.points);
    let points_gained = if ctx.config.trust_client_points {
        RewardPolicy::sanitize_client_points(client_points)
    } else {
        if let Some(claimed) = client_points {
            if claimed != catalog_points as i64 {
                warn!(
                    "user {} claimed {} points for {}, awarding catalog value {}",
                    user_id, claimed, task_id, catalog_points
                );
            }
        }
        catalog_points
    };
    let new_points = record
        .points
        .checked_add(points_gained)
        .ok_or(ErrorCode::Overflow)?;

    let task = record.tasks.get_mut(task_id).ok_or(ErrorCode::InvalidTask)?;
    task.status = TaskStatus::Pending;

    if !verifier.verify(user_id, task_id) {
        task.status = TaskStatus::Failed;
        return Ok(TaskResult::Rejected {
            task_id: task_id.to_string(),
            tasks: record.tasks.clone(),
        });
    }

    task.completed = true;
    task.claimed = true;
    task.status = TaskStatus::Done;
    record.points = new_points;

    Ok(TaskResult::Verified {
        task_id: task_id.to_string(),
        points_gained,
        new_points,
        tasks: record.tasks.clone(),
    })
}
