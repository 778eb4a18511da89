use super::leaderboard::mock_leaderboard;
use super::request::MiniAppAction;
use super::response::GatewayResponse;
use reward_ledger::{
    BonusResult, ErrorCode, NotificationPort, RewardLedger, SpinResult, TaskResult, UserId,
};
use serde_json::json;

/// Runs one mini-app action against the ledger and shapes the wire body.
pub async fn dispatch<N: NotificationPort>(
    ledger: &RewardLedger<N>,
    user_id: &UserId,
    action: MiniAppAction,
) -> GatewayResponse {
    let outcome = match action {
        MiniAppAction::RequestInitialData => initial_data(ledger, user_id),
        MiniAppAction::SpinAttempt => spin_attempt(ledger, user_id),
        MiniAppAction::ClaimDailyBonus => claim_daily_bonus(ledger, user_id),
        MiniAppAction::VerifySocialTask { task_id, points } => {
            verify_social_task(ledger, user_id, &task_id, points).await
        }
        MiniAppAction::InitiateTelebirrPayment { total, cart_items } => {
            initiate_payment(ledger, user_id, total, cart_items).await
        }
    };
    outcome.unwrap_or_else(|code| GatewayResponse::error(&code))
}

fn initial_data<N: NotificationPort>(
    ledger: &RewardLedger<N>,
    user_id: &UserId,
) -> Result<GatewayResponse, ErrorCode> {
    let snapshot = ledger.request_snapshot(user_id)?;
    Ok(GatewayResponse::json(json!({
        "action": "initial_data",
        "success": true,
        "points": snapshot.points,
        "balance": snapshot.balance,
        "spin_data": {
            "attempts": snapshot.spin.attempts_remaining,
            "last_spin": snapshot.spin.last_at,
        },
        "quiz_data": {
            "attempts": snapshot.quiz.attempts_remaining,
            "last_quiz": snapshot.quiz.last_at,
        },
        "daily_bonus": {
            "last_claim": snapshot.last_claim_at,
            "points": snapshot.daily_bonus_points,
        },
        "tasks_status": snapshot.tasks,
        "last_operation_time": snapshot.last_operation_time,
        "leaderboard_data": mock_leaderboard(),
    })))
}

fn spin_attempt<N: NotificationPort>(
    ledger: &RewardLedger<N>,
    user_id: &UserId,
) -> Result<GatewayResponse, ErrorCode> {
    let body = match ledger.spin(user_id)? {
        SpinResult::Won {
            prize_won,
            new_points,
            attempts_left,
            last_spin_at,
        } => json!({
            "action": "spin_result",
            "success": true,
            "points_won": prize_won,
            "new_points": new_points,
            "attempts_left": attempts_left,
            "last_spin": last_spin_at,
        }),
        SpinResult::Exhausted {
            attempts_left,
            last_spin_at,
        } => json!({
            "action": "spin_result",
            "success": false,
            "error": ErrorCode::AttemptsExhausted.name(),
            "message": ErrorCode::AttemptsExhausted.to_string(),
            "attempts_left": attempts_left,
            "last_spin": last_spin_at,
        }),
    };
    Ok(GatewayResponse::json(body))
}

fn claim_daily_bonus<N: NotificationPort>(
    ledger: &RewardLedger<N>,
    user_id: &UserId,
) -> Result<GatewayResponse, ErrorCode> {
    let body = match ledger.claim_daily_bonus(user_id)? {
        BonusResult::Claimed {
            points_awarded,
            new_points,
            last_claim_at,
        } => json!({
            "action": "daily_bonus_claimed",
            "success": true,
            "points_awarded": points_awarded,
            "new_points": new_points,
            "last_claim": last_claim_at,
        }),
        BonusResult::AlreadyClaimed {
            last_claim_at,
            next_claim_at,
        } => json!({
            "action": "daily_bonus_claimed",
            "success": false,
            "error": ErrorCode::BonusAlreadyClaimed.name(),
            "message": ErrorCode::BonusAlreadyClaimed.to_string(),
            "last_claim": last_claim_at,
            "next_claim": next_claim_at,
        }),
    };
    Ok(GatewayResponse::json(body))
}

async fn verify_social_task<N: NotificationPort>(
    ledger: &RewardLedger<N>,
    user_id: &UserId,
    task_id: &str,
    points: Option<i64>,
) -> Result<GatewayResponse, ErrorCode> {
    let body = match ledger.verify_task(user_id, task_id, points).await? {
        TaskResult::Verified {
            task_id,
            points_gained,
            new_points,
            tasks,
        } => json!({
            "action": "task_verified",
            "success": true,
            "task_id": task_id,
            "points_gained": points_gained,
            "new_points": new_points,
            "tasks_status": tasks,
        }),
        TaskResult::Rejected { task_id, tasks } => json!({
            "action": "task_verified",
            "success": false,
            "task_id": task_id,
            "tasks_status": tasks,
            "message": "Verification failed. Please ensure you have joined/subscribed.",
        }),
    };
    Ok(GatewayResponse::json(body))
}

async fn initiate_payment<N: NotificationPort>(
    ledger: &RewardLedger<N>,
    user_id: &UserId,
    total: Option<f64>,
    cart_items: Vec<serde_json::Value>,
) -> Result<GatewayResponse, ErrorCode> {
    let initiated = ledger.initiate_payment(user_id, total, cart_items).await?;
    Ok(GatewayResponse::json(json!({
        "action": "payment_initiated",
        "success": true,
        "payment_id": initiated.payment_id,
        "total": initiated.total_amount,
        "status": initiated.status,
        "message": "Payment request sent to the user via Telegram bot.",
    })))
}
