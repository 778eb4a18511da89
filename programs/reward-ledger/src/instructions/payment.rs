use crate::error::{ErrorCode, Result};
use crate::instructions::Context;
use crate::states::{PaymentConfirmed, PaymentInitiated, PaymentRecord, PaymentStatus};

/// Records a checkout as `PENDING` in the user's cart history.
///
/// `total_amount` must be a finite number greater than zero; otherwise the call
/// fails with `InvalidAmount` and the history is left unchanged.
pub fn initiate_payment(
    ctx: Context,
    total_amount: Option<f64>,
    items: Vec<serde_json::Value>,
) -> Result<PaymentInitiated> {
    let total_amount = match total_amount {
        Some(total) if total.is_finite() && total > 0.0 => total,
        _ => return Err(ErrorCode::InvalidAmount),
    };

    let record = ctx.record;
    let payment_id = record.cart_history.len();
    let item_count = items.len();
    record.cart_history.push(PaymentRecord {
        total_amount,
        items,
        status: PaymentStatus::Pending,
        timestamp: ctx.now,
    });

    Ok(PaymentInitiated {
        payment_id,
        total_amount,
        item_count,
        status: PaymentStatus::Pending,
    })
}

/// Settles a pending mock payment: marks it `CONFIRMED` and credits the balance.
///
/// # Errors
/// - `InvalidPayment`: no such record, or it is not pending any more.
pub fn confirm_payment(ctx: Context, payment_id: usize) -> Result<PaymentConfirmed> {
    let record = ctx.record;
    let payment = record
        .cart_history
        .get_mut(payment_id)
        .filter(|p| p.status == PaymentStatus::Pending)
        .ok_or(ErrorCode::InvalidPayment)?;

    payment.status = PaymentStatus::Confirmed;
    let total_amount = payment.total_amount;
    record.balance += total_amount;

    Ok(PaymentConfirmed {
        payment_id,
        total_amount,
        new_balance: record.balance,
    })
}
