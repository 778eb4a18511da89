use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorCode {
    #[error("User ID Missing in Fetch Request")]
    UserIdMissing,

    #[error("Invalid JSON format.")]
    InvalidJson,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid Task ID.")]
    InvalidTask,

    #[error("Task already completed.")]
    TaskAlreadyCompleted,

    #[error("No attempts left.")]
    AttemptsExhausted,

    #[error("Already claimed for today.")]
    BonusAlreadyClaimed,

    #[error("Invalid total amount.")]
    InvalidAmount,

    #[error("Payment record is not pending")]
    InvalidPayment,

    #[error("Notification delivery failed: {0}")]
    NotificationDeliveryFailed(String),

    #[error("User store is unavailable")]
    StoreUnavailable,

    #[error("Arithmetic overflow occurred")]
    Overflow,

    #[error("Invalid reward configuration: {0}")]
    InvalidConfig(&'static str),
}

impl ErrorCode {
    /// Stable identifier used on the wire (`"error"` field of a failure body).
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::UserIdMissing => "UserIdMissing",
            ErrorCode::InvalidJson => "InvalidJson",
            ErrorCode::UnknownAction(_) => "UnknownAction",
            ErrorCode::InvalidTask => "InvalidTask",
            ErrorCode::TaskAlreadyCompleted => "TaskAlreadyCompleted",
            ErrorCode::AttemptsExhausted => "AttemptsExhausted",
            ErrorCode::BonusAlreadyClaimed => "BonusAlreadyClaimed",
            ErrorCode::InvalidAmount => "InvalidAmount",
            ErrorCode::InvalidPayment => "InvalidPayment",
            ErrorCode::NotificationDeliveryFailed(_) => "NotificationDeliveryFailed",
            ErrorCode::StoreUnavailable => "StoreUnavailable",
            ErrorCode::Overflow => "Overflow",
            ErrorCode::InvalidConfig(_) => "InvalidConfig",
        }
    }
}

pub type Result<T> = std::result::Result<T, ErrorCode>;
