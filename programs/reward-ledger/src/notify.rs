use crate::error::Result;
use crate::states::UserId;
use std::future::Future;

/// Inline control that opens the mini application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchButton {
    pub text: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub launch_button: Option<LaunchButton>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            launch_button: None,
        }
    }

    pub fn with_launch_button(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.launch_button = Some(LaunchButton {
            text: text.into(),
            url: url.into(),
        });
        self
    }
}

/// "Send a message to user X". The transport behind it is not the ledger's concern.
///
/// Failures surface as `ErrorCode::NotificationDeliveryFailed`; callers log them
/// and never roll back state because of them.
pub trait NotificationPort: Send + Sync + 'static {
    fn send_message(
        &self,
        chat_id: &UserId,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<()>> + Send;
}
