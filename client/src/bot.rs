use crate::gateway::request::BotUpdate;
use log::{debug, info, warn};
use reward_ledger::{NotificationPort, OutboundMessage, RewardLedger, UserId};
use std::sync::Arc;
use url::Url;

pub const WELCOME_TEXT: &str =
    "Welcome to the School Library Shop! Tap the button below to open the shop.";
pub const LAUNCH_BUTTON_TEXT: &str = "🛒 School Library Shop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotOutcome {
    /// `/start`: user registered and the launch message was attempted.
    Launched(UserId),
    /// Any other update from a known sender: user registered, nothing sent.
    Registered(UserId),
    /// No sender could be read from the update.
    NoSender,
}

/// Handles Telegram webhook updates. Only `/start` produces a reply.
pub struct BotCommandHandler<N> {
    ledger: RewardLedger<N>,
    notifier: Arc<N>,
    mini_app_url: Url,
}

impl<N: NotificationPort> BotCommandHandler<N> {
    pub fn new(ledger: RewardLedger<N>, notifier: Arc<N>, mini_app_url: Url) -> Self {
        Self {
            ledger,
            notifier,
            mini_app_url,
        }
    }

    /// Never fails: ledger and delivery problems are logged so the webhook can
    /// always be acknowledged.
    pub async fn handle(&self, update: &BotUpdate) -> BotOutcome {
        let Some(sender) = update.sender() else {
            debug!("update {:?} has no sender", update.update_id);
            return BotOutcome::NoSender;
        };

        if let Err(err) = self.ledger.get_or_create(&sender) {
            warn!("could not register user {}: {}", sender, err);
        }

        if !update.is_start_command() {
            return BotOutcome::Registered(sender);
        }

        let chat_id = update.chat_id().unwrap_or_else(|| sender.clone());
        let message = OutboundMessage::text(WELCOME_TEXT)
            .with_launch_button(LAUNCH_BUTTON_TEXT, self.mini_app_url.as_str());
        match self.notifier.send_message(&chat_id, message).await {
            Ok(()) => info!("sent mini app launcher to {}", chat_id),
            Err(err) => warn!("launcher for {} not delivered: {}", chat_id, err),
        }
        BotOutcome::Launched(sender)
    }
}
