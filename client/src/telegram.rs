use reward_ledger::{ErrorCode, NotificationPort, OutboundMessage, UserId};
use std::future::Future;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use url::Url;

/// Delivers notices through the Telegram Bot API `sendMessage` method.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, api_url: Option<&Url>) -> Self {
        let mut bot = Bot::new(bot_token);
        if let Some(api_url) = api_url {
            bot = bot.set_api_url(api_url.clone());
        }
        Self { bot }
    }
}

fn delivery_failed(detail: impl ToString) -> ErrorCode {
    ErrorCode::NotificationDeliveryFailed(detail.to_string())
}

impl NotificationPort for TelegramNotifier {
    fn send_message(
        &self,
        chat_id: &UserId,
        message: OutboundMessage,
    ) -> impl Future<Output = reward_ledger::Result<()>> + Send {
        let bot = self.bot.clone();
        let chat_id = chat_id.clone();
        async move {
            let chat = chat_id
                .as_str()
                .parse::<i64>()
                .map(ChatId)
                .map_err(|_| delivery_failed(format!("chat id {} is not numeric", chat_id)))?;

            let mut request = bot.send_message(chat, message.text);
            if let Some(button) = message.launch_button {
                let url = Url::parse(&button.url).map_err(delivery_failed)?;
                let keyboard = InlineKeyboardMarkup::new([[InlineKeyboardButton::web_app(
                    button.text,
                    WebAppInfo { url },
                )]]);
                request = request.reply_markup(keyboard);
            }

            request.await.map(|_| ()).map_err(delivery_failed)
        }
    }
}
