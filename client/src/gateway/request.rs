//! Classifies inbound POST bodies and pulls out what the ledger needs.

use reward_ledger::{ErrorCode, UserId};
use serde::Deserialize;
use serde_json::Value;

/// Placeholder id some mini-app builds send before Telegram init data is available.
pub const UNKNOWN_USER: &str = "UNKNOWN_USER";

#[derive(Debug, Clone, PartialEq)]
pub enum InboundRequest {
    /// Empty body; acknowledged and ignored.
    Empty,
    /// Carries an `update_id`: a Telegram webhook payload.
    BotUpdate(BotUpdate),
    /// Carries a string `action`: a mini-app call.
    MiniApp(MiniAppRequest),
    /// Valid JSON that is neither of the above.
    Unrecognized,
}

pub fn classify(body: &[u8]) -> Result<InboundRequest, ErrorCode> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InboundRequest::Empty);
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| ErrorCode::InvalidJson)?;

    if value.get("update_id").is_some_and(|id| !id.is_null()) {
        let update = serde_json::from_value(value).unwrap_or_else(|err| {
            log::debug!("unreadable bot update fields: {}", err);
            BotUpdate::default()
        });
        return Ok(InboundRequest::BotUpdate(update));
    }

    if let Some(Value::String(action)) = value.get("action") {
        return Ok(InboundRequest::MiniApp(MiniAppRequest {
            action: action.clone(),
            body: value,
        }));
    }

    Ok(InboundRequest::Unrecognized)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BotMessage {
    pub text: Option<String>,
    pub chat: Option<TelegramChat>,
    pub from: Option<TelegramUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CallbackQuery {
    pub from: Option<TelegramUser>,
}

/// The slice of a Telegram `Update` the bot handler looks at.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BotUpdate {
    pub update_id: Option<i64>,
    pub message: Option<BotMessage>,
    pub callback_query: Option<CallbackQuery>,
}

impl BotUpdate {
    /// `message.from.id`, falling back to `callback_query.from.id`.
    pub fn sender(&self) -> Option<UserId> {
        self.message
            .as_ref()
            .and_then(|m| m.from.as_ref())
            .or_else(|| self.callback_query.as_ref().and_then(|q| q.from.as_ref()))
            .map(|user| UserId::from(user.id))
    }

    pub fn chat_id(&self) -> Option<UserId> {
        self.message
            .as_ref()
            .and_then(|m| m.chat.as_ref())
            .map(|chat| UserId::from(chat.id))
    }

    /// `/start`, optionally followed by a deep-link payload.
    pub fn is_start_command(&self) -> bool {
        self.message
            .as_ref()
            .and_then(|m| m.text.as_deref())
            .map(|text| text == "/start" || text.starts_with("/start "))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiniAppRequest {
    pub action: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MiniAppAction {
    RequestInitialData,
    SpinAttempt,
    ClaimDailyBonus,
    VerifySocialTask { task_id: String, points: Option<i64> },
    InitiateTelebirrPayment { total: Option<f64>, cart_items: Vec<Value> },
}

impl MiniAppRequest {
    /// `user_id` as a non-empty string or a number.
    pub fn user_id(&self) -> Result<UserId, ErrorCode> {
        match self.body.get("user_id") {
            Some(Value::String(id)) if !id.trim().is_empty() && id != UNKNOWN_USER => {
                Ok(UserId::from(id.trim()))
            }
            Some(Value::Number(id)) => Ok(match id.as_i64() {
                Some(id) => UserId::from(id),
                None => UserId::from(id.to_string()),
            }),
            _ => Err(ErrorCode::UserIdMissing),
        }
    }

    pub fn parse_action(&self) -> Result<MiniAppAction, ErrorCode> {
        match self.action.as_str() {
            "request_initial_data" => Ok(MiniAppAction::RequestInitialData),
            "spin_attempt" => Ok(MiniAppAction::SpinAttempt),
            "claim_daily_bonus" => Ok(MiniAppAction::ClaimDailyBonus),
            "verify_social_task" => Ok(MiniAppAction::VerifySocialTask {
                task_id: self.body.get("task_id").map(lenient_string).unwrap_or_default(),
                points: self.body.get("points").and_then(lenient_int),
            }),
            "initiate_telebirr_payment" => Ok(MiniAppAction::InitiateTelebirrPayment {
                total: self.body.get("total").and_then(lenient_float),
                cart_items: self
                    .body
                    .get("cart_items")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            }),
            other => Err(ErrorCode::UnknownAction(other.to_string())),
        }
    }
}

fn lenient_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Reads a point value the lenient way the mini app sends it: integers, floats
/// (truncated), integral or decimal strings. Anything else is `None`, which the
/// ledger awards as `0` when client points are trusted.
fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

fn lenient_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mini_app(body: Value) -> MiniAppRequest {
        match classify(body.to_string().as_bytes()).unwrap() {
            InboundRequest::MiniApp(request) => request,
            other => panic!("not a mini-app request: {:?}", other),
        }
    }

    #[test]
    fn test_classify_shapes() {
        assert_eq!(classify(b"").unwrap(), InboundRequest::Empty);
        assert_eq!(classify(b"  \n").unwrap(), InboundRequest::Empty);
        assert_eq!(classify(b"{not json"), Err(ErrorCode::InvalidJson));
        assert_eq!(classify(b"{}").unwrap(), InboundRequest::Unrecognized);
        assert_eq!(classify(br#"{"action": 5}"#).unwrap(), InboundRequest::Unrecognized);
        assert!(matches!(
            classify(br#"{"update_id": 10, "message": {"text": "hi"}}"#).unwrap(),
            InboundRequest::BotUpdate(_)
        ));
    }

    #[test]
    fn test_bot_update_sender_and_start() {
        let update: BotUpdate = serde_json::from_value(json!({
            "update_id": 1,
            "message": {"text": "/start ref42", "chat": {"id": -100}, "from": {"id": 7}}
        }))
        .unwrap();
        assert_eq!(update.sender(), Some(UserId::from("7")));
        assert_eq!(update.chat_id(), Some(UserId::from("-100")));
        assert!(update.is_start_command());

        let callback: BotUpdate = serde_json::from_value(json!({
            "update_id": 2,
            "callback_query": {"from": {"id": 9}}
        }))
        .unwrap();
        assert_eq!(callback.sender(), Some(UserId::from("9")));
        assert!(!callback.is_start_command());
    }

    #[test]
    fn test_user_id_extraction() {
        let numeric = mini_app(json!({"action": "spin_attempt", "user_id": 123456789}));
        assert_eq!(numeric.user_id(), Ok(UserId::from("123456789")));

        let text = mini_app(json!({"action": "spin_attempt", "user_id": "abc"}));
        assert_eq!(text.user_id(), Ok(UserId::from("abc")));

        for missing in [json!({"action": "spin_attempt"}),
                        json!({"action": "spin_attempt", "user_id": ""}),
                        json!({"action": "spin_attempt", "user_id": UNKNOWN_USER}),
                        json!({"action": "spin_attempt", "user_id": null})] {
            assert_eq!(mini_app(missing).user_id(), Err(ErrorCode::UserIdMissing));
        }
    }

    #[test]
    fn test_action_arguments_are_lenient() {
        let task = mini_app(json!({"action": "verify_social_task", "user_id": 1, "task_id": "TG_CH", "points": "150"}));
        assert_eq!(
            task.parse_action(),
            Ok(MiniAppAction::VerifySocialTask { task_id: "TG_CH".into(), points: Some(150) })
        );

        let junk_points = mini_app(json!({"action": "verify_social_task", "user_id": 1, "task_id": "TG_CH", "points": "lots"}));
        assert_eq!(
            junk_points.parse_action(),
            Ok(MiniAppAction::VerifySocialTask { task_id: "TG_CH".into(), points: None })
        );

        let pay = mini_app(json!({"action": "initiate_telebirr_payment", "user_id": 1, "total": "45.50", "cart_items": [{"id": 1}]}));
        assert_eq!(
            pay.parse_action(),
            Ok(MiniAppAction::InitiateTelebirrPayment { total: Some(45.5), cart_items: vec![json!({"id": 1})] })
        );

        let unknown = mini_app(json!({"action": "foo", "user_id": 1}));
        assert_eq!(unknown.parse_action(), Err(ErrorCode::UnknownAction("foo".into())));
    }
}
