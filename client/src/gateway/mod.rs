pub mod dispatch;
pub mod leaderboard;
pub mod request;
pub mod response;

pub use response::{GatewayResponse, ResponseBody};

use crate::bot::{BotCommandHandler, BotOutcome};
use axum::http::StatusCode;
use log::debug;
use request::{InboundRequest, MiniAppRequest};
use reward_ledger::{NotificationPort, RewardLedger};
use std::sync::Arc;
use url::Url;

/// Single entry point for every POST body: bot updates go to the command
/// handler, mini-app actions to the ledger.
pub struct Gateway<N> {
    ledger: RewardLedger<N>,
    bot: BotCommandHandler<N>,
}

impl<N: NotificationPort> Gateway<N> {
    pub fn new(ledger: RewardLedger<N>, notifier: Arc<N>, mini_app_url: Url) -> Self {
        let bot = BotCommandHandler::new(ledger.clone(), notifier, mini_app_url);
        Self { ledger, bot }
    }

    pub fn ledger(&self) -> &RewardLedger<N> {
        &self.ledger
    }

    pub async fn handle(&self, body: &[u8]) -> GatewayResponse {
        match request::classify(body) {
            Err(code) => GatewayResponse::error(&code),
            Ok(InboundRequest::Empty) => GatewayResponse::text(StatusCode::OK, "OK"),
            Ok(InboundRequest::BotUpdate(update)) => match self.bot.handle(&update).await {
                BotOutcome::NoSender => {
                    GatewayResponse::text(StatusCode::OK, "OK - User ID Not Found")
                }
                BotOutcome::Launched(user_id) => {
                    debug!("launcher handled for user {}", user_id);
                    GatewayResponse::text(StatusCode::OK, "OK")
                }
                BotOutcome::Registered(user_id) => {
                    debug!("update from user {} acknowledged", user_id);
                    GatewayResponse::text(StatusCode::OK, "OK")
                }
            },
            Ok(InboundRequest::MiniApp(request)) => self.handle_action(request).await,
            Ok(InboundRequest::Unrecognized) => {
                GatewayResponse::text(StatusCode::OK, "Unexpected Request Format")
            }
        }
    }

    /// The user id and the action name are both checked before any record is
    /// created, so a rejected request leaves every user untouched.
    async fn handle_action(&self, request: MiniAppRequest) -> GatewayResponse {
        let user_id = match request.user_id() {
            Ok(user_id) => user_id,
            Err(code) => return GatewayResponse::error(&code),
        };
        let action = match request.parse_action() {
            Ok(action) => action,
            Err(code) => return GatewayResponse::error(&code),
        };
        debug!("dispatching {} for user {}", request.action, user_id);
        dispatch::dispatch(&self.ledger, &user_id, action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reward_ledger::{
        ErrorCode, FixedPicker, InMemoryStore, ManualClock, OutboundMessage, RewardConfig, UserId,
        UserStore,
    };
    use serde_json::{json, Value};
    use std::future::Future;
    use std::sync::Mutex;

    const T0: u64 = 1_700_000_000_000;
    const MINI_APP_URL: &str = "https://schoollibrary1.netlify.app/";

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(UserId, OutboundMessage)>>,
    }

    impl NotificationPort for RecordingNotifier {
        fn send_message(
            &self,
            chat_id: &UserId,
            message: OutboundMessage,
        ) -> impl Future<Output = reward_ledger::Result<()>> + Send {
            self.sent.lock().unwrap().push((chat_id.clone(), message));
            std::future::ready(Ok(()))
        }
    }

    struct Harness {
        gateway: Gateway<RecordingNotifier>,
        store: Arc<InMemoryStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let ledger = RewardLedger::builder(RewardConfig::default())
            .clock(Arc::new(ManualClock::new(T0)))
            .picker(Arc::new(FixedPicker(0)))
            .open(store.clone(), notifier.clone())
            .unwrap();
        let gateway = Gateway::new(ledger, notifier.clone(), Url::parse(MINI_APP_URL).unwrap());
        Harness {
            gateway,
            store,
            notifier,
        }
    }

    async fn post(h: &Harness, body: Value) -> GatewayResponse {
        h.gateway.handle(body.to_string().as_bytes()).await
    }

    fn body(response: &GatewayResponse) -> &Value {
        response.json_body().expect("json body")
    }

    #[tokio::test]
    async fn test_unknown_action_is_rejected_without_creating_user() {
        let h = harness();
        let response = post(&h, json!({"action": "foo", "user_id": 1})).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(body(&response)["error"], "UnknownAction");
        assert_eq!(body(&response)["message"], "Unknown action: foo");
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_and_bad_json() {
        let h = harness();
        let response = post(&h, json!({"action": "spin_attempt"})).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(body(&response)["error"], "UserIdMissing");

        let response = h.gateway.handle(b"{\"action\": ").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(body(&response)["error"], "InvalidJson");
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_acknowledgements() {
        let h = harness();
        assert_eq!(
            h.gateway.handle(b"").await,
            GatewayResponse::text(StatusCode::OK, "OK")
        );
        assert_eq!(
            post(&h, json!({"hello": "world"})).await,
            GatewayResponse::text(StatusCode::OK, "Unexpected Request Format")
        );
        assert_eq!(
            post(&h, json!({"update_id": 5, "edited_message": {}})).await,
            GatewayResponse::text(StatusCode::OK, "OK - User ID Not Found")
        );
    }

    #[tokio::test]
    async fn test_start_command_registers_and_sends_launcher() {
        let h = harness();
        let update = json!({
            "update_id": 900,
            "message": {"text": "/start", "chat": {"id": 555}, "from": {"id": 555}}
        });
        let response = post(&h, update).await;
        assert_eq!(response, GatewayResponse::text(StatusCode::OK, "OK"));

        let id = UserId::from(555i64);
        assert!(h.store.get(&id).unwrap().is_some());

        let sent = h.notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, id);
        let button = sent[0].1.launch_button.clone().expect("launch button");
        assert_eq!(button.url, MINI_APP_URL);
    }

    #[tokio::test]
    async fn test_other_bot_text_only_registers() {
        let h = harness();
        let update = json!({
            "update_id": 901,
            "message": {"text": "hello", "chat": {"id": 77}, "from": {"id": 77}}
        });
        assert_eq!(post(&h, update).await, GatewayResponse::text(StatusCode::OK, "OK"));
        assert_eq!(h.store.len(), 1);
        assert!(h.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initial_data_shape() {
        let h = harness();
        let response = post(&h, json!({"action": "request_initial_data", "user_id": "42"})).await;
        assert_eq!(response.status, StatusCode::OK);
        let data = body(&response);
        assert_eq!(data["action"], "initial_data");
        assert_eq!(data["points"], 0);
        assert_eq!(data["spin_data"]["attempts"], 5);
        assert_eq!(data["quiz_data"]["last_quiz"], 0);
        assert_eq!(data["daily_bonus"]["points"], 500);
        assert_eq!(data["tasks_status"]["TG_CH"]["status"], "NEW");
        assert_eq!(data["tasks_status"]["YT_SUB"]["points"], 300);
        assert_eq!(data["leaderboard_data"].as_array().map(Vec::len), Some(3));
        assert_eq!(data["leaderboard_data"][0]["type"], "points");
    }

    #[tokio::test]
    async fn test_spin_until_exhausted() {
        let h = harness();
        let spin = json!({"action": "spin_attempt", "user_id": 42});
        let first = post(&h, spin.clone()).await;
        assert_eq!(body(&first)["points_won"], 50);
        assert_eq!(body(&first)["new_points"], 50);
        assert_eq!(body(&first)["attempts_left"], 4);
        assert_eq!(body(&first)["last_spin"], T0);

        for _ in 0..4 {
            post(&h, spin.clone()).await;
        }
        let exhausted = post(&h, spin).await;
        assert_eq!(exhausted.status, StatusCode::OK);
        assert_eq!(body(&exhausted)["action"], "spin_result");
        assert_eq!(body(&exhausted)["success"], false);
        assert_eq!(body(&exhausted)["attempts_left"], 0);
        assert_eq!(body(&exhausted)["error"], "AttemptsExhausted");
    }

    #[tokio::test]
    async fn test_daily_bonus_twice() {
        let h = harness();
        let claim = json!({"action": "claim_daily_bonus", "user_id": 42});
        let first = post(&h, claim.clone()).await;
        assert_eq!(body(&first)["success"], true);
        assert_eq!(body(&first)["new_points"], 500);
        assert_eq!(body(&first)["last_claim"], T0);

        let second = post(&h, claim).await;
        assert_eq!(second.status, StatusCode::OK);
        assert_eq!(body(&second)["success"], false);
        assert_eq!(body(&second)["message"], "Already claimed for today.");
        assert_eq!(body(&second)["last_claim"], T0);
    }

    #[tokio::test]
    async fn test_social_task_flow() {
        let h = harness();
        let verify = json!({"action": "verify_social_task", "user_id": 42, "task_id": "TG_CH", "points": "150"});
        let first = post(&h, verify.clone()).await;
        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(body(&first)["action"], "task_verified");
        assert_eq!(body(&first)["points_gained"], 150);
        assert_eq!(body(&first)["tasks_status"]["TG_CH"]["completed"], true);

        let again = post(&h, verify).await;
        assert_eq!(again.status, StatusCode::OK);
        assert_eq!(body(&again)["action"], "error");
        assert_eq!(body(&again)["error"], "TaskAlreadyCompleted");

        let invalid = post(&h, json!({"action": "verify_social_task", "user_id": 42, "task_id": "NOPE"})).await;
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(body(&invalid)["error"], "InvalidTask");

        let points = h.gateway.ledger().get_or_create(&UserId::from(42i64)).unwrap().points;
        assert_eq!(points, 150);
    }

    #[tokio::test]
    async fn test_payment_validation_and_ack() {
        let h = harness();
        let bad = post(&h, json!({"action": "initiate_telebirr_payment", "user_id": 42, "total": -5, "cart_items": []})).await;
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(body(&bad)["error"], ErrorCode::InvalidAmount.name());
        let record = h.gateway.ledger().get_or_create(&UserId::from(42i64)).unwrap();
        assert!(record.cart_history.is_empty());

        let ok = post(&h, json!({"action": "initiate_telebirr_payment", "user_id": 42, "total": "99.5", "cart_items": [{"id": 3}]})).await;
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(body(&ok)["action"], "payment_initiated");
        assert_eq!(body(&ok)["status"], "PENDING");
        assert_eq!(body(&ok)["total"], 99.5);
        h.gateway.ledger().close().unwrap();
    }
}
