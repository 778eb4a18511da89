use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reward_ledger::ErrorCode;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(&'static str),
}

/// Wire response produced for every inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl GatewayResponse {
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Json(body),
        }
    }

    pub fn text(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body: ResponseBody::Text(body),
        }
    }

    /// `{"action": "error", "success": false, "error": <name>, "message": <text>}`.
    pub fn error(code: &ErrorCode) -> Self {
        Self {
            status: status_for(code),
            body: ResponseBody::Json(json!({
                "action": "error",
                "success": false,
                "error": code.name(),
                "message": code.to_string(),
            })),
        }
    }

    #[cfg(test)]
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

/// Malformed input is a 400; a task that was already done is reported with a
/// 200 like the other soft failures; store trouble is a 500.
pub fn status_for(code: &ErrorCode) -> StatusCode {
    match code {
        ErrorCode::UserIdMissing
        | ErrorCode::InvalidJson
        | ErrorCode::UnknownAction(_)
        | ErrorCode::InvalidTask
        | ErrorCode::InvalidAmount => StatusCode::BAD_REQUEST,
        ErrorCode::TaskAlreadyCompleted
        | ErrorCode::AttemptsExhausted
        | ErrorCode::BonusAlreadyClaimed
        | ErrorCode::NotificationDeliveryFailed(_) => StatusCode::OK,
        ErrorCode::InvalidPayment
        | ErrorCode::StoreUnavailable
        | ErrorCode::Overflow
        | ErrorCode::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        match self.body {
            ResponseBody::Json(value) => (self.status, Json(value)).into_response(),
            ResponseBody::Text(text) => (self.status, text).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_each_error() {
        let table = [
            (ErrorCode::UserIdMissing, StatusCode::BAD_REQUEST),
            (ErrorCode::InvalidJson, StatusCode::BAD_REQUEST),
            (ErrorCode::UnknownAction("foo".into()), StatusCode::BAD_REQUEST),
            (ErrorCode::InvalidTask, StatusCode::BAD_REQUEST),
            (ErrorCode::InvalidAmount, StatusCode::BAD_REQUEST),
            (ErrorCode::TaskAlreadyCompleted, StatusCode::OK),
            (ErrorCode::AttemptsExhausted, StatusCode::OK),
            (ErrorCode::BonusAlreadyClaimed, StatusCode::OK),
            (ErrorCode::NotificationDeliveryFailed("x".into()), StatusCode::OK),
            (ErrorCode::InvalidPayment, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::StoreUnavailable, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::Overflow, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorCode::InvalidConfig("bad"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in table {
            assert_eq!(status_for(&code), status, "{}", code.name());
        }
    }

    #[test]
    fn test_error_body_and_http_response() {
        let response = GatewayResponse::error(&ErrorCode::StoreUnavailable);
        assert_eq!(
            response.json_body(),
            Some(&json!({
                "action": "error",
                "success": false,
                "error": "StoreUnavailable",
                "message": "User store is unavailable",
            }))
        );
        assert_eq!(
            response.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let text = GatewayResponse::text(StatusCode::OK, "OK").into_response();
        assert_eq!(text.status(), StatusCode::OK);
    }
}
