use crate::gateway::{Gateway, GatewayResponse};
use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use log::info;
use reward_ledger::NotificationPort;
use std::sync::Arc;

pub const HEALTH_TEXT: &str = "Telegram Bot Service is Running!";

/// `GET /` liveness, `POST /` for webhook updates and mini-app actions alike.
/// Other methods get axum's 405.
pub fn router<N: NotificationPort>(gateway: Arc<Gateway<N>>) -> Router {
    Router::new()
        .route("/", get(health).post(handle_post::<N>))
        .with_state(gateway)
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

async fn handle_post<N: NotificationPort>(
    State(gateway): State<Arc<Gateway<N>>>,
    body: Bytes,
) -> GatewayResponse {
    gateway.handle(&body).await
}

pub async fn serve<N: NotificationPort>(listen_addr: &str, gateway: Arc<Gateway<N>>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("rewards gateway listening on {}", listener.local_addr()?);
    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_health_text() {
        assert_eq!(health().await, HEALTH_TEXT);
        let response = health().await.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
