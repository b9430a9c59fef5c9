//! Liveness endpoint for the hosting platform.

use std::net::SocketAddr;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

pub const BOT_NAME: &str = "SSC Quiz Bot";

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
}

async fn home() -> (StatusCode, &'static str) {
    (StatusCode::OK, "✅ SSC Quiz Bot is running!")
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "alive", "bot": BOT_NAME }))
}

pub async fn serve(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Health server listening on {}", addr);
    axum::serve(listener, router()).await
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    async fn get_body(path: &str) -> (StatusCode, String) {
        let response = router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_says_running() {
        let (status, body) = get_body("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("running"));
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let (status, body) = get_body("/health").await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "alive");
        assert_eq!(value["bot"], BOT_NAME);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, _) = get_body("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
