use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{melds, tables};
use crate::config::ServerConfig;
use crate::tables::TableRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub tables: TableRegistry,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            tables: TableRegistry::new(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/melds/validate", post(melds::validate))
        .route("/api/combos", post(melds::combos))
        .route("/api/duos", post(melds::duos))
        .route("/api/tables", post(tables::create))
        .route("/api/tables/{id}", get(tables::show).delete(tables::close))
        .route("/api/tables/{id}/reset", post(tables::reset))
        .route("/api/tables/{id}/spots", post(tables::lay_down))
        .route("/api/tables/{id}/spots/{spot}/fit", post(tables::fit))
        .route("/api/tables/{id}/spots/{spot}/cards", post(tables::place))
        .route("/api/tables/{id}/singles", post(tables::singles))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, decks = config.decks, "rule engine listening");

    let app = router(Arc::new(AppState::new(config)));
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(AppState::new(ServerConfig::default())))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn validate_detects_and_explains() {
        let app = app();
        let (status, body) = call(&app, "POST", "/api/melds/validate", Some(json!({"cards": ["5h", "6h", "*r"]}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["kind"], "Run");
        assert_eq!(body["value"], 18);

        let (_, body) = call(
            &app,
            "POST",
            "/api/melds/validate",
            Some(json!({"cards": ["7♠", "7♣", "🃏B"], "kind": "Set"})),
        )
        .await;
        assert_eq!(body["valid"], false);
        assert!(body["error"].as_str().unwrap().contains("blocked"));
    }

    #[tokio::test]
    async fn bad_card_text_is_a_client_error() {
        let (status, body) = call(&app(), "POST", "/api/melds/validate", Some(json!({"cards": ["11x"]}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("11x"));
    }

    #[tokio::test]
    async fn combos_are_ordered_and_respect_laying_all() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/combos",
            Some(json!({"hand": ["5♥", "6♥", "7♥"], "allow_laying_all": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let combos = body["combos"].as_array().unwrap();
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0]["text"], "[5♥ 6♥ 7♥]");
        assert_eq!(combos[0]["card_count"], 3);

        let (_, body) = call(&app, "POST", "/api/combos", Some(json!({"hand": ["5♥", "6♥", "7♥"]}))).await;
        assert!(body["combos"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn combos_reject_oversized_hands() {
        let bound = ServerConfig::default().max_hand_size;
        let hand: Vec<String> = (0..=bound).map(|_| "2♣".to_string()).collect();
        let (status, _) = call(&app(), "POST", "/api/combos", Some(json!({"hand": hand}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn duos_skip_dead_ones() {
        let (status, body) = call(
            &app(),
            "POST",
            "/api/duos",
            Some(json!({"hand": ["5♦", "7♦", "9♠", "9♥"], "table": ["6♦", "6♦"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["runs"].as_array().unwrap().is_empty());
        assert_eq!(body["sets"][0]["cards"], "9♠ 9♥");
    }

    #[tokio::test]
    async fn table_session_flow() {
        let app = app();
        let (status, body) = call(&app, "POST", "/api/tables", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/tables/{id}/spots"),
            Some(json!({"cards": ["5♥", "🃏R", "7♥"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"], "Run");

        let (_, body) = call(
            &app,
            "POST",
            &format!("/api/tables/{id}/spots/0/fit"),
            Some(json!({"card": "6♥"})),
        )
        .await;
        assert_eq!(body["fits"], true);
        assert_eq!(body["replaces_joker"], true);
        assert_eq!(body["joker"], "🃏R");

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/tables/{id}/spots/0/cards"),
            Some(json!({"card": "6♥"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["spot"]["cards"], "5♥ 6♥ 7♥");
        assert_eq!(body["joker"], "🃏R");

        let (_, body) = call(
            &app,
            "POST",
            &format!("/api/tables/{id}/singles"),
            Some(json!({"hand": ["8♥", "K♠"]})),
        )
        .await;
        assert_eq!(body["singles"].as_array().unwrap().len(), 1);

        let (status, _) = call(
            &app,
            "POST",
            &format!("/api/tables/{id}/spots/0/cards"),
            Some(json!({"card": "4♣"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = call(
            &app,
            "POST",
            &format!("/api/tables/{id}/spots/5/fit"),
            Some(json!({"card": "4♣"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = call(&app, "POST", &format!("/api/tables/{id}/reset"), None).await;
        assert_eq!(body["round"], 1);
        assert!(body["spots"].as_array().unwrap().is_empty());

        let (status, _) = call(&app, "DELETE", &format!("/api/tables/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "GET", &format!("/api/tables/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn combos_can_read_a_hosted_table() {
        let app = app();
        let (_, body) = call(&app, "POST", "/api/tables?decks=1", None).await;
        let id = body["id"].as_str().unwrap().to_string();
        call(
            &app,
            "POST",
            &format!("/api/tables/{id}/spots"),
            Some(json!({"cards": ["6♦", "6♠", "6♣"]})),
        )
        .await;

        let (_, body) = call(
            &app,
            "POST",
            "/api/duos",
            Some(json!({"hand": ["5♦", "7♦"], "table_id": id})),
        )
        .await;
        assert!(body["runs"].as_array().unwrap().is_empty());
    }
}
