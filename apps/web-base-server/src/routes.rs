//! HTTP routes of the web base server
//!
//! | Route | Gate |
//! |---|---|
//! | `GET /config` | protected |
//! | `POST /config/messages` | protected |
//! | `GET /messages` | public |
//! | `GET /messages/stream` | public |

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio_stream::{Stream, StreamExt};
use tower_http::trace::TraceLayer;
use web_gate::axum_ext::{require_credentials, GateDecision, GateState};
use web_messages::{MessageHub, WEB_MESSAGE_EVENT};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    hub: MessageHub<Value>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(hub: MessageHub<Value>, config: AppConfig) -> Self {
        Self {
            hub,
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState, gate: GateState) -> Router {
    Router::new()
        .route("/config", get(get_config))
        .route("/config/messages", post(publish_message))
        .route("/messages", get(list_messages))
        .route("/messages/stream", get(stream_messages))
        .layer(middleware::from_fn_with_state(gate, require_credentials))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Effective configuration with the secret redacted.
///
/// `access` is `null` when `/config` is outside the protected prefixes.
async fn get_config(
    State(state): State<AppState>,
    decision: Option<GateDecision>,
) -> Json<Value> {
    let decision = decision.map(|GateDecision(decision)| decision);
    tracing::debug!(?decision, "Serving configuration");
    Json(json!({
        "config": state.config.as_ref(),
        "access": decision,
    }))
}

async fn publish_message(
    State(state): State<AppState>,
    Json(message): Json<Value>,
) -> impl IntoResponse {
    let delivered = state.hub.publish(message);
    tracing::debug!(delivered, "Web message published");
    (StatusCode::ACCEPTED, Json(json!({ "delivered": delivered })))
}

async fn list_messages(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.hub.snapshot())
}

async fn stream_messages(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = state.hub.subscribe();
    tracing::debug!(replay = subscription.replay.len(), "Message stream opened");

    let events = subscription
        .into_stream()
        .map(|message| Event::default().event(WEB_MESSAGE_EVENT).json_data(message));

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;
    use web_gate::GateConfig;

    fn app(secret: &str) -> (Router, MessageHub<Value>) {
        app_with_gate(GateConfig::with_secret(secret))
    }

    fn app_with_gate(gate: GateConfig) -> (Router, MessageHub<Value>) {
        let mut config = AppConfig::default();
        config.gate = gate;
        config.messages.buffer_capacity = 3;

        let hub = MessageHub::new(&config.messages).unwrap();
        let gate = GateState::from_config(&config.gate).unwrap();
        let router = build_router(AppState::new(hub.clone(), config), gate);
        (router, hub)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_config_requires_credentials() {
        let (app, _) = app("changeMe");

        let response = app
            .oneshot(Request::get("/config").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_config_is_served_with_secret_redacted() {
        let (app, _) = app("changeMe");

        let response = app
            .oneshot(
                Request::get("/config")
                    .header(header::COOKIE, "session=changeMe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["config"]["gate"]["secret"], "[REDACTED]");
        assert_eq!(json["access"]["source"], "cookie");
    }

    #[tokio::test]
    async fn test_disabled_gate_serves_config() {
        let (app, _) = app("");

        let response = app
            .oneshot(Request::get("/config").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["access"]["decision"], "disabled");
    }

    #[tokio::test]
    async fn test_config_outside_protected_prefixes_is_served() {
        for prefixes in [vec![], vec!["/admin".to_owned()]] {
            let (app, _) = app_with_gate(GateConfig {
                protected_prefixes: prefixes,
                ..GateConfig::with_secret("changeMe")
            });

            let response = app
                .oneshot(Request::get("/config").body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["access"], Value::Null);
            assert_eq!(json["config"]["gate"]["secret"], "[REDACTED]");
        }
    }

    #[tokio::test]
    async fn test_publish_outside_protected_prefixes_is_accepted() {
        let (app, hub) = app_with_gate(GateConfig {
            protected_prefixes: vec![],
            ..GateConfig::with_secret("changeMe")
        });

        let response = app
            .oneshot(
                Request::post("/config/messages")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"text":"hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(hub.snapshot(), vec![json!({ "text": "hi" })]);
    }

    #[tokio::test]
    async fn test_publish_requires_credentials() {
        let (app, hub) = app("changeMe");

        let response = app
            .oneshot(
                Request::post("/config/messages")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"text":"hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(hub.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_published_messages_are_listed_newest_last() {
        let (app, _) = app("changeMe");

        for i in 0..5 {
            let response = app
                .clone()
                .oneshot(
                    Request::post("/config/messages?token=changeMe")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(json!({ "seq": i }).to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }

        let response = app
            .oneshot(Request::get("/messages").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{ "seq": 2 }, { "seq": 3 }, { "seq": 4 }])
        );
    }

    #[tokio::test]
    async fn test_stream_replays_buffer_as_server_sent_events() {
        let (app, hub) = app("changeMe");
        hub.publish(json!({ "text": "first" }));

        let response = app
            .oneshot(Request::get("/messages/stream").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );

        let mut body = response.into_body().into_data_stream();
        let chunk = body.next().await.unwrap().unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        assert!(text.contains("event: WEB_MESSAGE"));
        assert!(text.contains(r#"data: {"text":"first"}"#));
    }
}
