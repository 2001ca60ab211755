//! REST surface for the conversation engine
//!
//! Endpoints:
//! - `POST /api/sessions` — create a session, returns the greeting
//! - `POST /api/chat/{session_id}` — send one message
//! - `GET /api/sessions/{session_id}` — session snapshot
//! - `DELETE /api/sessions/{session_id}` — drop a session
//! - `GET /health`
//!
//! Malformed input maps to 400, unknown sessions to 404, and internal
//! contract violations to an opaque 500 (details go to the log, never
//! to the client).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use intake_agent_agent::router::{route_turn, TurnMetadata};
use intake_agent_agent::AgentError;
use intake_agent_core::Error as CoreError;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = if state.settings.server.cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<axum::http::HeaderValue> = state
            .settings
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/:session_id",
            get(get_session).delete(delete_session),
        )
        .route("/api/chat/:session_id", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// API error body; the only shape errors take on the wire
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "session not found".to_string(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match &err {
            AgentError::Core(CoreError::InvalidRequest(msg)) => ApiError::bad_request(msg.clone()),
            AgentError::Core(CoreError::Validation(msg)) => ApiError::bad_request(msg.clone()),
            _ => {
                tracing::error!(error = %err, "turn failed");
                ApiError::internal()
            }
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Default, Deserialize)]
struct CreateSessionRequest {
    /// Page the chat widget was opened from, e.g. "/pricing"
    #[serde(default)]
    source_page: Option<String>,
}

#[derive(Debug, Serialize)]
struct TurnResponse {
    session_id: Uuid,
    message: String,
    requires_input: bool,
    options: Vec<String>,
    show_cta: bool,
    cta_text: Option<String>,
    metadata: TurnMetadata,
}

async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<TurnResponse>), ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let (id, entry) = state.registry.create(request.source_page);

    // The first turn is the one-shot introduction.
    let mut data = entry.data.lock().await;
    let outcome = route_turn("", &mut data, &state.deps).await?;

    tracing::info!(session_id = %id, live = state.registry.len(), "session started");
    Ok((
        StatusCode::CREATED,
        Json(TurnResponse {
            session_id: id,
            message: outcome.message,
            requires_input: outcome.requires_input,
            options: outcome.options,
            show_cta: outcome.show_cta,
            cta_text: outcome.cta_text,
            metadata: outcome.metadata,
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let entry = state.registry.get(&session_id).ok_or_else(ApiError::not_found)?;

    let mut data = entry.data.lock().await;
    let outcome = route_turn(&request.message, &mut data, &state.deps).await?;

    Ok(Json(TurnResponse {
        session_id,
        message: outcome.message,
        requires_input: outcome.requires_input,
        options: outcome.options,
        show_cta: outcome.show_cta,
        cta_text: outcome.cta_text,
        metadata: outcome.metadata,
    }))
}

#[derive(Debug, Serialize)]
struct SessionSnapshot {
    session_id: Uuid,
    phase: String,
    discovery_turns: u32,
    qa_exchanges: u32,
    turns: usize,
    escalation_reason: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let entry = state.registry.get(&session_id).ok_or_else(ApiError::not_found)?;
    let data = entry.data.lock().await;

    Ok(Json(SessionSnapshot {
        session_id,
        phase: data.phase.as_str().to_string(),
        discovery_turns: data.discovery_turns,
        qa_exchanges: data.qa_exchanges,
        turns: data.history.len(),
        escalation_reason: data.escalation_reason.clone(),
        created_at: entry.created_at,
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.registry.remove(&session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use intake_agent_config::Settings;

    use crate::sink::InMemoryLeadSink;

    use super::*;

    fn test_router() -> Router {
        let state = AppState::new(Settings::default(), Arc::new(InMemoryLeadSink::new()))
            .expect("state");
        router(state)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_router();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_session_returns_greeting() {
        let app = test_router();
        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/sessions",
                serde_json::json!({ "source_page": "/pricing" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("Avery"));
        assert_eq!(body["requires_input"], true);
        assert_eq!(body["metadata"]["phase"], "discovery");
    }

    #[tokio::test]
    async fn test_chat_unknown_session_is_404() {
        let app = test_router();
        let response = app
            .oneshot(json_request(
                Method::POST,
                &format!("/api/chat/{}", Uuid::new_v4()),
                serde_json::json!({ "message": "hello" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_round_trip_and_snapshot() {
        let state = AppState::new(Settings::default(), Arc::new(InMemoryLeadSink::new()))
            .expect("state");
        let app = router(state.clone());

        let created = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/sessions", serde_json::json!({})))
            .await
            .unwrap();
        let session_id = body_json(created).await["session_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/api/chat/{session_id}"),
                serde_json::json!({ "message": "what is an llc exactly" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(!body["message"].as_str().unwrap().is_empty());

        let snapshot = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/sessions/{session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(snapshot.status(), StatusCode::OK);
        let snap = body_json(snapshot).await;
        assert_eq!(snap["phase"], "discovery");
        assert_eq!(snap["qa_exchanges"], 1);
    }

    #[tokio::test]
    async fn test_empty_message_is_400() {
        let app = test_router();
        let created = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/sessions", serde_json::json!({})))
            .await
            .unwrap();
        let session_id = body_json(created).await["session_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(json_request(
                Method::POST,
                &format!("/api/chat/{session_id}"),
                serde_json::json!({ "message": "   " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = test_router();
        let created = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/sessions", serde_json::json!({})))
            .await
            .unwrap();
        let session_id = body_json(created).await["session_id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/sessions/{session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let again = app
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(format!("/api/sessions/{session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }
}
