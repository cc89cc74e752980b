//! Route handler functions.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use counsel_chat::{TurnRequest, TurnResponse};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /chat.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Missing is treated the same as empty.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// POST /chat - run one conversational turn.
pub async fn chat(
    State(state): State<AppState>,
    Extension(Caller(caller_id)): Extension<Caller>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TurnResponse>, ApiError> {
    let Json(body) = body?;

    let request = TurnRequest {
        message: body.message,
        session_id: body.session_id,
        caller_id,
    };

    let response = state.orchestrator.handle_turn(request).await?;
    Ok(Json(response))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Documents in the knowledge-base index.
    pub documents: u64,
    /// Live conversation sessions.
    pub sessions: u64,
}

/// GET /health - liveness and basic counters.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        documents: state.index.len() as u64,
        sessions: state.orchestrator.session_count().await as u64,
    })
}
