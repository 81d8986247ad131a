//! Chat endpoint handler
//!
//! Handles POST /chat: validates the payload, translates the history into
//! provider turns, sends the message through a fresh `ChatSession`, and
//! returns `{reply, status}`. Failures after validation are logged here and
//! reported to the caller with a generic message.

use crate::error::{AppError, AppResult, ResponseStatus};
use crate::handlers::AppState;
use crate::handlers::payload::ChatPayload;
use crate::history::{HistoryEntry, format_history, parse_history};
use crate::json::{self, is_falsy};
use crate::middleware::RequestId;
use crate::provider::ChatSession;
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Validated chat request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    message: String,
    history: Vec<HistoryEntry>,
}

impl ChatRequest {
    /// Validate a raw JSON payload
    ///
    /// Checks run in order: payload present, message non-blank, history
    /// walkable. Only a falsy payload or a falsy/blank message is a caller
    /// error. A truthy body that is not an object, a truthy message that is
    /// not a string, and a history that cannot be walked are internal
    /// failures.
    pub fn from_payload(payload: Value) -> AppResult<Self> {
        if is_falsy(&payload) {
            return Err(AppError::InvalidPayload);
        }

        let fields = match payload {
            Value::Object(fields) => fields,
            other => {
                return Err(AppError::UnexpectedShape {
                    field: "payload",
                    kind: json::kind(&other),
                });
            }
        };

        let message = match fields.get("message") {
            None => return Err(AppError::EmptyMessage),
            Some(value) if is_falsy(value) => return Err(AppError::EmptyMessage),
            Some(Value::String(message)) => message,
            Some(other) => {
                return Err(AppError::UnexpectedShape {
                    field: "message",
                    kind: json::kind(other),
                });
            }
        };

        if message.trim().is_empty() {
            return Err(AppError::EmptyMessage);
        }

        let history = parse_history(fields.get("history"))?;

        Ok(Self {
            message: message.clone(),
            history,
        })
    }

    /// Get the message, exactly as sent
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the caller-supplied history entries
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}

/// Successful chat response: `{"reply": "...", "status": "success"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub status: ResponseStatus,
}

impl ChatResponse {
    pub fn success(reply: String) -> Self {
        Self {
            reply,
            status: ResponseStatus::Success,
        }
    }
}

/// POST /chat handler
///
/// Blocks on the provider call for as long as it takes; no retries.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    ChatPayload(payload): ChatPayload,
) -> Result<Json<ChatResponse>, AppError> {
    match relay(&state, request_id, payload).await {
        Ok(reply) => Ok(Json(ChatResponse::success(reply))),
        Err(e) if e.is_internal() => {
            tracing::error!(
                request_id = %request_id,
                model = %state.provider().model(),
                error = %e,
                "Chat request failed"
            );
            Err(e)
        }
        Err(e) => {
            tracing::debug!(
                request_id = %request_id,
                error = %e,
                "Rejected chat request"
            );
            Err(e)
        }
    }
}

async fn relay(state: &AppState, request_id: RequestId, payload: Value) -> AppResult<String> {
    let request = ChatRequest::from_payload(payload)?;

    let history = format_history(request.history());

    tracing::debug!(
        request_id = %request_id,
        message_length = request.message().len(),
        history_entries = request.history().len(),
        history_turns = history.len(),
        "Received chat request"
    );

    let mut session = ChatSession::start(state.provider(), history);
    let reply = session.send_message(request.message()).await?;

    tracing::info!(
        request_id = %request_id,
        reply_length = reply.len(),
        "Chat reply sent"
    );

    Ok(reply)
}
