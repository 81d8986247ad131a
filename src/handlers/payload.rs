//! JSON body extractor for `/chat`
//!
//! Wraps Axum's `Json` extractor so that every way of not sending usable
//! JSON (no body, wrong content type, syntax error) produces the relay's
//! own `{error, status}` body instead of Axum's plain-text rejection.

use crate::error::AppError;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde_json::Value;

/// Raw JSON payload of a chat request
///
/// The body is kept as a `Value` so the handler can tell a missing message
/// (400) apart from a malformed history (500).
#[derive(Debug)]
pub struct ChatPayload(pub Value);

impl<S> FromRequest<S> for ChatPayload
where
    Json<Value>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ChatPayload(value)),
            Err(rejection) => {
                tracing::debug!(
                    rejection = %rejection.body_text(),
                    "Rejected chat payload"
                );
                Err(AppError::InvalidPayload)
            }
        }
    }
}
