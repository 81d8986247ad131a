//! Health check endpoint
//!
//! Liveness only: it never calls the provider.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Configured model identifier
    pub model: String,
}

/// Health check handler
pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "OK",
            model: state.provider().model().to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, Config};
    use crate::provider::GeminiProvider;
    use std::str::FromStr;
    use std::sync::Arc;

    fn create_test_state() -> AppState {
        let config = Config::from_str(
            r#"
[provider]
model = "gemini-1.5-flash"
"#,
        )
        .expect("should parse test config");
        let provider = GeminiProvider::new(&config.provider, ApiKey::new("test-key"))
            .expect("should build provider");
        AppState::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_health_handler_returns_ok() {
        let state = create_test_state();
        let (status, Json(body)) = handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "OK");
        assert_eq!(body.model, "gemini-1.5-flash");
    }
}
