//! HTTP request handlers for chat-relay

use crate::config::Config;
use crate::error::AppResult;
use crate::provider::{ChatProvider, GeminiProvider};
use std::sync::Arc;

pub mod chat;
pub mod health;
pub mod payload;

/// Application state shared across all handlers
///
/// Built once at startup and read-only afterwards. The provider is Arc'd for
/// cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn ChatProvider>,
}

impl AppState {
    /// Create state around an already-built provider
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the API key from the environment and build the Gemini provider
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let api_key = config.api_key()?;
        let provider = GeminiProvider::new(&config.provider, api_key)?;
        Ok(Self::new(Arc::new(provider)))
    }

    /// Get reference to the model provider
    pub fn provider(&self) -> &dyn ChatProvider {
        self.provider.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use crate::error::AppError;
    use std::str::FromStr;

    fn create_test_state() -> AppState {
        let config = Config::default();
        let provider = GeminiProvider::new(&config.provider, ApiKey::new("test-key"))
            .expect("should build provider");
        AppState::new(Arc::new(provider))
    }

    #[test]
    fn test_appstate_provides_access_to_provider() {
        let state = create_test_state();
        assert_eq!(state.provider().model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_from_config_fails_without_api_key() {
        let config = Config::from_str(
            r#"
[provider]
api_key_env = "CHAT_RELAY_TEST_KEY_THAT_IS_NEVER_SET"
"#,
        )
        .expect("should parse test config");
        let result = AppState::from_config(&config);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_appstate_is_clonable() {
        let state = create_test_state();
        let state2 = state.clone();
        assert_eq!(state2.provider().model(), state.provider().model());
    }
}
