//! Configuration management for chat-relay
//!
//! Parses an optional TOML configuration file and provides typed access to
//! settings. Every section has defaults, so the relay runs without a file.
//! The provider API key never lives in the file: it is read once from the
//! environment variable named by `provider.api_key_env`.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

/// Default Gemini REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default environment variable holding the provider API key
pub const DEFAULT_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Default assistant personality
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a highly capable, premium personal assistant.
Your tone is warm, helpful, smart, and deeply conversational.
Always provide well-structured, easy-to-read responses.
Sound natural and human-like, never robotic or overly formal.
Always remember the context of the conversation, address the user warmly, and be proactive in your assistance.";

/// Upper bound for `provider.timeout_seconds`
const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Upstream model configuration
///
/// Fields are private; values are only produced by deserialization or
/// `Default` and checked by `Config::validate()`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
    #[serde(default = "default_system_prompt")]
    system_prompt: String,
    /// Per-call timeout; unset means the call may wait indefinitely
    #[serde(default)]
    timeout_seconds: Option<u64>,
}

impl ProviderConfig {
    /// Get the model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the name of the environment variable holding the API key
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Get the system instruction sent with every conversation
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Get the per-call timeout in seconds (if configured)
    pub fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            system_prompt: default_system_prompt(),
            timeout_seconds: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Provider API key
///
/// `Debug` is redacted so the key cannot end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Resolve the key through `lookup` (normally the process environment)
    pub fn resolve<F>(var_name: &str, lookup: F) -> AppResult<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(var_name) {
            Some(key) if !key.trim().is_empty() => Ok(Self(key.trim().to_string())),
            Some(_) => Err(AppError::Config(format!(
                "environment variable {} is set but empty",
                var_name
            ))),
            None => Err(AppError::Config(format!(
                "environment variable {} is not set. Put the provider API key there \
                (a .env file in the working directory is also read).",
                var_name
            ))),
        }
    }

    /// Get the raw key for sending upstream
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Load from `path` if given, otherwise use built-in defaults
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                tracing::debug!("No config file given, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read the provider API key from the process environment
    pub fn api_key(&self) -> AppResult<ApiKey> {
        ApiKey::resolve(self.provider.api_key_env(), |name| std::env::var(name).ok())
    }

    /// Address the HTTP server binds to
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            AppError::Config(format!(
                "server.host must be an IP address, got '{}'",
                self.server.host
            ))
        })?;
        Ok(SocketAddr::from((ip, self.server.port)))
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()` and `from_str()`.
    pub fn validate(&self) -> AppResult<()> {
        self.socket_addr()?;

        let provider = &self.provider;

        if provider.model.trim().is_empty() {
            return Err(AppError::Config(
                "provider.model must not be empty".to_string(),
            ));
        }

        if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "provider.base_url must start with 'http://' or 'https://', got '{}'",
                provider.base_url
            )));
        }

        if provider.api_key_env.trim().is_empty() {
            return Err(AppError::Config(
                "provider.api_key_env must name an environment variable".to_string(),
            ));
        }

        if provider.system_prompt.trim().is_empty() {
            return Err(AppError::Config(
                "provider.system_prompt must not be empty".to_string(),
            ));
        }

        if let Some(timeout) = provider.timeout_seconds {
            if timeout == 0 || timeout > MAX_TIMEOUT_SECONDS {
                return Err(AppError::Config(format!(
                    "provider.timeout_seconds must be between 1 and {}, got {}",
                    MAX_TIMEOUT_SECONDS, timeout
                )));
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}
