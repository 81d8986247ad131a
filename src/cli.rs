//! Command-line interface for chat-relay
//!
//! Provides argument parsing and subcommand handling for the binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stateless HTTP relay between a chat frontend and a hosted Gemini model
#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(version)]
#[command(about = "Stateless HTTP relay between a chat frontend and a hosted Gemini model")]
#[command(
    long_about = "chat-relay exposes POST /chat, forwards the message and conversation \
    history to Gemini using a server-side API key, and returns the reply as JSON. \
    The API key is read from GOOGLE_API_KEY (or the variable named in the config file); \
    a .env file in the working directory is loaded first."
)]
pub struct Cli {
    /// Path to configuration file (built-in defaults are used when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# chat-relay configuration
#
# Every setting below is optional; the values shown are the defaults.

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 5000

[provider]
# Gemini model identifier
model = "gemini-2.0-flash"

# Gemini REST API base URL
base_url = "https://generativelanguage.googleapis.com/v1beta"

# Environment variable holding the API key (never put the key in this file)
api_key_env = "GOOGLE_API_KEY"

# Per-call timeout in seconds (1-600). Omit to wait as long as the provider takes.
# timeout_seconds = 60

# Personality sent as the system instruction with every conversation
system_prompt = """You are a highly capable, premium personal assistant.
Your tone is warm, helpful, smart, and deeply conversational.
Always provide well-structured, easy-to-read responses.
Sound natural and human-like, never robotic or overly formal.
Always remember the context of the conversation, address the user warmly, and be proactive in your assistance."""

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use clap::CommandFactory;
    use std::str::FromStr;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_config_path_by_default() {
        let cli = Cli::parse_from(["chat-relay"]);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn custom_config_path() {
        let cli = Cli::parse_from(["chat-relay", "--config", "relay.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("relay.toml")));
    }

    #[test]
    fn config_subcommand_with_output() {
        let cli = Cli::parse_from(["chat-relay", "config", "-o", "my-config.toml"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config { output: Some(ref path) }) if path == &PathBuf::from("my-config.toml")
        ));
    }

    #[test]
    fn template_is_valid_config() {
        let config = Config::from_str(generate_config_template())
            .expect("template should be a valid config");
        assert_eq!(config.server.port, 5000);
        assert_eq!(
            config.provider.system_prompt(),
            crate::config::DEFAULT_SYSTEM_PROMPT
        );
    }
}
