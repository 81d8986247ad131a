//! chat-relay - stateless HTTP relay to a hosted Gemini model
//!
//! Accepts a chat message plus prior history from a frontend, forwards it to
//! the provider with the server-held API key, and returns the reply as JSON.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod history;
pub mod json;
pub mod middleware;
pub mod provider;
pub mod server;
pub mod telemetry;
