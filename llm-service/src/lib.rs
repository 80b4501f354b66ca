//! Client for OpenAI-compatible inference endpoints.
//!
//! Covers the three remote calls the chatbot makes against LLM-style services:
//! chat completion (answer generation via OpenRouter), a second chat
//! completion used as an enhancement pass, and query embeddings. All three
//! speak the same REST dialect, so one [`ChatClient`] serves every role with
//! its own [`LlmModelConfig`].

mod chat;
mod config;
mod error;
mod health;

pub use chat::ChatClient;
pub use config::LlmModelConfig;
pub use error::{LlmError, make_snippet};
pub use health::{EndpointHealth, probe_endpoint};
