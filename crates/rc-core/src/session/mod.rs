//! Chat connection session and the chat-to-emulator integration built on it.

pub mod integration;
pub mod model;

pub use integration::{ChatIntegration, IntegrationEvent};
pub use model::{ConnectAttempt, ConnectionSession, ConnectionState};
