pub mod auth;
pub mod bridge;
pub mod challenge;
pub mod channel_history;
pub mod chat;
pub mod command;
pub mod completion;
pub mod config;
pub mod donation;
pub mod error;
pub mod event_log;
pub mod session;

// Re-export common error type
pub use error::RcError;
