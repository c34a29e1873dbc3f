//! Event loop and diagnostics plumbing for the chat bridge.

pub mod runtime;
pub mod tracing_layer;

pub use runtime::{BridgeRuntime, ConsoleCommand};
pub use tracing_layer::{DiagnosticEvent, EventLogLayer};
