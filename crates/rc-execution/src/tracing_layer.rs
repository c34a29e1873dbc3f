//! Tracing layer that surfaces adapter warnings next to the event log.
//!
//! The Twitch relay, the bridge file writer and the completion monitor log
//! through `tracing`. This layer picks up their warnings and errors and hands
//! them to the console as [`DiagnosticEvent`]s.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Entries already recorded by the event log are mirrored under this target.
pub const EVENT_LOG_TARGET: &str = "rc_core::event_log";

/// A warning or error raised outside the event log.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DiagnosticEvent {
    /// Module path of the emitter (e.g., "rc_infrastructure::twitch::relay")
    pub target: String,
    pub level: String,
    pub message: String,
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

pub struct EventLogLayer {
    sender: mpsc::UnboundedSender<DiagnosticEvent>,
    threshold: Level,
}

impl EventLogLayer {
    /// Forwards WARN and ERROR events.
    pub fn new(sender: mpsc::UnboundedSender<DiagnosticEvent>) -> Self {
        Self {
            sender,
            threshold: Level::WARN,
        }
    }

    /// Forwards everything at or above `threshold`.
    pub fn with_threshold(mut self, threshold: Level) -> Self {
        self.threshold = threshold;
        self
    }

    fn accepts(&self, level: &Level, target: &str) -> bool {
        // Level ordering is by verbosity: ERROR < WARN < INFO.
        *level <= self.threshold && target != EVENT_LOG_TARGET
    }
}

impl<S> Layer<S> for EventLogLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.accepts(metadata.level(), metadata.target()) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let message = fields
            .remove("message")
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_default();

        let diagnostic = DiagnosticEvent {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Nobody listening is fine.
        let _ = self.sender.send(diagnostic);
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            Value::String(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(threshold: Level, emit: impl FnOnce()) -> Vec<DiagnosticEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscriber =
            tracing_subscriber::registry().with(EventLogLayer::new(tx).with_threshold(threshold));
        tracing::subscriber::with_default(subscriber, emit);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_forwards_warnings_with_fields() {
        let events = capture(Level::WARN, || {
            tracing::info!("[Twitch] Joined #streamer");
            tracing::warn!(attempt = 2, "[Twitch] Read error: {}", "reset by peer");
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, "WARN");
        assert_eq!(events[0].message, "[Twitch] Read error: reset by peer");
        assert_eq!(events[0].fields.get("attempt"), Some(&serde_json::json!(2)));
        assert!(!events[0].fields.contains_key("message"));
    }

    #[test]
    fn test_skips_event_log_mirror() {
        let events = capture(Level::INFO, || {
            tracing::error!(target: "rc_core::event_log", "[EventLog] Command error");
            tracing::error!(target: "rc_infrastructure::command_file_bridge", "write failed");
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, "rc_infrastructure::command_file_bridge");
    }

    #[test]
    fn test_threshold_lowers_to_info() {
        let events = capture(Level::INFO, || {
            tracing::debug!("noise");
            tracing::info!("[Monitor] Watching challenge_data.json");
        });
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, "INFO");
    }
}
