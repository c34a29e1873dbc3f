//! Chat-to-emulator bridge core.
//!
//! `ChatIntegration` owns the connection session, the recent channel list,
//! the event log and the chat feed. It turns relay events into bridge actions
//! and log entries, and reports every observable change on an event channel
//! so a UI (or the CLI console) can render it without touching the core.

use tokio::sync::mpsc::UnboundedSender;

use crate::bridge::{BridgeAction, BridgeResponse, ChatRelay, EmulatorBridge, RelayEvent, RelayStatus};
use crate::channel_history::{ChannelHistoryStore, RecentChannels};
use crate::chat::{ChatFeed, ChatMessage};
use crate::command::{Command, DispatchOutcome, dispatch};
use crate::donation::classify;
use crate::error::Result;
use crate::event_log::{EventLog, LogEntry, Severity};

use super::model::{ConnectAttempt, ConnectionSession, ConnectionState};

/// Observable changes, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationEvent {
    Log(LogEntry),
    Chat(ChatMessage),
    StatusChanged(ConnectionState),
    RecentChannelsChanged(Vec<String>),
}

pub struct ChatIntegration {
    session: ConnectionSession,
    recent: RecentChannels,
    history: ChannelHistoryStore,
    log: EventLog,
    feed: ChatFeed,
    observer: Option<UnboundedSender<IntegrationEvent>>,
}

impl ChatIntegration {
    pub fn new(history: ChannelHistoryStore) -> Self {
        Self {
            session: ConnectionSession::new(),
            recent: RecentChannels::new(),
            history,
            log: EventLog::new(),
            feed: ChatFeed::new(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: UnboundedSender<IntegrationEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Loads the persisted recent channels.
    pub async fn initialize(&mut self) {
        self.recent = self.history.load().await;
        self.notify(IntegrationEvent::RecentChannelsChanged(self.recent.to_vec()));
        self.notify(IntegrationEvent::StatusChanged(self.session.state().clone()));
    }

    pub fn session(&self) -> &ConnectionSession {
        &self.session
    }

    pub fn recent_channels(&self) -> &RecentChannels {
        &self.recent
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn chat_feed(&self) -> &ChatFeed {
        &self.feed
    }

    // ============================================================================
    // Chat messages
    // ============================================================================

    /// Handles one relay event, returning the bridge actions it triggers.
    pub fn handle_relay_event(&mut self, event: RelayEvent) -> Vec<BridgeAction> {
        match event {
            RelayEvent::Message(message) => self.handle_message(message),
            RelayEvent::Status(status) => {
                self.handle_relay_status(status);
                Vec::new()
            }
        }
    }

    /// Records a chat message and returns the bridge actions it triggers.
    ///
    /// Commands are dispatched first, then the donation classifier runs on
    /// the same message regardless of whether it was a command.
    pub fn handle_message(&mut self, message: ChatMessage) -> Vec<BridgeAction> {
        let mut actions = Vec::new();

        self.feed.push(message.clone());
        self.notify(IntegrationEvent::Chat(message.clone()));

        if let Some(command) = Command::parse(&message.content) {
            self.log(
                format!("Command from {}: {}", message.username, command.to_line()),
                Severity::Info,
            );
            match dispatch(&command) {
                DispatchOutcome::Send(action) => actions.push(action),
                DispatchOutcome::Ignored { reason } => {
                    self.log(format!("Ignored command: {}", reason), Severity::Info);
                }
                DispatchOutcome::Unknown { name } => {
                    self.log(format!("Unknown command: {}", name), Severity::Warning);
                }
            }
        }

        for event in classify(&message) {
            self.log(event.describe(), Severity::Success);
            if let Some(action) = event.action() {
                actions.push(action);
            }
        }

        actions
    }

    /// Logs the outcome of a bridge call. Returns whether it succeeded.
    pub fn record_bridge_result(
        &mut self,
        action: &BridgeAction,
        result: Result<BridgeResponse>,
    ) -> bool {
        let command = action.command_name();
        match result {
            Ok(response) if response.success => {
                self.log(format!("Command sent: {}", command), Severity::Success);
                true
            }
            Ok(response) => {
                let error = response.error.unwrap_or_else(|| "unknown error".to_string());
                self.log(
                    format!("Command failed: {} - {}", command, error),
                    Severity::Error,
                );
                false
            }
            Err(e) => {
                self.log(
                    format!("Command error: {} - {}", command, e.message()),
                    Severity::Error,
                );
                false
            }
        }
    }

    /// Sends one action and logs the outcome. Never fails.
    pub async fn send_action(&mut self, bridge: &dyn EmulatorBridge, action: BridgeAction) -> bool {
        let result = bridge.send(action.to_request()).await;
        self.record_bridge_result(&action, result)
    }

    /// Handles a message and sends its actions one after another.
    ///
    /// The event loop uses [`Self::handle_message`] and polls the sends
    /// concurrently instead; this is the simple sequential form.
    pub async fn process_message(&mut self, bridge: &dyn EmulatorBridge, message: ChatMessage) {
        for action in self.handle_message(message) {
            self.send_action(bridge, action).await;
        }
    }

    // ============================================================================
    // Connection lifecycle
    // ============================================================================

    /// Starts a connect request. Returns `None` if the name was rejected.
    pub fn begin_connect(&mut self, channel: &str) -> Option<ConnectAttempt> {
        match self.session.begin_connect(channel) {
            Ok(attempt) => {
                tracing::info!("[Session] Connecting to #{}", attempt.channel);
                self.notify_status();
                Some(attempt)
            }
            Err(e) => {
                self.log(e.message(), Severity::Warning);
                None
            }
        }
    }

    /// Applies the relay's answer to a connect request. Returns whether the
    /// session ended up connected.
    pub async fn complete_connect(&mut self, attempt: ConnectAttempt, result: Result<()>) -> bool {
        match result {
            Ok(()) => {
                self.session.complete_connect(&attempt, true);
                self.notify_status();
                if let Err(e) = self.history.add_channel(&mut self.recent, &attempt.channel).await {
                    tracing::warn!("[Session] Failed to persist recent channels: {}", e);
                }
                self.notify(IntegrationEvent::RecentChannelsChanged(self.recent.to_vec()));
                self.log(format!("Connected to #{}", attempt.channel), Severity::Success);
                true
            }
            Err(e) => {
                self.session.complete_connect(&attempt, false);
                self.notify_status();
                self.log(format!("Connection failed: {}", e.message()), Severity::Error);
                false
            }
        }
    }

    /// Connects and waits for the relay's answer.
    pub async fn connect(&mut self, relay: &dyn ChatRelay, channel: &str) -> bool {
        let Some(attempt) = self.begin_connect(channel) else {
            return false;
        };
        let result = relay.connect(&attempt.channel).await;
        self.complete_connect(attempt, result).await
    }

    /// Tears the connection down. A no-op when already disconnected.
    ///
    /// The session ends up disconnected whatever the relay answers.
    pub async fn disconnect(&mut self, relay: &dyn ChatRelay) {
        if !self.session.needs_teardown() {
            return;
        }
        if let Err(e) = relay.disconnect().await {
            tracing::warn!("[Session] Relay teardown failed: {}", e);
        }
        self.session.mark_disconnected();
        self.notify_status();
        self.log("Disconnected from Twitch", Severity::Info);
    }

    /// Applies a status pushed by the relay outside of connect/disconnect.
    pub fn handle_relay_status(&mut self, status: RelayStatus) {
        match status {
            RelayStatus::Connected => self.notify_status(),
            RelayStatus::Disconnected => {
                if self.session.is_connected() {
                    self.session.mark_disconnected();
                    self.notify_status();
                    self.log("Chat connection lost", Severity::Warning);
                }
            }
        }
    }

    // ============================================================================
    // Observers
    // ============================================================================

    fn log(&mut self, message: impl Into<String>, severity: Severity) {
        let entry = self.log.record(message, severity);
        self.notify(IntegrationEvent::Log(entry));
    }

    fn notify_status(&self) {
        self.notify(IntegrationEvent::StatusChanged(self.session.state().clone()));
    }

    fn notify(&self, event: IntegrationEvent) {
        if let Some(observer) = &self.observer {
            // A dropped observer only means nobody is rendering.
            let _ = observer.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeRequest;
    use crate::channel_history::store::tests::MemoryStore;
    use crate::error::RcError;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingBridge {
        requests: Mutex<Vec<BridgeRequest>>,
        fail_with: Option<String>,
    }

    impl RecordingBridge {
        fn failing(error: &str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail_with: Some(error.to_string()),
            }
        }

        fn commands(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.command.clone())
                .collect()
        }
    }

    #[async_trait]
    impl EmulatorBridge for RecordingBridge {
        async fn send(&self, request: BridgeRequest) -> Result<BridgeResponse> {
            self.requests.lock().unwrap().push(request);
            match &self.fail_with {
                Some(error) => Ok(BridgeResponse::failed(error.clone())),
                None => Ok(BridgeResponse::ok()),
            }
        }
    }

    #[derive(Default)]
    struct MockRelay {
        connects: Mutex<Vec<String>>,
        disconnects: Mutex<usize>,
        refuse: bool,
    }

    #[async_trait]
    impl ChatRelay for MockRelay {
        async fn connect(&self, channel: &str) -> Result<()> {
            self.connects.lock().unwrap().push(channel.to_string());
            if self.refuse {
                Err(RcError::relay("login refused"))
            } else {
                Ok(())
            }
        }

        async fn disconnect(&self) -> Result<()> {
            *self.disconnects.lock().unwrap() += 1;
            Err(RcError::relay("already gone"))
        }
    }

    fn integration() -> (ChatIntegration, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::default());
        let history = ChannelHistoryStore::new(memory.clone());
        (ChatIntegration::new(history), memory)
    }

    fn tagged(content: &str, tags: &[(&str, &str)]) -> ChatMessage {
        let raw: BTreeMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ChatMessage::with_raw_tags("viewer", content, raw)
    }

    #[tokio::test]
    async fn test_plain_chat_is_recorded_but_not_dispatched() {
        let (mut chat, _) = integration();
        let bridge = RecordingBridge::default();
        chat.process_message(&bridge, ChatMessage::new("viewer", "hello there"))
            .await;
        assert!(bridge.commands().is_empty());
        assert_eq!(chat.chat_feed().len(), 1);
        assert!(chat.event_log().is_empty());
    }

    #[tokio::test]
    async fn test_speed_command_dispatches() {
        let (mut chat, _) = integration();
        let bridge = RecordingBridge::default();
        chat.process_message(&bridge, ChatMessage::new("viewer", "!speed 2.5"))
            .await;

        let requests = bridge.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].command, "set_speed");
        assert_eq!(requests[0].params.get("speed"), Some(&serde_json::json!(2.5)));
        assert_eq!(chat.event_log().last().unwrap().message, "Command sent: set_speed");
    }

    #[tokio::test]
    async fn test_unknown_command_warns_without_bridge_call() {
        let (mut chat, _) = integration();
        let bridge = RecordingBridge::default();
        chat.process_message(&bridge, ChatMessage::new("viewer", "!dance"))
            .await;
        assert!(bridge.commands().is_empty());
        assert_eq!(chat.event_log().count(Severity::Warning), 1);
        assert_eq!(chat.event_log().last().unwrap().message, "Unknown command: !dance");
    }

    #[tokio::test]
    async fn test_bits_tiers_through_integration() {
        let (mut chat, _) = integration();
        let bridge = RecordingBridge::default();

        chat.process_message(&bridge, tagged("cheer150", &[("bits", "150")]))
            .await;
        chat.process_message(&bridge, tagged("cheer60", &[("bits", "60")]))
            .await;
        {
            let requests = bridge.requests.lock().unwrap();
            assert_eq!(requests.len(), 2);
            assert_eq!(requests[0].command, "speed_boost");
            assert_eq!(requests[0].params.get("duration"), Some(&serde_json::json!(30)));
            assert_eq!(requests[0].params.get("speed"), Some(&serde_json::json!(2.0)));
            assert_eq!(requests[1].params.get("duration"), Some(&serde_json::json!(15)));
            assert_eq!(requests[1].params.get("speed"), Some(&serde_json::json!(1.5)));
        }

        let before = chat.event_log().len();
        chat.process_message(&bridge, tagged("cheer10", &[("bits", "10")]))
            .await;
        assert_eq!(bridge.commands().len(), 2, "10 bits must not boost");
        assert_eq!(chat.event_log().len(), before + 1);
        assert_eq!(
            chat.event_log().last().unwrap().message,
            "viewer donated 10 bits!"
        );
    }

    #[tokio::test]
    async fn test_command_and_subscription_both_fire() {
        let (mut chat, _) = integration();
        let bridge = RecordingBridge::default();
        chat.process_message(
            &bridge,
            tagged("!pause", &[("subscriber", "1"), ("bits", "100")]),
        )
        .await;
        assert_eq!(
            bridge.commands(),
            vec!["pause", "speed_boost", "celebration_effect"]
        );
    }

    #[tokio::test]
    async fn test_bridge_failure_is_logged_and_processing_continues() {
        let (mut chat, _) = integration();
        let bridge = RecordingBridge::failing("emulator not running");
        chat.process_message(&bridge, ChatMessage::new("viewer", "!pause"))
            .await;
        chat.process_message(&bridge, ChatMessage::new("viewer", "!resume"))
            .await;

        assert_eq!(bridge.commands(), vec!["pause", "resume"]);
        assert_eq!(chat.event_log().count(Severity::Error), 2);
        assert_eq!(
            chat.event_log().last().unwrap().message,
            "Command failed: resume - emulator not running"
        );
    }

    #[tokio::test]
    async fn test_connect_records_recent_channel() {
        let (mut chat, memory) = integration();
        let relay = MockRelay::default();

        assert!(chat.connect(&relay, "RetroGamer").await);
        assert!(chat.connect(&relay, "retrogamer").await);

        assert_eq!(*relay.connects.lock().unwrap(), vec!["retrogamer", "retrogamer"]);
        assert_eq!(chat.session().channel(), Some("retrogamer"));
        assert_eq!(chat.recent_channels().as_slice(), ["retrogamer"]);
        assert!(
            memory
                .items
                .lock()
                .unwrap()
                .get(crate::channel_history::RECENT_CHANNELS_KEY)
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_connect_failure_logs_error() {
        let (mut chat, _) = integration();
        let relay = MockRelay {
            refuse: true,
            ..Default::default()
        };
        assert!(!chat.connect(&relay, "retro").await);
        assert_eq!(chat.session().state(), &ConnectionState::Disconnected);
        assert!(chat.recent_channels().is_empty());
        assert_eq!(
            chat.event_log().last().unwrap().message,
            "Connection failed: login refused"
        );
    }

    #[tokio::test]
    async fn test_disconnect_when_disconnected_is_noop() {
        let (mut chat, _) = integration();
        let relay = MockRelay::default();
        chat.disconnect(&relay).await;
        assert_eq!(*relay.disconnects.lock().unwrap(), 0);
        assert_eq!(chat.session().state(), &ConnectionState::Disconnected);
        assert!(chat.event_log().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_is_best_effort() {
        let (mut chat, _) = integration();
        let relay = MockRelay::default();
        chat.connect(&relay, "retro").await;
        chat.disconnect(&relay).await;
        assert_eq!(*relay.disconnects.lock().unwrap(), 1);
        assert_eq!(chat.session().state(), &ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_relay_drop_disconnects() {
        let (mut chat, _) = integration();
        let relay = MockRelay::default();
        chat.connect(&relay, "retro").await;
        chat.handle_relay_event(RelayEvent::Status(RelayStatus::Disconnected));
        assert!(chat.session().channel().is_none());
        assert_eq!(chat.event_log().last().unwrap().severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_blank_channel_rejected_without_relay_call() {
        let (mut chat, _) = integration();
        let relay = MockRelay::default();
        assert!(!chat.connect(&relay, "  ").await);
        assert!(relay.connects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_observer_receives_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let memory = Arc::new(MemoryStore::default());
        let mut chat = ChatIntegration::new(ChannelHistoryStore::new(memory)).with_observer(tx);
        let relay = MockRelay::default();

        chat.initialize().await;
        chat.connect(&relay, "retro").await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&IntegrationEvent::RecentChannelsChanged(vec![
            "retro".to_string()
        ])));
        assert!(events.iter().any(|e| matches!(
            e,
            IntegrationEvent::StatusChanged(ConnectionState::Connected { channel }) if channel == "retro"
        )));
    }
}
