//! Event loop driving [`ChatIntegration`].
//!
//! One task owns the integration. Relay events, console commands, pending
//! bridge calls and pending connects are all polled from a single
//! `tokio::select!`, so a slow emulator never holds up chat processing and a
//! connect in flight never blocks a disconnect.

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use rc_core::bridge::{BridgeAction, BridgeResponse, ChatRelay, EmulatorBridge, RelayEvent};
use rc_core::error::Result;
use rc_core::session::{ChatIntegration, ConnectAttempt};

/// Requests coming from the operator console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Connect(String),
    Disconnect,
    Shutdown,
}

type PendingSend = BoxFuture<'static, (BridgeAction, Result<BridgeResponse>)>;
type PendingConnect = BoxFuture<'static, (ConnectAttempt, Result<()>)>;

pub struct BridgeRuntime {
    integration: ChatIntegration,
    relay: Arc<dyn ChatRelay>,
    bridge: Arc<dyn EmulatorBridge>,
    relay_events: UnboundedReceiver<RelayEvent>,
    commands: UnboundedReceiver<ConsoleCommand>,
}

impl BridgeRuntime {
    pub fn new(
        integration: ChatIntegration,
        relay: Arc<dyn ChatRelay>,
        bridge: Arc<dyn EmulatorBridge>,
        relay_events: UnboundedReceiver<RelayEvent>,
        commands: UnboundedReceiver<ConsoleCommand>,
    ) -> Self {
        Self {
            integration,
            relay,
            bridge,
            relay_events,
            commands,
        }
    }

    /// Runs until `Shutdown` arrives or the console goes away.
    ///
    /// Bridge calls still in flight are awaited and logged, then the chat
    /// connection is torn down. Returns the integration for inspection.
    pub async fn run(mut self) -> ChatIntegration {
        self.integration.initialize().await;

        let mut sends: FuturesUnordered<PendingSend> = FuturesUnordered::new();
        let mut connects: FuturesUnordered<PendingConnect> = FuturesUnordered::new();

        loop {
            tokio::select! {
                Some(event) = self.relay_events.recv() => {
                    for action in self.integration.handle_relay_event(event) {
                        sends.push(self.send(action));
                    }
                }
                command = self.commands.recv() => match command {
                    Some(ConsoleCommand::Connect(channel)) => {
                        if let Some(attempt) = self.integration.begin_connect(&channel) {
                            connects.push(self.connect(attempt));
                        }
                    }
                    Some(ConsoleCommand::Disconnect) => {
                        self.integration.disconnect(self.relay.as_ref()).await;
                    }
                    Some(ConsoleCommand::Shutdown) | None => break,
                },
                Some((action, result)) = sends.next(), if !sends.is_empty() => {
                    self.integration.record_bridge_result(&action, result);
                }
                Some((attempt, result)) = connects.next(), if !connects.is_empty() => {
                    self.integration.complete_connect(attempt, result).await;
                }
            }
        }

        tracing::info!("[Runtime] Shutting down ({} bridge call(s) pending)", sends.len());
        while let Some((action, result)) = sends.next().await {
            self.integration.record_bridge_result(&action, result);
        }
        // Connects still in flight are abandoned.
        drop(connects);
        self.integration.disconnect(self.relay.as_ref()).await;
        self.integration
    }

    fn send(&self, action: BridgeAction) -> PendingSend {
        let bridge = Arc::clone(&self.bridge);
        Box::pin(async move {
            let result = bridge.send(action.to_request()).await;
            (action, result)
        })
    }

    fn connect(&self, attempt: ConnectAttempt) -> PendingConnect {
        let relay = Arc::clone(&self.relay);
        Box::pin(async move {
            let result = relay.connect(&attempt.channel).await;
            (attempt, result)
        })
    }
}
