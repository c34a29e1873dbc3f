//! Twitch chat relay over the IRC WebSocket gateway.
//!
//! Logs in anonymously, joins one channel and forwards `PRIVMSG` lines as
//! [`RelayEvent::Message`]. The socket is owned by a spawned task; the relay
//! talks to it only through a shutdown signal.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use rc_core::RcError;
use rc_core::bridge::{ChatRelay, RelayEvent, RelayStatus};
use rc_core::chat::{ChatMessage, IrcLine};
use rc_core::config::TwitchConfig;
use rc_core::error::Result;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

const CAPABILITIES: &str = "CAP REQ :twitch.tv/tags twitch.tv/commands";
/// Any password is accepted for `justinfan` logins.
const ANONYMOUS_PASS: &str = "PASS SCHMOOPIIE";

/// What to do with one line received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum LineAction {
    Reply(String),
    Chat(ChatMessage),
    /// Server asked us to reconnect; the connection is about to drop.
    Reconnect,
    Ignore,
}

/// Maps a server line to the relay's reaction.
pub fn classify_line(line: &str) -> LineAction {
    let Some(parsed) = IrcLine::parse(line) else {
        return LineAction::Ignore;
    };
    match parsed.command.as_str() {
        "PING" => LineAction::Reply(match parsed.trailing {
            Some(token) => format!("PONG :{token}"),
            None => "PONG".to_string(),
        }),
        "RECONNECT" => LineAction::Reconnect,
        "PRIVMSG" => parsed
            .into_chat_message()
            .map(LineAction::Chat)
            .unwrap_or(LineAction::Ignore),
        _ => LineAction::Ignore,
    }
}

/// Login lines sent right after the socket opens.
pub fn login_lines(nick: &str) -> [String; 3] {
    [
        CAPABILITIES.to_string(),
        ANONYMOUS_PASS.to_string(),
        format!("NICK {}", nick.to_lowercase()),
    ]
}

struct ActiveConnection {
    channel: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub struct TwitchIrcRelay {
    config: TwitchConfig,
    events: mpsc::UnboundedSender<RelayEvent>,
    active: Mutex<Option<ActiveConnection>>,
}

impl TwitchIrcRelay {
    pub fn new(config: TwitchConfig, events: mpsc::UnboundedSender<RelayEvent>) -> Self {
        Self {
            config,
            events,
            active: Mutex::new(None),
        }
    }

    /// Relay plus the receiving end of its event channel.
    pub fn with_channel(config: TwitchConfig) -> (Self, mpsc::UnboundedReceiver<RelayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(config, tx), rx)
    }

    async fn send_line(sink: &mut WsSink, line: String) -> Result<()> {
        sink.send(Message::Text(line))
            .await
            .map_err(|e| RcError::relay(format!("Failed to send to Twitch: {}", e)))
    }

    /// Reads until the server welcomes us (`001`), answering PINGs meanwhile.
    async fn wait_for_welcome(sink: &mut WsSink, stream: &mut WsSource) -> Result<()> {
        loop {
            let frame = stream
                .next()
                .await
                .ok_or_else(|| RcError::relay("Connection closed during login"))?
                .map_err(|e| RcError::relay(format!("Twitch connection error: {}", e)))?;

            let text = match frame {
                Message::Text(text) => text,
                Message::Close(_) => return Err(RcError::relay("Connection closed during login")),
                _ => continue,
            };

            for line in text.lines() {
                if let Some(parsed) = IrcLine::parse(line) {
                    match parsed.command.as_str() {
                        "001" => return Ok(()),
                        "NOTICE" => {
                            let notice = parsed.trailing.unwrap_or_default();
                            if notice.contains("Login") {
                                return Err(RcError::relay(notice));
                            }
                        }
                        _ => {}
                    }
                }
                if let LineAction::Reply(reply) = classify_line(line) {
                    Self::send_line(sink, reply).await?;
                }
            }
        }
    }
}

async fn run_connection(
    mut sink: WsSink,
    mut stream: WsSource,
    events: mpsc::UnboundedSender<RelayEvent>,
    mut shutdown: oneshot::Receiver<()>,
    channel: String,
) {
    'read: loop {
        tokio::select! {
            _ = &mut shutdown => {
                let _ = sink.send(Message::Text(format!("PART #{channel}"))).await;
                let _ = sink.close().await;
                return;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    for line in text.lines() {
                        match classify_line(line) {
                            LineAction::Reply(reply) => {
                                if let Err(e) = sink.send(Message::Text(reply)).await {
                                    tracing::warn!("[Twitch] Failed to answer PING: {}", e);
                                    break 'read;
                                }
                            }
                            LineAction::Chat(message) => {
                                let _ = events.send(RelayEvent::Message(message));
                            }
                            LineAction::Reconnect => {
                                tracing::info!("[Twitch] Server requested reconnect");
                                break 'read;
                            }
                            LineAction::Ignore => {}
                        }
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!("[Twitch] Connection closed by server: {:?}", frame);
                    break 'read;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("[Twitch] Read error: {}", e);
                    break 'read;
                }
                None => break 'read,
            }
        }
    }

    let _ = events.send(RelayEvent::Status(RelayStatus::Disconnected));
}

#[async_trait]
impl ChatRelay for TwitchIrcRelay {
    async fn connect(&self, channel: &str) -> Result<()> {
        self.disconnect().await?;

        tracing::info!("[Twitch] Connecting to {}", self.config.websocket_url);
        let (ws, _response) = connect_async(self.config.websocket_url.as_str())
            .await
            .map_err(|e| RcError::relay(format!("Could not reach Twitch: {}", e)))?;
        let (mut sink, mut stream) = ws.split();

        for line in login_lines(&self.config.nick) {
            Self::send_line(&mut sink, line).await?;
        }
        Self::wait_for_welcome(&mut sink, &mut stream).await?;
        Self::send_line(&mut sink, format!("JOIN #{}", channel.to_lowercase())).await?;

        // Reported before the reader starts so it precedes any message.
        let _ = self.events.send(RelayEvent::Status(RelayStatus::Connected));

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_connection(
            sink,
            stream,
            self.events.clone(),
            shutdown_rx,
            channel.to_string(),
        ));

        *self.active.lock().await = Some(ActiveConnection {
            channel: channel.to_string(),
            shutdown: shutdown_tx,
            task,
        });
        tracing::info!("[Twitch] Joined #{}", channel);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let Some(active) = self.active.lock().await.take() else {
            return Ok(());
        };
        // The task may already have ended on its own.
        let _ = active.shutdown.send(());
        if let Err(e) = active.task.await {
            tracing::warn!("[Twitch] Connection task ended abnormally: {}", e);
        }
        tracing::info!("[Twitch] Left #{}", active.channel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_gets_pong() {
        assert_eq!(
            classify_line("PING :tmi.twitch.tv"),
            LineAction::Reply("PONG :tmi.twitch.tv".to_string())
        );
    }

    #[test]
    fn test_privmsg_becomes_chat() {
        let line = "@badges=subscriber/12;bits=100;display-name=Ada :ada!ada@ada.tmi.twitch.tv PRIVMSG #streamer :cheer100 !pause";
        match classify_line(line) {
            LineAction::Chat(message) => {
                assert_eq!(message.username, "ada");
                assert_eq!(message.content, "cheer100 !pause");
                assert_eq!(message.tags.bits, Some(100));
            }
            other => panic!("expected chat, got {other:?}"),
        }
    }

    #[test]
    fn test_other_lines_ignored() {
        assert_eq!(
            classify_line(":tmi.twitch.tv 001 justinfan12345 :Welcome, GLHF!"),
            LineAction::Ignore
        );
        assert_eq!(classify_line(""), LineAction::Ignore);
        assert_eq!(classify_line(":tmi.twitch.tv RECONNECT"), LineAction::Reconnect);
    }

    #[test]
    fn test_login_lines() {
        let lines = login_lines("JustinFan999");
        assert_eq!(lines[0], "CAP REQ :twitch.tv/tags twitch.tv/commands");
        assert_eq!(lines[2], "NICK justinfan999");
    }
}
