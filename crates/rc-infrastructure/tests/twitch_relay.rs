//! Drives `TwitchIrcRelay` against a local WebSocket server that speaks just
//! enough Twitch IRC.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use rc_core::bridge::{ChatRelay, RelayEvent, RelayStatus};
use rc_core::config::TwitchConfig;
use rc_infrastructure::TwitchIrcRelay;

const WAIT: Duration = Duration::from_secs(5);

/// Accepts one client, completes the login, then sends `script` lines.
/// Returns every line the client sent.
async fn fake_twitch(listener: TcpListener, script: Vec<&'static str>, close: bool) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();
    let mut received = Vec::new();

    // CAP, PASS, NICK
    while received.len() < 3 {
        if let Some(Ok(Message::Text(text))) = ws.next().await {
            received.push(text);
        }
    }
    ws.send(Message::Text(
        ":tmi.twitch.tv 001 justinfan12345 :Welcome, GLHF!".to_string(),
    ))
    .await
    .unwrap();

    // JOIN
    if let Some(Ok(Message::Text(text))) = ws.next().await {
        received.push(text);
    }

    for line in script {
        ws.send(Message::Text(line.to_string())).await.unwrap();
    }

    if close {
        // Wait for the PONG before hanging up.
        if let Ok(Some(Ok(Message::Text(text)))) = timeout(WAIT, ws.next()).await {
            received.push(text);
        }
        ws.close(None).await.ok();
    } else {
        while let Ok(Some(Ok(frame))) = timeout(WAIT, ws.next()).await {
            match frame {
                Message::Text(text) => received.push(text),
                Message::Close(_) => break,
                _ => {}
            }
        }
    }
    received
}

async fn start(
    script: Vec<&'static str>,
    close: bool,
) -> (
    TwitchIrcRelay,
    mpsc::UnboundedReceiver<RelayEvent>,
    tokio::task::JoinHandle<Vec<String>>,
) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(fake_twitch(listener, script, close));

    let config = TwitchConfig {
        websocket_url: format!("ws://{addr}"),
        nick: "justinfan12345".to_string(),
    };
    let (relay, events) = TwitchIrcRelay::with_channel(config);
    (relay, events, server)
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<RelayEvent>) -> RelayEvent {
    timeout(WAIT, events.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_login_join_and_chat_delivery() {
    let (relay, mut events, server) = start(
        vec![
            "@bits=150;subscriber=1;display-name=Ada :ada!ada@ada.tmi.twitch.tv PRIVMSG #streamer :Cheer150 !speed 2",
            "PING :tmi.twitch.tv",
        ],
        true,
    )
    .await;

    relay.connect("streamer").await.unwrap();
    assert_eq!(
        next_event(&mut events).await,
        RelayEvent::Status(RelayStatus::Connected)
    );

    match next_event(&mut events).await {
        RelayEvent::Message(message) => {
            assert_eq!(message.username, "ada");
            assert_eq!(message.content, "Cheer150 !speed 2");
            assert_eq!(message.tags.bits, Some(150));
            assert!(message.tags.subscriber);
        }
        other => panic!("expected chat message, got {other:?}"),
    }

    // Server hangs up after the PONG.
    assert_eq!(
        next_event(&mut events).await,
        RelayEvent::Status(RelayStatus::Disconnected)
    );

    let sent = server.await.unwrap();
    assert_eq!(sent[0], "CAP REQ :twitch.tv/tags twitch.tv/commands");
    assert!(sent[1].starts_with("PASS "));
    assert_eq!(sent[2], "NICK justinfan12345");
    assert_eq!(sent[3], "JOIN #streamer");
    assert_eq!(sent[4], "PONG :tmi.twitch.tv");
}

#[tokio::test]
async fn test_disconnect_parts_without_status_event() {
    let (relay, mut events, server) = start(Vec::new(), false).await;

    relay.connect("streamer").await.unwrap();
    assert_eq!(
        next_event(&mut events).await,
        RelayEvent::Status(RelayStatus::Connected)
    );

    relay.disconnect().await.unwrap();
    let sent = server.await.unwrap();
    assert!(sent.iter().any(|line| line == "PART #streamer"));

    assert!(
        timeout(Duration::from_millis(200), events.recv())
            .await
            .map(|event| event.is_none())
            .unwrap_or(true)
    );

    // Disconnecting again is a no-op.
    relay.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_server_fails_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = TwitchConfig {
        websocket_url: format!("ws://{addr}"),
        nick: "justinfan12345".to_string(),
    };
    let (relay, _events) = TwitchIrcRelay::with_channel(config);
    let err = relay.connect("streamer").await.unwrap_err();
    assert!(matches!(err, rc_core::RcError::Relay(_)));
}
