//! Game server transport.
//!
//! One JSON object per line in each direction, `{"event": name, "data": {...}}`,
//! using the same event names and payloads the game server emits.

use crate::core::channel::{ChannelError, MessageChannel};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events pushed by the game server
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Server accepted the socket; the client should join now
    Connected { session_id: String },
    GameMessage { message: String, kind: Option<String> },
    PlayerJoined { player_name: String },
    PlayerLeft { player_name: String },
    PlayerArrived { player_name: String },
    GameWon { player_name: String },
}

#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct ConnectedData {
    #[serde(default)]
    session_id: String,
}

#[derive(Deserialize)]
struct GameMessageData {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct PlayerData {
    player_name: String,
}

impl ServerEvent {
    /// Decode one wire line. `Ok(None)` for events this client has no use for.
    pub fn decode(line: &str) -> Result<Option<Self>> {
        let envelope: Envelope =
            serde_json::from_str(line).context("Malformed event envelope")?;

        let player = |data: serde_json::Value| -> Result<String> {
            let data: PlayerData =
                serde_json::from_value(data).context("Malformed player event")?;
            Ok(data.player_name)
        };

        let event = match envelope.event.as_str() {
            "connected" => {
                let data: ConnectedData = serde_json::from_value(envelope.data)
                    .context("Malformed connected event")?;
                ServerEvent::Connected {
                    session_id: data.session_id,
                }
            }
            "game_message" => {
                let data: GameMessageData = serde_json::from_value(envelope.data)
                    .context("Malformed game_message event")?;
                ServerEvent::GameMessage {
                    message: data.message,
                    kind: data.kind,
                }
            }
            "player_joined" => ServerEvent::PlayerJoined {
                player_name: player(envelope.data)?,
            },
            "player_left" => ServerEvent::PlayerLeft {
                player_name: player(envelope.data)?,
            },
            "player_arrived" => ServerEvent::PlayerArrived {
                player_name: player(envelope.data)?,
            },
            "game_won" => ServerEvent::GameWon {
                player_name: player(envelope.data)?,
            },
            other => {
                debug!("Ignoring unknown server event '{}'", other);
                return Ok(None);
            }
        };

        Ok(Some(event))
    }
}

/// Events sent to the game server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinGame { name: String, session_code: String },
    Command { command: String },
}

impl ClientEvent {
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode client event")
    }
}

/// What the transport task reports back to the controller loop
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Event(ServerEvent),
    Connected,
    Disconnected,
    /// The initial connect never succeeded
    ConnectFailed(String),
}

/// `MessageChannel` backed by the transport task's outbound queue.
///
/// Connection state is flipped by the controller loop when it sees
/// `ServerMessage::Connected`/`Disconnected`, never by the network task.
pub struct CommandSender {
    tx: mpsc::UnboundedSender<ClientEvent>,
    connected: bool,
}

impl CommandSender {
    pub fn new(tx: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self {
            tx,
            connected: false,
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Queue an arbitrary client event (join handshake)
    pub fn send_event(&mut self, event: ClientEvent) -> Result<(), ChannelError> {
        if !self.connected {
            return Err(ChannelError::NotConnected);
        }
        self.tx.send(event).map_err(|_| ChannelError::Closed)
    }
}

impl MessageChannel for CommandSender {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, command: &str) -> Result<(), ChannelError> {
        self.send_event(ClientEvent::Command {
            command: command.to_string(),
        })
    }
}

pub struct GameConnection;

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

impl GameConnection {
    pub async fn start(
        host: &str,
        port: u16,
        server_tx: mpsc::UnboundedSender<ServerMessage>,
        command_rx: mpsc::UnboundedReceiver<ClientEvent>,
    ) -> Result<()> {
        info!("Connecting to game server at {}:{}...", host, port);

        let stream = match TcpStream::connect(format!("{}:{}", host, port)).await {
            Ok(stream) => stream,
            Err(e) => {
                let _ = server_tx.send(ServerMessage::ConnectFailed(format!(
                    "Could not connect to {}:{}: {}",
                    host, port, e
                )));
                return Err(e).context("Failed to connect to game server");
            }
        };

        info!("Connected successfully");
        Self::run(stream, server_tx, command_rx).await
    }

    /// Drive an established connection until either side closes
    pub async fn run<S>(
        stream: S,
        server_tx: mpsc::UnboundedSender<ServerMessage>,
        mut command_rx: mpsc::UnboundedReceiver<ClientEvent>,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        let _ = server_tx.send(ServerMessage::Connected);

        // Spawn reader task
        let server_tx_clone = server_tx.clone();
        let read_handle = tokio::spawn(async move {
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        info!("Connection closed by server");
                        let _ = server_tx_clone.send(ServerMessage::Disconnected);
                        break;
                    }
                    Ok(_) => {
                        let line = line.trim_end_matches(&['\r', '\n']);
                        if line.is_empty() {
                            continue;
                        }
                        match ServerEvent::decode(line) {
                            Ok(Some(event)) => {
                                let _ = server_tx_clone.send(ServerMessage::Event(event));
                            }
                            Ok(None) => {}
                            Err(e) => warn!(error = ?e, "Dropping undecodable line: {}", line),
                        }
                    }
                    Err(e) => {
                        error!("Error reading from server: {}", e);
                        let _ = server_tx_clone.send(ServerMessage::Disconnected);
                        break;
                    }
                }
            }
        });

        // Writer loop runs until the controller drops its sender or the socket fails
        while let Some(event) = command_rx.recv().await {
            let line = match event.encode() {
                Ok(mut line) => {
                    line.push('\n');
                    line
                }
                Err(e) => {
                    error!(error = ?e, "Skipping unencodable event");
                    continue;
                }
            };
            debug!("Sending: {}", line.trim_end());
            if let Err(e) = write_line(&mut writer, &line).await {
                error!("Failed to write event: {}", e);
                // Reader may still be parked on a half-open socket
                read_handle.abort();
                let _ = server_tx.send(ServerMessage::Disconnected);
                return Ok(());
            }
        }

        // Wait for reader to finish
        let _ = read_handle.await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};
    use tokio::io::ReadBuf;
    use tokio::net::TcpListener;

    /// Socket that never delivers data and refuses every write
    struct BrokenPipe;

    impl AsyncRead for BrokenPipe {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Pending
        }
    }

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut TaskContext<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[test]
    fn test_decode_game_message() {
        let line = r#"{"event":"game_message","data":{"message":"Hello","type":"look"}}"#;
        assert_eq!(
            ServerEvent::decode(line).unwrap(),
            Some(ServerEvent::GameMessage {
                message: "Hello".to_string(),
                kind: Some("look".to_string()),
            })
        );
    }

    #[test]
    fn test_decode_game_message_without_type() {
        let line = r#"{"event":"game_message","data":{"message":"Hi"}}"#;
        match ServerEvent::decode(line).unwrap() {
            Some(ServerEvent::GameMessage { kind, .. }) => assert_eq!(kind, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_player_events() {
        let line = r#"{"event":"game_won","data":{"player_name":"Ghost"}}"#;
        assert_eq!(
            ServerEvent::decode(line).unwrap(),
            Some(ServerEvent::GameWon {
                player_name: "Ghost".to_string()
            })
        );
        let line = r#"{"event":"connected","data":{"session_id":"abc"}}"#;
        assert_eq!(
            ServerEvent::decode(line).unwrap(),
            Some(ServerEvent::Connected {
                session_id: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_decode_unknown_and_malformed() {
        assert_eq!(
            ServerEvent::decode(r#"{"event":"weather","data":{}}"#).unwrap(),
            None
        );
        assert!(ServerEvent::decode("not json").is_err());
        assert!(ServerEvent::decode(r#"{"event":"player_left","data":{}}"#).is_err());
    }

    #[test]
    fn test_encode_client_events() {
        let join = ClientEvent::JoinGame {
            name: "Ghost".to_string(),
            session_code: "abc123".to_string(),
        };
        let value: serde_json::Value = serde_json::from_str(&join.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"event": "join_game", "data": {"name": "Ghost", "session_code": "abc123"}})
        );

        let cmd = ClientEvent::Command {
            command: "go north".to_string(),
        };
        let value: serde_json::Value = serde_json::from_str(&cmd.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"event": "command", "data": {"command": "go north"}})
        );
    }

    #[test]
    fn test_command_sender_refuses_while_disconnected() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sender = CommandSender::new(tx);

        assert_eq!(sender.send("look"), Err(ChannelError::NotConnected));
        sender.set_connected(true);
        assert_eq!(sender.send("look"), Ok(()));
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::Command {
                command: "look".to_string()
            }
        );

        drop(rx);
        assert_eq!(sender.send("look"), Err(ChannelError::Closed));
    }

    #[tokio::test]
    async fn test_connection_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = tokio::io::split(socket);
            write
                .write_all(b"{\"event\":\"game_message\",\"data\":{\"message\":\"Boo\",\"type\":\"info\"}}\n")
                .await
                .unwrap();
            let mut lines = BufReader::new(read).lines();
            let received = lines.next_line().await.unwrap().unwrap();
            drop(write);
            received
        });

        let (server_tx, mut server_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let client = tokio::spawn(async move {
            GameConnection::start("127.0.0.1", port, server_tx, command_rx).await
        });

        assert_eq!(server_rx.recv().await, Some(ServerMessage::Connected));
        assert_eq!(
            server_rx.recv().await,
            Some(ServerMessage::Event(ServerEvent::GameMessage {
                message: "Boo".to_string(),
                kind: Some("info".to_string()),
            }))
        );

        command_tx
            .send(ClientEvent::Command {
                command: "look".to_string(),
            })
            .unwrap();
        let received = server.await.unwrap();
        assert_eq!(received, r#"{"event":"command","data":{"command":"look"}}"#);

        assert_eq!(server_rx.recv().await, Some(ServerMessage::Disconnected));
        drop(command_tx);
        client.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_failed_connect_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (server_tx, mut server_rx) = mpsc::unbounded_channel();
        let (_command_tx, command_rx) = mpsc::unbounded_channel();
        let result = GameConnection::start("127.0.0.1", port, server_tx, command_rx).await;

        assert!(result.is_err());
        match server_rx.recv().await {
            Some(ServerMessage::ConnectFailed(reason)) => {
                assert!(reason.starts_with(&format!("Could not connect to 127.0.0.1:{}", port)))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_failure_reports_disconnect() {
        let (server_tx, mut server_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        command_tx
            .send(ClientEvent::Command {
                command: "look".to_string(),
            })
            .unwrap();

        // Sender stays alive, so only the failed write can end the loop
        GameConnection::run(BrokenPipe, server_tx, command_rx)
            .await
            .unwrap();

        assert_eq!(server_rx.recv().await, Some(ServerMessage::Connected));
        assert_eq!(server_rx.recv().await, Some(ServerMessage::Disconnected));
        drop(command_tx);
    }
}
