//! In-process stand-in for the authority, speaking the line protocol over TCP.
//!
//! It keeps one game, answers `snapshot`/`move`/`reset`, broadcasts a
//! `game_update` after every change and echoes chat. Tests can inject raw lines
//! or swap the game silently through [`Control`].

#![allow(dead_code)]

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super_ttt::core::{GameState, MoveContext};
use super_ttt::sync::{encode_game, ClientMessage, LinkConfig};
use super_ttt::types::{Move, Side};

pub enum Control {
    /// Write this line to the connected client as-is.
    Push(String),
    /// Replace the authority's game without telling anyone.
    SetGame(GameState),
}

pub struct FakeAuthority {
    pub port: u16,
    pub control: mpsc::UnboundedSender<Control>,
    /// One message per client connection that ended.
    pub disconnected: mpsc::UnboundedReceiver<()>,
    task: JoinHandle<()>,
}

impl FakeAuthority {
    pub fn link_config(&self, poll_interval_ms: u64) -> LinkConfig {
        LinkConfig {
            host: "127.0.0.1".to_string(),
            port: self.port,
            poll_interval_ms,
            request_timeout_ms: 1000,
        }
    }

    pub fn push_game(&self, game: &GameState) {
        let line = json!({"type": "game_update", "game": encode_game(game)}).to_string();
        let _ = self.control.send(Control::Push(line));
    }
}

impl Drop for FakeAuthority {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn start_authority() -> FakeAuthority {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (control_tx, mut control_rx) = mpsc::unbounded_channel::<Control>();
    let (closed_tx, closed_rx) = mpsc::unbounded_channel::<()>();

    let task = tokio::spawn(async move {
        let mut game = GameState::new();
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let (read_half, mut writer) = stream.into_split();
            let mut lines = BufReader::new(read_half).lines();

            loop {
                tokio::select! {
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            for reply in respond(&mut game, &line) {
                                write_line(&mut writer, &reply).await;
                            }
                        }
                        _ => {
                            let _ = closed_tx.send(());
                            break;
                        }
                    },
                    Some(ctrl) = control_rx.recv() => match ctrl {
                        Control::Push(line) => write_line(&mut writer, &line).await,
                        Control::SetGame(g) => game = g,
                    },
                }
            }
        }
    });

    FakeAuthority {
        port,
        control: control_tx,
        disconnected: closed_rx,
        task,
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, line: &str) {
    let _ = writer.write_all(line.as_bytes()).await;
    let _ = writer.write_all(b"\n").await;
    let _ = writer.flush().await;
}

fn respond(game: &mut GameState, line: &str) -> Vec<String> {
    let Ok(msg) = serde_json::from_str::<ClientMessage>(line) else {
        return Vec::new();
    };
    let update = |game: &GameState| json!({"type": "game_update", "game": encode_game(game)}).to_string();

    match msg {
        ClientMessage::Snapshot { seq } => {
            vec![json!({"type": "snapshot", "seq": seq, "game": encode_game(game)}).to_string()]
        }
        ClientMessage::Move {
            seq,
            team,
            board,
            cell,
        } => {
            let side = Side::from_str(&team).unwrap_or(Side::X);
            match game.apply_move(side, Move { board, cell }, MoveContext::automated(0)) {
                Ok(()) => vec![
                    json!({"type": "move_result", "seq": seq, "success": true, "message": "", "game": encode_game(game)})
                        .to_string(),
                    update(game),
                ],
                Err(e) => vec![json!({"type": "move_result", "seq": seq, "success": false, "message": e.to_string()})
                    .to_string()],
            }
        }
        ClientMessage::Reset { seq } => {
            *game = GameState::new();
            vec![
                json!({"type": "reset_result", "seq": seq, "success": true, "game": encode_game(game)}).to_string(),
                update(game),
            ]
        }
        ClientMessage::ChatMessage {
            username, message, ..
        } => vec![json!({"type": "chat_message", "username": username, "message": message}).to_string()],
    }
}
