//! Link module - one connection lifetime to the authority
//!
//! The link driver runs as a single tokio task. It owns the TCP connection,
//! correlates requests with responses by `seq`, polls snapshots on a fixed
//! interval and turns everything the authority says into [`SyncEvent`]s for the
//! session. The session talks to it only through a [`LinkHandle`].
//!
//! Push updates, poll snapshots and move results all become the same
//! wholesale-replace event, so the two feeds are idempotent with respect to
//! each other.

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::core::GameState;
use crate::error::SyncError;
use crate::protocol::*;
use crate::types::{Move, Side, POLL_INTERVAL_MS};

/// Link configuration
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub host: String,
    pub port: u16,
    pub poll_interval_ms: u64,
    /// Connect timeout and maximum wait for a response.
    pub request_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            poll_interval_ms: POLL_INTERVAL_MS,
            request_timeout_ms: 3000,
        }
    }
}

impl LinkConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("STTT_AUTHORITY_HOST").unwrap_or(defaults.host);
        let port = env::var("STTT_AUTHORITY_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let poll_interval_ms = env::var("STTT_POLL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.poll_interval_ms);
        let request_timeout_ms = env::var("STTT_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.request_timeout_ms);

        Self {
            host,
            port,
            poll_interval_ms,
            request_timeout_ms,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

/// Command from the session to the link.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncCommand {
    FetchSnapshot,
    /// `ticket` is chosen by the session and comes back on the move's outcome.
    SubmitMove { ticket: u64, side: Side, mv: Move },
    Reset,
    Chat { side: Side, text: String },
}

/// Which feed produced a mirror replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorSource {
    Snapshot,
    Push,
    /// An accepted move. `ticket` is `None` when the answer arrived after the
    /// request had already been given up on.
    MoveResult { ticket: Option<u64> },
    Reset,
}

/// Event delivered from the link to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// Replace the mirror wholesale.
    Replace { state: GameState, source: MirrorSource },
    /// The authority refused a submitted move.
    MoveRejected { ticket: Option<u64>, reason: String },
    /// A submitted move got no usable answer (connection lost, timeout, bad payload).
    MoveFailed { ticket: Option<u64>, reason: String },
    /// The authority is unreachable; the mirror may be stale.
    Degraded { reason: String },
    Chat { sender: String, text: String },
}

/// Session-side end of a link.
///
/// Dropping the handle cancels the link: the driver task is aborted, which also
/// stops the poll timer and closes the connection.
pub struct LinkHandle {
    cmd_tx: mpsc::UnboundedSender<SyncCommand>,
    event_rx: mpsc::UnboundedReceiver<SyncEvent>,
    task: Option<JoinHandle<()>>,
}

impl LinkHandle {
    pub fn new(
        cmd_tx: mpsc::UnboundedSender<SyncCommand>,
        event_rx: mpsc::UnboundedReceiver<SyncEvent>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            cmd_tx,
            event_rx,
            task,
        }
    }

    /// Queue a command; returns false once the link is gone.
    pub fn send(&self, cmd: SyncCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    pub fn try_recv(&mut self) -> Option<SyncEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl Drop for LinkHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Far end of a link: what a driver (or a test) reads commands from and writes events to.
pub struct LinkPeer {
    pub cmd_rx: mpsc::UnboundedReceiver<SyncCommand>,
    pub event_tx: mpsc::UnboundedSender<SyncEvent>,
}

/// Build a connected handle/peer pair with no driver task attached.
pub fn link_pair() -> (LinkHandle, LinkPeer) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    (
        LinkHandle::new(cmd_tx, event_rx, None),
        LinkPeer { cmd_rx, event_tx },
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Snapshot,
    Move { ticket: u64 },
    Reset,
}

impl RequestKind {
    fn ticket(self) -> Option<u64> {
        match self {
            RequestKind::Move { ticket } => Some(ticket),
            RequestKind::Snapshot | RequestKind::Reset => None,
        }
    }
}

#[derive(Debug)]
struct Pending {
    kind: RequestKind,
    sent_at: Instant,
}

#[derive(Debug)]
enum Wire {
    Line { conn: u64, line: String },
    Closed { conn: u64, reason: String },
}

/// Run a link until the session drops its handle.
pub async fn run_link(
    config: LinkConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<SyncCommand>,
    event_tx: mpsc::UnboundedSender<SyncEvent>,
) {
    let (wire_tx, mut wire_rx) = mpsc::unbounded_channel::<Wire>();
    let period = config.poll_interval();
    let mut driver = LinkDriver::new(config, event_tx, wire_tx);

    // Mode entry: fetch right away, then poll.
    driver.request(RequestKind::Snapshot).await;

    let mut poll = tokio::time::interval_at(Instant::now() + period, period);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => driver.handle_command(cmd).await,
                None => break,
            },
            Some(wire) = wire_rx.recv() => driver.handle_wire(wire),
            _ = poll.tick() => driver.on_poll_tick().await,
        }
    }

    log::debug!("[Link] session closed the link to {}", driver.config.address());
}

struct LinkDriver {
    config: LinkConfig,
    event_tx: mpsc::UnboundedSender<SyncEvent>,
    wire_tx: mpsc::UnboundedSender<Wire>,
    writer: Option<OwnedWriteHalf>,
    reader_task: Option<JoinHandle<()>>,
    conn_id: u64,
    next_seq: u64,
    pending: HashMap<u64, Pending>,
}

impl LinkDriver {
    fn new(
        config: LinkConfig,
        event_tx: mpsc::UnboundedSender<SyncEvent>,
        wire_tx: mpsc::UnboundedSender<Wire>,
    ) -> Self {
        Self {
            config,
            event_tx,
            wire_tx,
            writer: None,
            reader_task: None,
            conn_id: 0,
            next_seq: 1,
            pending: HashMap::new(),
        }
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.event_tx.send(event);
    }

    fn degrade(&self, err: &SyncError) {
        log::warn!("[Link] {}", err);
        self.emit(SyncEvent::Degraded {
            reason: err.to_string(),
        });
    }

    async fn handle_command(&mut self, cmd: SyncCommand) {
        match cmd {
            SyncCommand::FetchSnapshot => self.request(RequestKind::Snapshot).await,
            SyncCommand::Reset => self.request(RequestKind::Reset).await,
            SyncCommand::SubmitMove { ticket, side, mv } => {
                let seq = self.take_seq();
                let kind = RequestKind::Move { ticket };
                self.send_tracked(seq, kind, create_move(seq, side, mv)).await;
            }
            SyncCommand::Chat { side, text } => {
                let seq = self.take_seq();
                if let Err(e) = self.send(&create_chat(seq, side, &text)).await {
                    self.degrade(&e);
                }
            }
        }
    }

    async fn request(&mut self, kind: RequestKind) {
        let seq = self.take_seq();
        let msg = match kind {
            RequestKind::Snapshot => create_snapshot_request(seq),
            RequestKind::Reset => create_reset(seq),
            RequestKind::Move { .. } => return,
        };
        self.send_tracked(seq, kind, msg).await;
    }

    async fn send_tracked(&mut self, seq: u64, kind: RequestKind, msg: ClientMessage) {
        self.pending.insert(
            seq,
            Pending {
                kind,
                sent_at: Instant::now(),
            },
        );
        if let Err(e) = self.send(&msg).await {
            self.pending.remove(&seq);
            self.fail(kind, &e);
        }
    }

    fn fail(&self, kind: RequestKind, err: &SyncError) {
        match kind {
            RequestKind::Move { ticket } => {
                log::warn!("[Link] move submission failed: {}", err);
                self.emit(SyncEvent::MoveFailed {
                    ticket: Some(ticket),
                    reason: err.to_string(),
                });
            }
            RequestKind::Snapshot | RequestKind::Reset => self.degrade(err),
        }
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<(), SyncError> {
        self.ensure_connected().await?;

        let mut line = serde_json::to_vec(msg).map_err(|e| SyncError::Connectivity(e.to_string()))?;
        line.push(b'\n');

        let result = match self.writer.as_mut() {
            Some(writer) => match writer.write_all(&line).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            },
            None => return Err(SyncError::Connectivity("not connected".to_string())),
        };

        if let Err(e) = result {
            self.disconnect();
            return Err(e.into());
        }
        Ok(())
    }

    async fn ensure_connected(&mut self) -> Result<(), SyncError> {
        if self.writer.is_some() {
            return Ok(());
        }

        let addr = self.config.address();
        let stream = tokio::time::timeout(self.config.request_timeout(), TcpStream::connect(&addr))
            .await
            .map_err(|_| SyncError::Connectivity(format!("connect to {addr} timed out")))??;
        let (read_half, write_half) = stream.into_split();

        self.conn_id += 1;
        let conn = self.conn_id;
        let wire_tx = self.wire_tx.clone();
        self.reader_task = Some(tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            let reason = loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if wire_tx.send(Wire::Line { conn, line }).is_err() {
                            return;
                        }
                    }
                    Ok(None) => break "authority closed the connection".to_string(),
                    Err(e) => break e.to_string(),
                }
            };
            let _ = wire_tx.send(Wire::Closed { conn, reason });
        }));
        self.writer = Some(write_half);

        log::info!("[Link] connected to authority at {}", addr);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.writer = None;
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }

    fn handle_wire(&mut self, wire: Wire) {
        match wire {
            Wire::Line { conn, line } if conn == self.conn_id => self.handle_line(&line),
            Wire::Closed { conn, reason } if conn == self.conn_id => {
                self.disconnect();
                let err = SyncError::Connectivity(reason);
                let lost: Vec<u64> = self
                    .pending
                    .drain()
                    .filter_map(|(_, p)| p.kind.ticket())
                    .collect();
                for ticket in lost {
                    self.emit(SyncEvent::MoveFailed {
                        ticket: Some(ticket),
                        reason: err.to_string(),
                    });
                }
                self.degrade(&err);
            }
            // Leftovers from a connection that has since been replaced.
            Wire::Line { .. } | Wire::Closed { .. } => {}
        }
    }

    fn handle_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        let msg = match parse_authority_line(line) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("[Link] ignoring unparseable message: {}", e);
                return;
            }
        };

        let ticket = msg
            .seq()
            .and_then(|seq| self.pending.remove(&seq))
            .and_then(|p| p.kind.ticket());

        match msg {
            AuthorityMessage::GameUpdate { game } => self.replace(&game, MirrorSource::Push),
            AuthorityMessage::Snapshot { game, .. } => self.replace(&game, MirrorSource::Snapshot),
            AuthorityMessage::MoveResult {
                success,
                message,
                game,
                ..
            } => {
                if !success {
                    log::info!("[Link] move rejected: {}", message);
                    self.emit(SyncEvent::MoveRejected {
                        ticket,
                        reason: message,
                    });
                    return;
                }
                match game.as_ref().map(decode_game) {
                    Some(Ok(state)) => self.emit(SyncEvent::Replace {
                        state,
                        source: MirrorSource::MoveResult { ticket },
                    }),
                    Some(Err(e)) => {
                        log::warn!("[Link] move result carried {}", e);
                        self.emit(SyncEvent::MoveFailed {
                            ticket,
                            reason: e.to_string(),
                        });
                    }
                    None => {
                        log::warn!("[Link] move result without a game");
                        self.emit(SyncEvent::MoveFailed {
                            ticket,
                            reason: "move result without a game".to_string(),
                        });
                    }
                }
            }
            AuthorityMessage::ResetResult { success, game, .. } => match game {
                Some(game) if success => self.replace(&game, MirrorSource::Reset),
                _ => log::warn!("[Link] reset was not applied by the authority"),
            },
            AuthorityMessage::ChatMessage { username, message } => self.emit(SyncEvent::Chat {
                sender: username,
                text: message,
            }),
        }
    }

    fn replace(&self, game: &serde_json::Value, source: MirrorSource) {
        match decode_game(game) {
            Ok(state) => self.emit(SyncEvent::Replace { state, source }),
            Err(e) => log::warn!("[Link] dropping {:?} payload: {}", source, e),
        }
    }

    async fn on_poll_tick(&mut self) {
        let timeout = self.config.request_timeout();
        let expired: Vec<(u64, RequestKind)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.sent_at.elapsed() >= timeout)
            .map(|(seq, p)| (*seq, p.kind))
            .collect();
        for (seq, kind) in expired {
            self.pending.remove(&seq);
            self.fail(kind, &SyncError::Timeout { seq });
        }

        // One outstanding snapshot at a time; the next tick retries.
        if self
            .pending
            .values()
            .any(|p| p.kind == RequestKind::Snapshot)
        {
            return;
        }
        self.request(RequestKind::Snapshot).await;
    }
}

impl Drop for LinkDriver {
    fn drop(&mut self) {
        self.disconnect();
    }
}
