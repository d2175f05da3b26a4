//! Terminal Super Tic-Tac-Toe runner (default binary).
//!
//! Landing screen first: `x`/`o` joins the authority as that side, `a` plays
//! the local AI as X and `A` as O. A side chosen for online play is remembered
//! and resumed on the next start. In online play `t` opens a chat line.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};

use super_ttt::engine::{ModeKind, MoveOutcome, Notice, Session, SessionConfig, SidePreference};
use super_ttt::input::{handle_key_event, ChatEdit, ChatLine, Cursor, UiCommand};
use super_ttt::sync::SyncRuntime;
use super_ttt::term::{FrameBuffer, GameView, HudView, TerminalRenderer, Viewport};
use super_ttt::types::{Move, NextBoard, CENTER_CELL, TICK_MS};

/// Notices kept on screen.
const LOG_LINES: usize = 20;

/// Appends log records to a file; the terminal belongs to the renderer.
struct FileLogger {
    file: Mutex<File>,
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("STTT_LOG_PATH") else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {path}"))?;
    log::set_boxed_logger(Box::new(FileLogger {
        file: Mutex::new(file),
    }))
    .context("logger already installed")?;
    log::set_max_level(log::LevelFilter::Info);
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let runtime = SyncRuntime::from_env()?;
    let config = SessionConfig::from_env();
    let prefs = SidePreference::new(config.prefs_path.clone());
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(1);
    let mut session = Session::new(runtime, config, seed);

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session, &prefs);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, session: &mut Session<SyncRuntime>, prefs: &SidePreference) -> Result<()> {
    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_millis() as u64;

    if let Some(side) = prefs.load() {
        log::info!("resuming online play as {}", side.as_str());
        session.enter_remote(side);
    }

    let view = GameView;
    let mut fb = FrameBuffer::new(0, 0);
    let mut cursor = Cursor::default();
    let mut messages: Vec<String> = Vec::new();
    let mut chat: Option<ChatLine> = None;
    let tick = Duration::from_millis(TICK_MS);
    let mut last_tick = Instant::now();

    loop {
        session.tick(now_ms());
        for notice in session.drain_notices() {
            if let Notice::AiMoved(mv) = &notice {
                cursor = focus_next_board(session, *mv);
            }
            messages.push(describe(&notice));
        }
        if messages.len() > LOG_LINES {
            messages.drain(..messages.len() - LOG_LINES);
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        match session.displayed() {
            Some(state) => {
                let hud = HudView {
                    status: session.status(now_ms()),
                    cursor: Some(cursor.to_move()),
                    log: &messages,
                    prompt: chat.as_ref().map(ChatLine::text),
                };
                view.render_game(state, &hud, viewport, &mut fb);
            }
            None => view.render_landing(prefs.load(), viewport, &mut fb),
        }
        term.draw(&fb)?;

        let timeout = tick.checked_sub(last_tick.elapsed()).unwrap_or_default();
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(line) = chat.as_mut() {
                        match line.handle_key(key) {
                            ChatEdit::Editing => {}
                            ChatEdit::Send(text) => {
                                chat = None;
                                if !text.trim().is_empty() && !session.send_chat(&text) {
                                    messages.push("Chat not sent".to_string());
                                }
                            }
                            ChatEdit::Cancel => chat = None,
                        }
                        continue;
                    }
                    let Some(cmd) = handle_key_event(key) else {
                        continue;
                    };
                    let now = now_ms();
                    match cmd {
                        UiCommand::Quit => return Ok(()),
                        UiCommand::CursorUp
                        | UiCommand::CursorDown
                        | UiCommand::CursorLeft
                        | UiCommand::CursorRight => cursor.apply(cmd),
                        UiCommand::Place => {
                            if let MoveOutcome::Submitted = session.submit_move(cursor.to_move(), now) {
                                log::debug!("move {:?} sent to the authority", cursor.to_move());
                            }
                        }
                        UiCommand::Reset => {
                            session.reset(now);
                        }
                        UiCommand::PlayRemote(side) => {
                            messages.clear();
                            session.enter_remote(side);
                            if let Err(e) = prefs.store(side) {
                                log::warn!("{e:#}");
                            }
                        }
                        UiCommand::PlayAi(side) => {
                            messages.clear();
                            session.enter_local(side, now);
                        }
                        UiCommand::Chat => {
                            if session.mode() == Some(ModeKind::Remote) {
                                chat = Some(ChatLine::new());
                            }
                        }
                        UiCommand::Back => {
                            messages.clear();
                            chat = None;
                            session.leave();
                            if let Err(e) = prefs.clear() {
                                log::warn!("{e:#}");
                            }
                        }
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
        }
    }
}

/// Put the cursor on the centre of the board the player must use next.
fn focus_next_board(session: &Session<SyncRuntime>, fallback: Move) -> Cursor {
    let board = match session.displayed().map(|s| s.next_board()) {
        Some(NextBoard::Board(b)) => b,
        _ => fallback.cell,
    };
    Cursor::from_move(Move {
        board,
        cell: CENTER_CELL,
    })
}

fn describe(notice: &Notice) -> String {
    match notice {
        Notice::Rejected(reason) => reason.clone(),
        Notice::MoveFailed(reason) => format!("Move not delivered: {reason}"),
        Notice::Degraded(reason) => format!("Connection problem: {reason}"),
        Notice::Restored => "Connection restored".to_string(),
        Notice::AiMoved(mv) => format!("AI played board {} cell {}", mv.board + 1, mv.cell + 1),
        Notice::Chat { sender, text } => format!("{sender}: {text}"),
    }
}
