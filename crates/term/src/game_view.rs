//! GameView: maps a `GameState` plus session status into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameState;
use crate::engine::{ModeKind, SessionStatus};
use crate::fb::{FrameBuffer, Rgb, Style};
use crate::types::{BoardStatus, Move, NextBoard, Side};

/// Terminal columns per cell (" X ").
const CELL_W: u16 = 3;
/// Nine cells plus two sub-board separators.
pub const GRID_W: u16 = 9 * CELL_W + 2;
pub const GRID_H: u16 = 9 + 2;

const TITLE: &str = "SUPER TIC-TAC-TOE";

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Everything besides the board that the game screen shows.
#[derive(Debug, Clone, Copy)]
pub struct HudView<'a> {
    pub status: SessionStatus,
    pub cursor: Option<Move>,
    /// Most recent notices, oldest first.
    pub log: &'a [String],
    /// Chat line being composed, if any.
    pub prompt: Option<&'a str>,
}

fn side_color(side: Side) -> Rgb {
    match side {
        Side::X => Rgb::new(235, 95, 95),
        Side::O => Rgb::new(95, 160, 235),
    }
}

/// Screen offset of a cell from the grid's top-left corner.
pub fn cell_offset(mv: Move) -> (u16, u16) {
    let row = (mv.board / 3) as u16 * 3 + (mv.cell / 3) as u16;
    let col = (mv.board % 3) as u16 * 3 + (mv.cell % 3) as u16;
    (col * CELL_W + col / 3, row + row / 3)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GameView;

impl GameView {
    /// Landing screen: pick a side for online play or play the AI.
    pub fn render_landing(&self, preferred: Option<Side>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);

        let lines = [
            "x  play online as X",
            "o  play online as O",
            "a  play against the AI as X",
            "A  play against the AI as O",
            "q  quit",
        ];
        let x = viewport.width.saturating_sub(GRID_W) / 2;
        let y = viewport.height.saturating_sub(lines.len() as u16 + 4) / 2;

        fb.put_str(x, y, TITLE, Style::default().bold());
        for (i, line) in lines.iter().enumerate() {
            fb.put_str(x, y + 2 + i as u16, line, Style::default());
        }
        if let Some(side) = preferred {
            let hint = format!("last played online as {}", side.as_str());
            fb.put_str(x, y + 3 + lines.len() as u16, &hint, Style::default().dim());
        }
    }

    /// Game screen: the nine sub-boards, then status, notices and key help.
    pub fn render_game(&self, state: &GameState, hud: &HudView<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);

        let x0 = viewport.width.saturating_sub(GRID_W) / 2;
        let y0 = 2;

        fb.put_str(x0, 0, TITLE, Style::default().bold());
        self.draw_separators(fb, x0, y0);
        for board in 0..9u8 {
            self.draw_board(fb, state, board, hud.cursor, x0, y0);
        }

        let mut y = y0 + GRID_H + 1;
        for line in status_lines(state, &hud.status) {
            fb.put_str(x0, y, &line, Style::default());
            y += 1;
        }

        y += 1;
        for line in hud.log.iter().rev().take(4).rev() {
            fb.put_str(x0, y, line, Style::fg(Rgb::new(230, 200, 120)));
            y += 1;
        }

        let bottom = viewport.height.saturating_sub(1);
        if let Some(text) = hud.prompt {
            let line = format!("say: {text}_");
            fb.put_str(x0, bottom.saturating_sub(1), &line, Style::default().bold());
        }

        let help = "arrows/hjkl move  enter place  t chat  r reset  b back  q quit";
        fb.put_str(x0, bottom, help, Style::default().dim());
    }

    fn draw_separators(&self, fb: &mut FrameBuffer, x0: u16, y0: u16) {
        let style = Style::fg(Rgb::new(120, 120, 130));
        for i in [1u16, 2] {
            let sx = x0 + i * (3 * CELL_W + 1) - 1;
            let sy = y0 + i * 4 - 1;
            for dy in 0..GRID_H {
                fb.put_char(sx, y0 + dy, '│', style);
            }
            for dx in 0..GRID_W {
                fb.put_char(x0 + dx, sy, '─', style);
            }
        }
        for ix in [1u16, 2] {
            for iy in [1u16, 2] {
                fb.put_char(x0 + ix * (3 * CELL_W + 1) - 1, y0 + iy * 4 - 1, '┼', style);
            }
        }
    }

    fn draw_board(
        &self,
        fb: &mut FrameBuffer,
        state: &GameState,
        board: u8,
        cursor: Option<Move>,
        x0: u16,
        y0: u16,
    ) {
        let status = state.status_of(board).unwrap_or_default();
        let playable = !state.game_over() && status.is_open() && state.next_board().allows(board);

        let bg = match status {
            BoardStatus::Won(side) => {
                let c = side_color(side);
                Rgb::new(c.r / 4, c.g / 4, c.b / 4)
            }
            BoardStatus::Draw => Rgb::new(25, 25, 25),
            BoardStatus::Open if playable => Rgb::new(30, 55, 35),
            BoardStatus::Open => Rgb::new(0, 0, 0),
        };

        for cell in 0..9u8 {
            let mv = Move { board, cell };
            let (dx, dy) = cell_offset(mv);
            let mark = state.cell(board, cell).flatten();

            let mut style = match mark {
                Some(side) => Style::fg(side_color(side)).bold(),
                None => Style::fg(Rgb::new(90, 90, 90)),
            }
            .on(bg);
            if !status.is_open() {
                style = style.dim();
            }
            if cursor == Some(mv) {
                style = style.on(Rgb::new(80, 80, 150));
            }

            let ch = mark.map(|s| if s == Side::X { 'X' } else { 'O' }).unwrap_or('·');
            fb.fill_rect(x0 + dx, y0 + dy, CELL_W, 1, ' ', style);
            fb.put_char(x0 + dx + 1, y0 + dy, ch, style);
        }
    }
}

/// Status text under the board.
pub fn status_lines(state: &GameState, status: &SessionStatus) -> Vec<String> {
    let mut lines = Vec::new();

    let side = status.side.map(|s| s.as_str()).unwrap_or("?");
    lines.push(match status.mode {
        Some(ModeKind::Remote) => format!("Online as {side}"),
        Some(ModeKind::Local) => format!("Playing the AI as {side}"),
        None => "Not playing".to_string(),
    });

    lines.push(if state.game_over() {
        match state.winner() {
            Some(winner) => format!("Game over: {} wins", winner.as_str()),
            None => "Game over: draw".to_string(),
        }
    } else {
        match state.next_board() {
            NextBoard::Any => "Next board: any".to_string(),
            NextBoard::Board(b) => format!("Next board: {}", b + 1),
        }
    });

    if status.degraded {
        lines.push("Authority unreachable, showing last known game".to_string());
    }
    if status.awaiting_authority {
        lines.push("Waiting for the authority...".to_string());
    }
    if status.ai_thinking {
        lines.push("AI is thinking...".to_string());
    }
    if status.cooldown_remaining_ms > 0 {
        lines.push(format!(
            "Next move in {:.1}s",
            status.cooldown_remaining_ms as f64 / 1000.0
        ));
    } else if let Some(remaining) = state.time_remaining_secs().filter(|t| *t > 0.0) {
        lines.push(format!("Authority timer: {remaining:.1}s"));
    }

    lines
}
