//! Layout and drawing: playfield, sidebar (next, score, keys), start, pause and game over overlays.

use crate::highscores::HighScoreStore;
use crate::pieces::{self, Block as PieceBlock};
use crate::session::{Phase, Session};
use crate::theme::Theme;
use rand::Rng;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Terminal columns per board cell, so cells look roughly square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 22;
/// Game-over fade of the board, in ms.
pub const GAME_OVER_FADE_MS: u32 = 500;

/// Next preview box: border + title + one mask.
const NEXT_HEIGHT: u16 = 2 + 1 + pieces::MASK_SIZE as u16;
const STATS_HEIGHT: u16 = 2 + 4;
const KEYS_HEIGHT: u16 = 2 + 5;

/// Outer size (border included) of a board with the given dimensions. Saturates at
/// `u16::MAX`, which no terminal reaches.
pub fn playfield_size(rows: usize, cols: usize) -> (u16, u16) {
    let rows = u16::try_from(rows).unwrap_or(u16::MAX);
    let cols = u16::try_from(cols).unwrap_or(u16::MAX);
    (
        cols.saturating_mul(CELL_WIDTH).saturating_add(2),
        rows.saturating_add(2),
    )
}

/// Smallest terminal that fits the board and sidebar.
pub fn required_terminal_size(rows: usize, cols: usize) -> (u16, u16) {
    let (pw, ph) = playfield_size(rows, cols);
    let sidebar_h = NEXT_HEIGHT + STATS_HEIGHT + KEYS_HEIGHT;
    (pw.saturating_add(SIDEBAR_WIDTH), ph.max(sidebar_h))
}

/// Game-over fade, created on the first game-over frame and dropped on restart.
#[derive(Default)]
pub struct GameOverFade {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl GameOverFade {
    pub fn reset(&mut self) {
        self.effect = None;
        self.last_process = None;
    }

    /// True once the fade has played out (or never started).
    pub fn is_done(&self) -> bool {
        self.effect.as_ref().is_none_or(Effect::done)
    }

    fn render(&mut self, frame: &mut Frame, theme: &Theme, area: Rect, now: Instant) {
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        self.last_process = Some(now);

        let effect = self.effect.get_or_insert_with(|| {
            fx::fade_to(
                theme.inactive_fg,
                theme.bg,
                (GAME_OVER_FADE_MS, Interpolation::Linear),
            )
            .with_area(area)
        });
        frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
    }
}

/// Draw the current session: board and sidebar, then the overlay for the phase.
pub fn draw<R: Rng, S: HighScoreStore>(
    frame: &mut Frame,
    session: &Session<R, S>,
    theme: &Theme,
    fade: &mut GameOverFade,
    now: Instant,
) {
    let area = frame.area();
    let board = session.grid().board();
    let (need_w, need_h) = required_terminal_size(board.rows(), board.cols());
    if area.width < need_w || area.height < need_h {
        draw_too_small(frame, theme, area, (need_w, need_h));
        return;
    }

    let (playfield_area, sidebar_area) = game_layout(area, board.rows(), board.cols());
    draw_playfield(frame.buffer_mut(), session, theme, playfield_area);
    draw_sidebar(frame.buffer_mut(), session, theme, sidebar_area);

    match session.phase() {
        Phase::NewGame => draw_start_overlay(frame.buffer_mut(), theme, playfield_area),
        Phase::Playing => {}
        Phase::Paused => draw_pause_overlay(frame.buffer_mut(), theme, playfield_area),
        Phase::GameOver { final_score } => {
            fade.render(frame, theme, playfield_area, now);
            draw_game_over(
                frame.buffer_mut(),
                theme,
                playfield_area,
                final_score,
                session.score().high_score(),
                fade.is_done(),
            );
        }
    }
}

/// Board + sidebar centred in `area`.
fn game_layout(area: Rect, rows: usize, cols: usize) -> (Rect, Rect) {
    let (pw, ph) = playfield_size(rows, cols);
    let (total_w, total_h) = required_terminal_size(rows, cols);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let playfield = Rect {
        height: ph.min(inner[0].height),
        ..inner[0]
    };
    (playfield, inner[1])
}

fn border(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn paint_cell(buf: &mut Buffer, origin: Rect, row: i32, col: i32, color: Color) {
    let (Ok(row), Ok(col)) = (u16::try_from(row), u16::try_from(col)) else {
        return;
    };
    if col >= origin.width / CELL_WIDTH || row >= origin.height {
        return;
    }
    let x = origin.x + col * CELL_WIDTH;
    let y = origin.y + row;
    buf.set_string(x, y, "██", Style::default().fg(color).bg(color));
}

fn draw_playfield<R: Rng, S: HighScoreStore>(
    buf: &mut Buffer,
    session: &Session<R, S>,
    theme: &Theme,
    area: Rect,
) {
    let block = border(theme).title(Span::styled(" Blockfall ", Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, buf);

    buf.set_style(inner, Style::default().bg(theme.bg));
    for PieceBlock { row, col, color } in session.grid().settled_blocks() {
        paint_cell(buf, inner, row, col, theme.piece_color(color));
    }

    if matches!(session.phase(), Phase::Playing | Phase::Paused) {
        for PieceBlock { row, col, color } in session.grid().current_tile_blocks() {
            paint_cell(buf, inner, row, col, theme.piece_color(color));
        }
    }
}

fn draw_sidebar<R: Rng, S: HighScoreStore>(
    buf: &mut Buffer,
    session: &Session<R, S>,
    theme: &Theme,
    area: Rect,
) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(NEXT_HEIGHT),
            Constraint::Length(STATS_HEIGHT),
            Constraint::Length(KEYS_HEIGHT),
            Constraint::Fill(1),
        ])
        .split(area);

    // --- Next ---
    let next_title = format!(" Next: {:?} ", session.grid().next_shape());
    let next_block = border(theme).title(Span::styled(next_title, title_style));
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], buf);
    let preview = Rect {
        x: next_inner.x + next_inner.width.saturating_sub(pieces::MASK_SIZE as u16 * CELL_WIDTH) / 2,
        y: next_inner.y + 1,
        width: (pieces::MASK_SIZE as u16 * CELL_WIDTH).min(next_inner.width),
        height: next_inner.height.saturating_sub(1),
    };
    for PieceBlock { row, col, color } in session.grid().next_tile_blocks() {
        paint_cell(buf, preview, row, col, theme.piece_color(color));
    }

    // --- Stats ---
    let score = session.score();
    let stat = |label: &'static str, value: u32| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value.to_string(), fg_style),
        ])
    };
    let stats_block = border(theme);
    let stats_inner = stats_block.inner(chunks[1]);
    stats_block.render(chunks[1], buf);
    Paragraph::new(Text::from(vec![
        stat("Score: ", score.score()),
        stat("Best:  ", score.high_score()),
        stat("Level: ", score.level()),
        stat("Lines: ", score.total_cleared_rows()),
    ]))
    .render(stats_inner, buf);

    // --- Keys ---
    let hint = Style::default().fg(theme.inactive_fg);
    let keys_block = border(theme).title(Span::styled(" Keys ", title_style));
    let keys_inner = keys_block.inner(chunks[2]);
    keys_block.render(chunks[2], buf);
    Paragraph::new(Text::from(vec![
        Line::from(Span::styled("←→ / hl  move", hint)),
        Line::from(Span::styled("↑ / k    rotate", hint)),
        Line::from(Span::styled("↓ / j    faster", hint)),
        Line::from(Span::styled("Esc / p  pause", hint)),
        Line::from(Span::styled("q        quit", hint)),
    ]))
    .render(keys_inner, buf);
}

fn popup_rect(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_popup(buf: &mut Buffer, theme: &Theme, area: Rect, lines: Vec<Line<'static>>) {
    let popup = popup_rect(area, area.width.saturating_sub(2), lines.len() as u16 + 2);
    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(border(theme))
        .render(popup, buf);
}

fn draw_start_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    draw_popup(
        buf,
        theme,
        area,
        vec![
            Line::from(Span::styled(
                " Blockfall ",
                Style::default()
                    .fg(theme.title)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to start",
                Style::default().fg(theme.main_fg),
            )),
            Line::from(Span::styled("q to quit", Style::default().fg(theme.inactive_fg))),
        ],
    );
}

fn draw_pause_overlay(buf: &mut Buffer, theme: &Theme, area: Rect) {
    draw_popup(
        buf,
        theme,
        area,
        vec![
            Line::from(Span::styled(
                " Paused ",
                Style::default().fg(Color::Black).bg(Color::Yellow),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Esc/P resume  Q quit",
                Style::default().fg(theme.main_fg),
            )),
        ],
    );
}

fn draw_game_over(
    buf: &mut Buffer,
    theme: &Theme,
    area: Rect,
    final_score: u32,
    best: u32,
    can_restart: bool,
) {
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!("Score: {final_score}"), fg)),
        Line::from(Span::styled(format!("Best: {best}"), fg)),
    ];
    if final_score > 0 && final_score == best {
        lines.push(Line::from(Span::styled(
            "New record!",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    let hint = if can_restart {
        "Enter restart  Q quit"
    } else {
        ""
    };
    lines.push(Line::from(Span::styled(hint, fg)));
    draw_popup(buf, theme, area, lines);
}

fn draw_too_small(frame: &mut Frame, theme: &Theme, area: Rect, need: (u16, u16)) {
    let msg = format!("Terminal too small (need {}x{})", need.0, need.1);
    Paragraph::new(Span::styled(msg, Style::default().fg(theme.main_fg)))
        .alignment(Alignment::Center)
        .render(popup_rect(area, area.width, 1), frame.buffer_mut());
}
