//! Layout and drawing: board tiles, sidebar, pause and no-moves overlays, reject flash.
//!
//! Each grid cell is drawn as a `TILE_COLS` x `TILE_ROWS` block of terminal cells on a
//! `PITCH_COLS` x `PITCH_ROWS` grid. Gem positions come from the engine in its own screen units
//! and are scaled onto that grid, so falling and swapping gems slide across terminal rows.

use crate::app::{ScorePopup, Screen};
use crate::theme::Theme;
use match3tui::{Board, BoardLayout, CellPos, GemView, ReleasedKind, Tint, Vec2};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

const TILE_COLS: u16 = 4;
const TILE_ROWS: u16 = 2;
const PITCH_COLS: u16 = TILE_COLS + 1;
const PITCH_ROWS: u16 = TILE_ROWS + 1;

const SIDEBAR_WIDTH: u16 = 26;

/// Duration of the red flash on a rejected swap.
pub const REJECT_FLASH_MS: u32 = 350;
/// Popups rise one row per step and vanish after `POPUP_LIFETIME_MS`.
pub const POPUP_STEP_MS: u32 = 150;
pub const POPUP_LIFETIME_MS: u32 = 1200;

/// Inner board size in terminal cells (one spare column each side for the cursor brackets).
fn board_cells(width: usize, height: usize) -> (u16, u16) {
    let w = width as u16 * PITCH_COLS + 1;
    let h = (height as u16 * PITCH_ROWS).saturating_sub(1);
    (w, h)
}

/// Maps between the engine's coordinate space and terminal cells inside the drawn board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardView {
    pub rect: Rect,
    pub layout: BoardLayout,
}

impl BoardView {
    /// Board rect (inside its border) for the given frame area, matching `draw_game`'s layout.
    pub fn new(area: Rect, layout: BoardLayout) -> Self {
        let (bw, bh) = board_cells(layout.width, layout.height);
        let total_w = bw + 2 + SIDEBAR_WIDTH;
        let total_h = bh + 2;
        let x = area.x + area.width.saturating_sub(total_w) / 2;
        let y = area.y + area.height.saturating_sub(total_h) / 2;
        let rect = Rect {
            x: x + 1,
            y: y + 1,
            width: bw.min(area.width.saturating_sub(2)),
            height: bh.min(area.height.saturating_sub(2)),
        };
        Self { rect, layout }
    }

    /// Outer rect including the border.
    pub fn outer(&self) -> Rect {
        Rect {
            x: self.rect.x.saturating_sub(1),
            y: self.rect.y.saturating_sub(1),
            width: self.rect.width + 2,
            height: self.rect.height + 2,
        }
    }

    /// Terminal offset (column, row) relative to `rect` of an engine position. May be negative
    /// for gems still above the board.
    pub fn to_screen(&self, pos: Vec2) -> (i32, i32) {
        let g = &self.layout.geometry;
        let pitch = self.layout.pitch();
        let col = (pos.x - g.margin_x) / pitch * f32::from(PITCH_COLS);
        let row = (pos.y - g.margin_y) / pitch * f32::from(PITCH_ROWS);
        (1 + col.round() as i32, row.round() as i32)
    }

    /// Engine coordinate under a terminal cell (its centre).
    pub fn to_engine(&self, column: u16, row: u16) -> Vec2 {
        let g = &self.layout.geometry;
        let pitch = self.layout.pitch();
        let fx = f32::from(column) - f32::from(self.rect.x) - 1.0 + 0.5;
        let fy = f32::from(row) - f32::from(self.rect.y) + 0.5;
        Vec2::new(
            g.margin_x + fx / f32::from(PITCH_COLS) * pitch,
            g.margin_y + fy / f32::from(PITCH_ROWS) * pitch,
        )
    }

    /// Terminal rect of a cell's resting tile.
    pub fn cell_rect(&self, cell: CellPos) -> Rect {
        Rect {
            x: self.rect.x + 1 + cell.x as u16 * PITCH_COLS,
            y: self.rect.y + cell.y as u16 * PITCH_ROWS,
            width: TILE_COLS,
            height: TILE_ROWS,
        }
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= i32::from(self.rect.x)
            && y >= i32::from(self.rect.y)
            && x < i32::from(self.rect.x + self.rect.width)
            && y < i32::from(self.rect.y + self.rect.height)
    }
}

/// Everything the frame needs besides the board.
pub struct Hud<'a> {
    pub screen: Screen,
    pub paused: bool,
    pub debug: bool,
    pub cursor: CellPos,
    pub best: u32,
    pub matches: u32,
    pub popups: &'a [ScorePopup],
}

/// Draw the current screen. While `reject_effect` is set, it is processed over the board with the
/// time since `effect_time`.
pub fn draw(
    frame: &mut Frame,
    board: &Board,
    theme: &Theme,
    hud: &Hud<'_>,
    reject_effect: &mut Option<Effect>,
    effect_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let view = BoardView::new(area, *board.layout());
    draw_game(frame, board, theme, hud, &view);
    if reject_effect.is_some() {
        apply_reject_effect(frame, &view, reject_effect, effect_time, now);
    }
    if hud.paused {
        draw_pause_overlay(frame, theme, area);
    }
    if hud.screen == Screen::NoMoves {
        draw_no_moves(frame, board, theme, hud, area);
    }
}

/// Fade effect tinting the two tiles of a rejected swap.
pub fn reject_flash(view: &BoardView, theme: &Theme, cells: [CellPos; 2]) -> Effect {
    let mut positions = HashSet::new();
    for cell in cells {
        let r = view.cell_rect(cell);
        for x in r.x..r.x + r.width {
            for y in r.y..r.y + r.height {
                positions.insert((x, y));
            }
        }
    }
    let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
        positions.contains(&(pos.x, pos.y))
    }));
    fx::fade_to(theme.reject, theme.reject, (REJECT_FLASH_MS, Interpolation::Linear))
        .with_filter(filter)
        .with_area(view.rect)
}

fn apply_reject_effect(
    frame: &mut Frame,
    view: &BoardView,
    reject_effect: &mut Option<Effect>,
    effect_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = effect_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *effect_time = Some(now);
    if let Some(effect) = reject_effect {
        frame.render_effect(effect, view.rect, TfxDuration::from_millis(delta_ms));
    }
}

/// Board + sidebar, centred in the frame.
fn draw_game(frame: &mut Frame, board: &Board, theme: &Theme, hud: &Hud<'_>, view: &BoardView) {
    let outer = view.outer();
    let sidebar = Rect {
        x: outer.x + outer.width,
        y: outer.y,
        width: SIDEBAR_WIDTH.min(frame.area().width.saturating_sub(outer.x + outer.width)),
        height: outer.height.max(16).min(frame.area().height.saturating_sub(outer.y)),
    };
    draw_board(frame, board, theme, hud, view);
    draw_sidebar(frame, board, theme, hud, sidebar);
}

fn draw_board(frame: &mut Frame, board: &Board, theme: &Theme, hud: &Hud<'_>, view: &BoardView) {
    let title = format!(" match3tui  | Score: {} ", board.score());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, theme.title));
    block.render(view.outer(), frame.buffer_mut());

    let buf = frame.buffer_mut();
    for x in view.rect.x..view.rect.x + view.rect.width {
        for y in view.rect.y..view.rect.y + view.rect.height {
            buf[(x, y)].set_symbol(" ").set_style(Style::default().bg(theme.bg));
        }
    }

    for gem in board.gem_views() {
        draw_gem(frame, theme, view, &gem);
    }

    if !hud.paused && hud.screen == Screen::Playing {
        draw_cursor(frame, theme, view, hud.cursor);
    }

    for popup in hud.popups {
        let r = view.cell_rect(popup.cell);
        let rise = (popup.age_ms / POPUP_STEP_MS) as u16;
        let y = r.y.saturating_sub(rise);
        if y < view.rect.y || !view.contains(i32::from(r.x), i32::from(y)) {
            continue;
        }
        let label = format!("+{}", popup.points);
        let style = Style::default()
            .fg(popup.color)
            .bg(theme.bg)
            .add_modifier(Modifier::BOLD);
        frame.buffer_mut().set_string(r.x, y, label, style);
    }
}

/// Tile for one gem: shrinks horizontally while matching, selected gems get a highlight
/// background and a tilt marker leaning the way the gem is rocking.
fn draw_gem(frame: &mut Frame, theme: &Theme, view: &BoardView, gem: &GemView) {
    let (col, row) = view.to_screen(gem.position);
    let color = theme.gem_color(gem.kind.0);
    let visible = ((gem.size_factor * f32::from(TILE_COLS)).ceil() as u16).clamp(1, TILE_COLS);
    let inset = (TILE_COLS - visible) / 2;
    let (symbol, bg) = match gem.tint {
        Tint::Selected => ("▓", theme.title),
        Tint::Normal if gem.size_factor < 0.5 => ("▒", theme.bg),
        Tint::Normal => ("█", theme.bg),
    };
    let style = Style::default().fg(color).bg(bg);
    let buf = frame.buffer_mut();
    for dy in 0..i32::from(TILE_ROWS) {
        for dx in 0..i32::from(visible) {
            let x = i32::from(view.rect.x) + col + i32::from(inset) + dx;
            let y = i32::from(view.rect.y) + row + dy;
            if view.contains(x, y) {
                buf[(x as u16, y as u16)].set_symbol(symbol).set_style(style);
            }
        }
    }
    if gem.tint == Tint::Selected && gem.rotation.abs() > 0.02 {
        let marker = if gem.rotation > 0.0 { "╱" } else { "╲" };
        let x = i32::from(view.rect.x) + col;
        let y = i32::from(view.rect.y) + row;
        if view.contains(x, y) {
            buf[(x as u16, y as u16)]
                .set_symbol(marker)
                .set_style(Style::default().fg(theme.bg).bg(theme.title));
        }
    }
}

fn draw_cursor(frame: &mut Frame, theme: &Theme, view: &BoardView, cursor: CellPos) {
    let r = view.cell_rect(cursor);
    let style = Style::default()
        .fg(theme.title)
        .bg(theme.bg)
        .add_modifier(Modifier::BOLD);
    let buf = frame.buffer_mut();
    for y in r.y..r.y + r.height {
        let left = r.x.saturating_sub(1);
        let right = r.x + r.width;
        if view.contains(i32::from(left), i32::from(y)) {
            buf[(left, y)].set_symbol("[").set_style(style);
        }
        if view.contains(i32::from(right), i32::from(y)) {
            buf[(right, y)].set_symbol("]").set_style(style);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, board: &Board, theme: &Theme, hud: &Hud<'_>, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Stats
            Constraint::Length(if hud.debug { 7 } else { 0 }),
            Constraint::Fill(1), // Keys
        ])
        .split(area);

    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(board.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Best: ", title_style),
            Span::styled(hud.best.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Matches: ", title_style),
            Span::styled(hud.matches.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Cursor: ", title_style),
            Span::styled(format!("{},{}", hud.cursor.x, hud.cursor.y), fg_style),
        ]),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    if hud.debug {
        let stats = board.stats();
        let last = match stats.last_released {
            Some(ReleasedKind::Translation) => "translation",
            Some(ReleasedKind::Matching) => "matching",
            None => "-",
        };
        let debug_block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(" Queue ", title_style));
        let debug_inner = debug_block.inner(chunks[1]);
        debug_block.render(chunks[1], frame.buffer_mut());
        let lines = vec![
            Line::from(Span::styled(format!("in flight: {}", stats.in_flight), dim_style)),
            Line::from(Span::styled(
                format!("pending:   {}", stats.pending_batches),
                dim_style,
            )),
            Line::from(Span::styled(format!("last:      {last}"), dim_style)),
            Line::from(Span::styled(
                format!("settled:   {}", board.is_settled()),
                dim_style,
            )),
            Line::from(Span::styled(
                format!("has move:  {}", board.has_legal_move()),
                dim_style,
            )),
        ];
        Paragraph::new(lines).render(debug_inner, frame.buffer_mut());
    }

    let keys_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Keys ", title_style));
    let keys_inner = keys_block.inner(chunks[2]);
    keys_block.render(chunks[2], frame.buffer_mut());
    let keys = [
        ("arrows/hjkl", "move"),
        ("space/enter", "select"),
        ("mouse", "click"),
        ("p", "pause"),
        ("d", "debug"),
        ("r", "new board"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(k, what)| {
            Line::from(vec![
                Span::styled(format!("{k:<12}"), fg_style),
                Span::styled(*what, dim_style),
            ])
        })
        .collect();
    Paragraph::new(lines).render(keys_inner, frame.buffer_mut());
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P - Resume    Q - Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_no_moves(frame: &mut Frame, board: &Board, theme: &Theme, hud: &Hud<'_>, area: Rect) {
    let popup = centered(area, 32, 9);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " No moves left ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", board.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Best: {} ", hud.best),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " R - New board    Q - Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" match3tui ", theme.title)),
    );
    p.render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3tui::Geometry;

    fn view() -> BoardView {
        let layout = BoardLayout::new(8, 8, Geometry::default());
        BoardView::new(Rect::new(0, 0, 120, 40), layout)
    }

    #[test]
    fn test_resting_gem_lands_on_its_tile() {
        let v = view();
        for cell in [CellPos::new(0, 0), CellPos::new(3, 5), CellPos::new(7, 7)] {
            let (col, row) = v.to_screen(v.layout.cell_origin(cell));
            let r = v.cell_rect(cell);
            assert_eq!(i32::from(v.rect.x) + col, i32::from(r.x));
            assert_eq!(i32::from(v.rect.y) + row, i32::from(r.y));
        }
    }

    #[test]
    fn test_click_on_tile_maps_to_its_cell() {
        let v = view();
        for cell in [CellPos::new(0, 0), CellPos::new(2, 6), CellPos::new(7, 7)] {
            let r = v.cell_rect(cell);
            for x in r.x..r.x + r.width {
                for y in r.y..r.y + r.height {
                    let coord = v.to_engine(x, y);
                    assert_eq!(v.layout.pointer_to_cell(coord), Some(cell), "at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_click_outside_board_maps_nowhere() {
        let v = view();
        let coord = v.to_engine(v.rect.x + v.rect.width + 3, v.rect.y);
        assert_eq!(v.layout.pointer_to_cell(coord), None);
        let coord = v.to_engine(v.rect.x, v.rect.y + v.rect.height + 1);
        assert_eq!(v.layout.pointer_to_cell(coord), None);
    }

    #[test]
    fn test_board_fits_default_terminal() {
        let v = view();
        assert_eq!(v.rect.width, 41);
        assert_eq!(v.rect.height, 23);
        assert!(v.outer().x + v.outer().width + SIDEBAR_WIDTH <= 120);
    }
}
