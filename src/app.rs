//! App: terminal init, main loop, frame tick, key and mouse handling.

use crate::Args;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, BoardView, Hud, POPUP_LIFETIME_MS};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use match3tui::{Board, BoardEvent, CellPos};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use ratatui::style::Color;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    /// The board settled without a legal move; waiting for a new board or quit.
    NoMoves,
}

/// Floating "+points" label over the first cell a match cleared.
#[derive(Debug, Clone)]
pub struct ScorePopup {
    pub cell: CellPos,
    pub points: u32,
    pub age_ms: u32,
    pub color: Color,
}

pub struct App {
    board: Board,
    theme: Theme,
    frame_interval: Duration,
    screen: Screen,
    paused: bool,
    debug: bool,
    cursor: CellPos,
    best: u32,
    matches: u32,
    popups: Vec<ScorePopup>,
    /// Last drawn frame area, for mapping mouse coordinates.
    area: Rect,
    last_tick: Instant,
    /// TachyonFX flash for the last rejected swap.
    reject_effect: Option<Effect>,
    reject_effect_time: Option<Instant>,
}

impl App {
    pub fn new(args: &Args, board: Board, theme: Theme) -> Self {
        let frame_rate = if args.frame_rate.is_finite() && args.frame_rate > 0.0 {
            args.frame_rate
        } else {
            60.0
        };
        Self {
            board,
            theme,
            frame_interval: Duration::from_secs_f64(1.0 / frame_rate),
            screen: Screen::Playing,
            paused: false,
            debug: args.debug,
            cursor: CellPos::new(0, 0),
            best: 0,
            matches: 0,
            popups: Vec::new(),
            area: Rect::default(),
            last_tick: Instant::now(),
            reject_effect: None,
            reject_effect_time: None,
        }
    }

    fn new_board(&mut self) {
        self.board.reset();
        self.screen = Screen::Playing;
        self.paused = false;
        self.matches = 0;
        self.popups.clear();
        self.reject_effect = None;
        self.reject_effect_time = None;
        self.last_tick = Instant::now();
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let hud = Hud {
                screen: self.screen,
                paused: self.paused,
                debug: self.debug,
                cursor: self.cursor,
                best: self.best,
                matches: self.matches,
                popups: &self.popups,
            };
            let completed = terminal.draw(|f| {
                ui::draw(
                    f,
                    &self.board,
                    &self.theme,
                    &hud,
                    &mut self.reject_effect,
                    &mut self.reject_effect_time,
                    now,
                );
            })?;
            self.area = completed.area;

            if self.reject_effect.as_ref().is_some_and(|e| e.done()) {
                self.reject_effect = None;
                self.reject_effect_time = None;
            }

            let timeout = self.frame_interval.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_action(key_to_action(key)) {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.handle_mouse(mouse),
                        _ => {}
                    }
                }
            }

            let elapsed = self.last_tick.elapsed();
            self.last_tick = Instant::now();
            if self.screen == Screen::Playing && !self.paused {
                self.board.tick(elapsed);
                self.handle_board_events();
            }
            self.tick_popups(elapsed.as_millis().min(u128::from(u32::MAX)) as u32);
        }
    }

    /// Returns true when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        match (self.screen, action) {
            (_, Action::Quit) => return true,
            (_, Action::NewBoard) => self.new_board(),
            (_, Action::ToggleDebug) => self.debug = !self.debug,
            (Screen::Playing, Action::Pause) => self.paused = !self.paused,
            (Screen::Playing, _) if self.paused => {}
            (Screen::Playing, Action::CursorLeft) => self.move_cursor(-1, 0),
            (Screen::Playing, Action::CursorRight) => self.move_cursor(1, 0),
            (Screen::Playing, Action::CursorUp) => self.move_cursor(0, -1),
            (Screen::Playing, Action::CursorDown) => self.move_cursor(0, 1),
            (Screen::Playing, Action::Click) => {
                let at = self.board.layout().cell_center(self.cursor);
                self.board.pointer_down(at);
                self.board.pointer_up(at);
            }
            _ => {}
        }
        false
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let grid = self.board.grid();
        let x = self.cursor.x.saturating_add_signed(dx).min(grid.width() - 1);
        let y = self.cursor.y.saturating_add_signed(dy).min(grid.height() - 1);
        self.cursor = CellPos::new(x, y);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != Screen::Playing || self.paused {
            return;
        }
        let view = BoardView::new(self.area, *self.board.layout());
        let at = view.to_engine(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(cell) = view.layout.pointer_to_cell(at) {
                    self.cursor = cell;
                }
                self.board.pointer_down(at);
            }
            MouseEventKind::Up(MouseButton::Left) => self.board.pointer_up(at),
            _ => {}
        }
    }

    fn handle_board_events(&mut self) {
        let events: Vec<BoardEvent> = self.board.drain_events().collect();
        for event in events {
            match event {
                BoardEvent::SwapAccepted { .. } => {}
                BoardEvent::SwapRejected { from, to } => {
                    let view = BoardView::new(self.area, *self.board.layout());
                    self.reject_effect = Some(ui::reject_flash(&view, &self.theme, [from, to]));
                    self.reject_effect_time = None;
                }
                BoardEvent::MatchFormed {
                    kind,
                    cells,
                    points,
                    ..
                } => {
                    self.matches += 1;
                    if let Some(&cell) = cells.first() {
                        self.popups.push(ScorePopup {
                            cell,
                            points,
                            age_ms: 0,
                            color: self.theme.gem_color(kind.0),
                        });
                    }
                }
                BoardEvent::NoLegalMoves => {
                    log::info!("no moves left at score {}", self.board.score());
                    self.screen = Screen::NoMoves;
                }
            }
        }
        self.best = self.best.max(self.board.score());
    }

    fn tick_popups(&mut self, delta_ms: u32) {
        self.popups.retain_mut(|p| {
            p.age_ms += delta_ms;
            p.age_ms < POPUP_LIFETIME_MS
        });
    }
}
