//! Board controller: owns the grid, the gem entities and the animation queue, and advances
//! everything once per frame.
//!
//! Order of one [`Board::tick`]:
//!
//! 1. release the next animation batch if nothing is in flight
//! 2. if still idle: resolve matches, then collapse and refill
//! 3. advance every gem and apply their completion/removal notifications
//! 4. handle queued pointer input (selection and swaps)
//! 5. report a deadlock once the board has settled without a legal move
//!
//! Logic only advances while the in-flight counter is zero, so the grid never changes under a
//! running animation of the previous change.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::{AnimationBatch, AnimationItem, AnimationKind, AnimationQueue, QueueStats};
use crate::config::{BoardConfig, ConfigError};
use crate::gem::{Gem, GemEvent, GemId, GemKind, GemView};
use crate::grid::{BoardLayout, CellPos, Grid, Occupant, Vec2};
use crate::swap::{Resolution, SwapOutcome};
use crate::{gravity, matcher, moves, swap};

/// Signals for the host: sound, effects, session control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    SwapAccepted { from: CellPos, to: CellPos },
    SwapRejected { from: CellPos, to: CellPos },
    /// One run started its destroy animation. `cells` are the cells it cleared that no earlier
    /// run of the same pass already claimed.
    MatchFormed {
        kind: GemKind,
        length: usize,
        cells: Vec<CellPos>,
        points: u32,
    },
    /// The board settled and no single swap can form a match.
    NoLegalMoves,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerEvent {
    Down(Vec2),
    Up(Vec2),
}

/// Points for each newly cleared cell of a run of `len` gems.
#[inline]
pub fn points_per_cell(len: usize) -> u32 {
    (10 + len as u32).saturating_sub(3) * 10
}

pub struct Board {
    config: BoardConfig,
    layout: BoardLayout,
    grid: Grid,
    gems: HashMap<GemId, Gem>,
    queue: AnimationQueue,
    rng: StdRng,
    next_id: u32,
    score: u32,
    selected: Option<CellPos>,
    pointer_pressed: bool,
    pointer_events: VecDeque<PointerEvent>,
    events: Vec<BoardEvent>,
    gem_events: Vec<GemEvent>,
    deadlock_reported: bool,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("gems", &self.gems.len())
            .field("score", &self.score)
            .field("queue", &self.queue.stats())
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Random board. Any runs in the initial fill resolve through the normal cascade during the
    /// first ticks.
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        let mut board = Self::empty(config)?;
        board.fill_instantly();
        Ok(board)
    }

    /// Board with the given row-major kinds (`None` leaves a cell empty; it is refilled by the
    /// first cascade).
    pub fn from_kinds<I>(config: BoardConfig, kinds: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Option<GemKind>>,
    {
        let mut board = Self::empty(config)?;
        board.grid = Grid::from_kinds(board.config.width, board.config.height, kinds);
        for (pos, occupant) in board.grid.occupants() {
            let origin = board.layout.cell_origin(pos);
            board
                .gems
                .insert(occupant.id, Gem::new(occupant.id, occupant.kind, origin));
        }
        board.next_id = (board.config.width * board.config.height) as u32;
        Ok(board)
    }

    fn empty(config: BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let layout = BoardLayout::new(config.width, config.height, config.geometry);
        Ok(Self {
            grid: Grid::new(config.width, config.height),
            layout,
            config,
            gems: HashMap::new(),
            queue: AnimationQueue::new(),
            rng,
            next_id: 0,
            score: 0,
            selected: None,
            pointer_pressed: false,
            pointer_events: VecDeque::new(),
            events: Vec::new(),
            gem_events: Vec::new(),
            deadlock_reported: false,
        })
    }

    /// Start a new session: fresh random board, zero score, nothing animating.
    pub fn reset(&mut self) {
        self.grid = Grid::new(self.config.width, self.config.height);
        self.gems.clear();
        self.queue.clear();
        self.score = 0;
        self.selected = None;
        self.pointer_pressed = false;
        self.pointer_events.clear();
        self.events.clear();
        self.deadlock_reported = false;
        self.fill_instantly();
        log::info!(
            "board reset ({}x{}, {} kinds)",
            self.config.width,
            self.config.height,
            self.config.kinds
        );
    }

    fn fill_instantly(&mut self) {
        self.refill(false);
    }

    // --- queries -------------------------------------------------------------------------

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn gem(&self, id: GemId) -> Option<&Gem> {
        self.gems.get(&id)
    }

    pub fn gem_at(&self, pos: CellPos) -> Option<&Gem> {
        self.grid.at(pos).and_then(|o| self.gems.get(&o.id))
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn selected(&self) -> Option<CellPos> {
        self.selected
    }

    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Nothing animating or queued, every cell filled, and no unresolved run.
    pub fn is_settled(&self) -> bool {
        self.queue.is_drained() && self.grid.is_full() && !matcher::has_runs(&self.grid)
    }

    /// False only on a settled board where no single swap forms a match. While a cascade is
    /// still running the answer is true: the board has not reached a final state yet.
    pub fn has_legal_move(&self) -> bool {
        !self.is_settled() || moves::has_legal_move(&self.grid)
    }

    /// Drawing data for every gem on the grid, column by column.
    pub fn gem_views(&self) -> impl Iterator<Item = GemView> + '_ {
        self.grid
            .occupants()
            .filter_map(|(pos, o)| self.gems.get(&o.id).and_then(|g| g.view(pos)))
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, BoardEvent> {
        self.events.drain(..)
    }

    // --- input ---------------------------------------------------------------------------

    pub fn pointer_down(&mut self, coord: Vec2) {
        self.pointer_events.push_back(PointerEvent::Down(coord));
    }

    pub fn pointer_up(&mut self, coord: Vec2) {
        self.pointer_events.push_back(PointerEvent::Up(coord));
    }

    fn process_input(&mut self) {
        while let Some(event) = self.pointer_events.pop_front() {
            match event {
                PointerEvent::Down(_) => self.pointer_pressed = true,
                PointerEvent::Up(coord) => {
                    if std::mem::take(&mut self.pointer_pressed) {
                        let cell = self.layout.pointer_to_cell(coord);
                        self.click(cell);
                    }
                }
            }
        }
    }

    /// A completed click on `cell` (`None` = outside the board).
    fn click(&mut self, cell: Option<CellPos>) {
        match (cell, self.selected) {
            (None, _) => self.clear_selection(),
            (Some(pos), Some(first)) if !first.is_adjacent(pos) => self.clear_selection(),
            (Some(pos), None) => self.select(pos),
            (Some(pos), Some(first)) => {
                self.clear_selection();
                self.swap(first, pos);
            }
        }
    }

    /// Mark `pos` as the first half of a swap. Ignored for empty or disappearing cells.
    pub fn select(&mut self, pos: CellPos) {
        if !self.is_movable(pos) {
            return;
        }
        self.clear_selection();
        if let Some(gem) = self.grid.at(pos).and_then(|o| self.gems.get_mut(&o.id)) {
            gem.set_selected(true);
            self.selected = Some(pos);
        }
    }

    pub fn clear_selection(&mut self) {
        if let Some(pos) = self.selected.take() {
            self.deselect_at(pos);
        }
    }

    fn deselect_at(&mut self, pos: CellPos) {
        if let Some(gem) = self.grid.at(pos).and_then(|o| self.gems.get_mut(&o.id)) {
            gem.set_selected(false);
        }
    }

    fn is_movable(&self, pos: CellPos) -> bool {
        self.gem_at(pos)
            .is_some_and(|g| !g.is_destroyed() && !g.is_matching() && !g.is_queued_for_match())
    }

    /// Swap two cells. The forward move always plays; a swap that forms no match is played
    /// back and not committed.
    pub fn swap(&mut self, a: CellPos, b: CellPos) -> SwapOutcome {
        self.deselect_at(a);
        if self.selected == Some(a) {
            self.selected = None;
        }
        if !self.is_movable(a) || !self.is_movable(b) {
            log::debug!("swap {a:?} <-> {b:?} ignored: cell not movable");
            return SwapOutcome::Invalid;
        }
        let resolution = swap::resolve(&self.grid, a, b);
        let (Some(first), Some(second)) = (self.grid.at(a), self.grid.at(b)) else {
            return SwapOutcome::Invalid;
        };
        let rest_a = self.layout.cell_origin(a);
        let rest_b = self.layout.cell_origin(b);
        let outcome = resolution.outcome();
        match resolution {
            Resolution::Invalid => {
                log::debug!("swap {a:?} <-> {b:?} invalid");
            }
            Resolution::Rejected => {
                log::debug!("swap {a:?} <-> {b:?} rejected, playing back");
                self.queue.enqueue(vec![
                    AnimationItem::translation(first.id, rest_b),
                    AnimationItem::translation(second.id, rest_a),
                ]);
                self.queue.enqueue(vec![
                    AnimationItem::translation(first.id, rest_a),
                    AnimationItem::translation(second.id, rest_b),
                ]);
                self.events.push(BoardEvent::SwapRejected { from: a, to: b });
            }
            Resolution::Accepted(next) => {
                log::debug!("swap {a:?} <-> {b:?} accepted");
                self.queue.enqueue(vec![
                    AnimationItem::translation(first.id, rest_b),
                    AnimationItem::translation(second.id, rest_a),
                ]);
                self.grid = next;
                self.events.push(BoardEvent::SwapAccepted { from: a, to: b });
            }
        }
        outcome
    }

    // --- frame tick ----------------------------------------------------------------------

    /// Advance the board by `dt` of elapsed time.
    pub fn tick(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();
        self.release_next_batch();
        if self.queue.is_idle() {
            self.resolve_matches();
            self.cascade();
        }
        self.update_gems(dt);
        self.process_input();
        self.check_deadlock();
    }

    fn release_next_batch(&mut self) {
        let Some(batch) = self.queue.next_batch() else {
            return;
        };
        for item in batch {
            match self.gems.get_mut(&item.target) {
                Some(gem) if !gem.is_destroyed() => match item.kind {
                    AnimationKind::Translation(destination) => gem.move_to(destination),
                    AnimationKind::Matching => gem.start_match(),
                },
                _ => {
                    log::warn!("animation target {:?} is gone; completing it", item.target);
                    self.queue.complete();
                }
            }
        }
    }

    /// Queue a destroy batch per run and add the score. Cells shared by two runs count once.
    fn resolve_matches(&mut self) {
        let runs = matcher::find_runs(&self.grid);
        if runs.is_empty() {
            return;
        }
        let mut gained = 0;
        for run in &runs {
            let mut batch: AnimationBatch = Vec::with_capacity(run.len());
            let mut cleared = Vec::with_capacity(run.len());
            for &pos in &run.cells {
                let Some(occupant) = self.grid.at(pos) else {
                    continue;
                };
                let Some(gem) = self.gems.get_mut(&occupant.id) else {
                    continue;
                };
                if gem.is_queued_for_match() {
                    continue;
                }
                gem.queue_for_match();
                batch.push(AnimationItem::matching(occupant.id));
                cleared.push(pos);
            }
            if batch.is_empty() {
                continue;
            }
            let points = points_per_cell(run.len()) * cleared.len() as u32;
            gained += points;
            log::debug!(
                "match of {} x kind {} ({} new cell(s), +{points})",
                run.len(),
                run.kind.0,
                cleared.len()
            );
            self.queue.enqueue(batch);
            self.events.push(BoardEvent::MatchFormed {
                kind: run.kind,
                length: run.len(),
                cells: cleared,
                points,
            });
        }
        self.score += gained;
    }

    /// Compact the columns that lost gems and refill them.
    fn cascade(&mut self) {
        let collapse = gravity::collapse(&mut self.grid);
        if collapse.is_noop() {
            return;
        }
        let animate = self.config.animate_refill;
        let snap = self.config.tuning.snap_threshold;
        let mut falls: AnimationBatch = Vec::new();
        for &x in &collapse.columns {
            for y in 0..self.grid.height() {
                let pos = CellPos::new(x, y);
                let Some(occupant) = self.grid.at(pos) else {
                    continue;
                };
                let Some(gem) = self.gems.get_mut(&occupant.id) else {
                    continue;
                };
                let rest = self.layout.cell_origin(pos);
                let far = (gem.position().x - rest.x).abs() > snap
                    || (gem.position().y - rest.y).abs() > snap;
                if animate && far {
                    if gem.destination() != rest {
                        falls.push(AnimationItem::translation(occupant.id, rest));
                    }
                } else {
                    gem.snap_to(rest);
                }
            }
        }
        log::debug!(
            "collapse: {} column(s), {} gem(s) fall",
            collapse.columns.len(),
            collapse.falls.len()
        );
        self.queue.enqueue(falls);
        self.refill(animate);
    }

    /// Fill every empty cell with a new random gem. Animated gems start stacked above the board
    /// and fall in as one batch.
    fn refill(&mut self, animate: bool) {
        let layout = self.layout;
        let kinds = self.config.kinds;
        let gems = &mut self.gems;
        let rng = &mut self.rng;
        let next_id = &mut self.next_id;
        let mut drops: AnimationBatch = Vec::new();
        let filled = gravity::refill(&mut self.grid, |pos, slot| {
            let id = GemId(*next_id);
            *next_id += 1;
            let kind = GemKind(rng.random_range(0..kinds));
            let rest = layout.cell_origin(pos);
            let start = if animate {
                layout.spawn_origin(pos.x, slot)
            } else {
                rest
            };
            gems.insert(id, Gem::new(id, kind, start));
            if animate {
                drops.push(AnimationItem::translation(id, rest));
            }
            Occupant { id, kind }
        });
        if !filled.is_empty() {
            log::debug!("refill: {} new gem(s)", filled.len());
        }
        self.queue.enqueue(drops);
    }

    fn update_gems(&mut self, dt: f32) {
        let tuning = self.config.tuning;
        let ids: Vec<GemId> = self.grid.occupants().map(|(_, o)| o.id).collect();
        let mut events = std::mem::take(&mut self.gem_events);
        for id in ids {
            if let Some(gem) = self.gems.get_mut(&id) {
                gem.update(dt, &tuning, &mut events);
            }
        }
        for event in events.drain(..) {
            match event {
                GemEvent::AnimationCompleted(_) => self.queue.complete(),
                GemEvent::Removed(id) => self.evict(id),
            }
        }
        self.gem_events = events;
    }

    fn evict(&mut self, id: GemId) {
        if let Some(pos) = self.grid.position_of(id) {
            self.grid.take(pos);
            if self.selected == Some(pos) {
                self.selected = None;
            }
        }
        self.gems.remove(&id);
    }

    fn check_deadlock(&mut self) {
        if !self.is_settled() {
            return;
        }
        if moves::has_legal_move(&self.grid) {
            self.deadlock_reported = false;
            return;
        }
        if !self.deadlock_reported {
            self.deadlock_reported = true;
            log::info!("no legal moves left (score {})", self.score);
            self.events.push(BoardEvent::NoLegalMoves);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(16);

    fn config(width: usize, height: usize, kinds: u8) -> BoardConfig {
        BoardConfig {
            width,
            height,
            kinds,
            ..BoardConfig::default()
        }
        .with_seed(42)
    }

    fn board(rows: &[&str], kinds: u8) -> Board {
        let parsed: Vec<_> = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c.to_digit(10).map(|d| GemKind(d as u8))))
            .collect();
        Board::from_kinds(config(rows[0].len(), rows.len(), kinds), parsed).unwrap()
    }

    fn settle(board: &mut Board) {
        for _ in 0..20_000 {
            board.tick(DT);
            if board.is_settled() {
                return;
            }
        }
        panic!("board did not settle: {board:?}");
    }

    const NO_RUNS: [&str; 4] = ["0012", "2301", "3123", "1230"];

    #[test]
    fn test_points_per_cell() {
        assert_eq!(points_per_cell(3), 100);
        assert_eq!(points_per_cell(4), 110);
        assert_eq!(points_per_cell(5), 120);
    }

    #[test]
    fn test_non_adjacent_swap_is_noop() {
        let mut b = board(&NO_RUNS, 4);
        let before = b.grid().clone();
        let outcome = b.swap(CellPos::new(0, 0), CellPos::new(2, 0));
        assert_eq!(outcome, SwapOutcome::Invalid);
        assert_eq!(b.grid(), &before);
        assert_eq!(b.stats().pending_batches, 0);
        assert_eq!(b.drain_events().count(), 0);
    }

    #[test]
    fn test_rejected_swap_plays_forward_and_back() {
        let mut b = board(&NO_RUNS, 4);
        let before = b.grid().clone();
        let outcome = b.swap(CellPos::new(0, 2), CellPos::new(1, 2));
        assert_eq!(outcome, SwapOutcome::Rejected);
        assert_eq!(b.grid(), &before);
        assert_eq!(b.stats().pending_batches, 2);
        let events: Vec<_> = b.drain_events().collect();
        assert_eq!(
            events,
            vec![BoardEvent::SwapRejected {
                from: CellPos::new(0, 2),
                to: CellPos::new(1, 2)
            }]
        );

        settle(&mut b);
        assert_eq!(b.grid(), &before);
        let origin = b.layout().cell_origin(CellPos::new(0, 2));
        assert_eq!(b.gem_at(CellPos::new(0, 2)).unwrap().position(), origin);
    }

    #[test]
    fn test_accepted_swap_commits() {
        let mut b = board(&NO_RUNS, 4);
        let outcome = b.swap(CellPos::new(2, 0), CellPos::new(2, 1));
        assert_eq!(outcome, SwapOutcome::Accepted);
        assert!(matcher::has_runs(b.grid()));
        assert_eq!(b.stats().pending_batches, 1);
        assert!(matches!(
            b.drain_events().next(),
            Some(BoardEvent::SwapAccepted { .. })
        ));
    }

    #[test]
    fn test_swap_accepted_while_run_is_pending() {
        let mut b = board(&["3334", "0120", "1201", "2012"], 5);
        let outcome = b.swap(CellPos::new(0, 2), CellPos::new(1, 2));
        assert_eq!(outcome, SwapOutcome::Accepted);
        assert_eq!(b.stats().pending_batches, 1);
        assert_eq!(
            b.gem_at(CellPos::new(0, 2)).and_then(|g| g.kind()),
            Some(GemKind(2))
        );
    }

    #[test]
    fn test_overlapping_runs_scored_once() {
        let mut b = board(&["11102", "10230", "12303", "03021", "20310"], 4);
        b.tick(DT);
        assert_eq!(b.score(), 500);
        assert_eq!(b.stats().pending_batches, 2);
        let formed: Vec<_> = b
            .drain_events()
            .filter_map(|e| match e {
                BoardEvent::MatchFormed { cells, points, .. } => Some((cells.len(), points)),
                _ => None,
            })
            .collect();
        assert_eq!(formed, vec![(3, 300), (2, 200)]);
    }

    #[test]
    fn test_logic_waits_for_in_flight_batch() {
        let mut b = board(&["11102", "10230", "12303", "03021", "20310"], 4);
        b.tick(DT);
        b.tick(DT);
        let stats = b.stats();
        assert_eq!(stats.in_flight, 3);
        assert_eq!(stats.pending_batches, 1);
        assert_eq!(b.score(), 500);
    }

    #[test]
    fn test_cascade_leaves_full_board_without_runs() {
        let mut b = board(&["11102", "10230", "12303", "03021", "20310"], 4);
        settle(&mut b);
        assert!(b.grid().is_full());
        assert!(!matcher::has_runs(b.grid()));
        assert!(b.score() >= 500);
        assert_eq!(b.gem_views().count(), 25);
        for view in b.gem_views() {
            assert_eq!(view.position, b.layout().cell_origin(view.cell));
            assert_eq!(view.size_factor, 1.0);
        }
    }

    #[test]
    fn test_click_selects_then_swaps() {
        let mut b = board(&NO_RUNS, 4);
        let layout = *b.layout();
        let first = CellPos::new(2, 0);
        let second = CellPos::new(2, 1);

        b.pointer_down(layout.cell_center(first));
        b.pointer_up(layout.cell_center(first));
        b.tick(DT);
        assert_eq!(b.selected(), Some(first));
        assert!(b.gem_at(first).unwrap().is_selected());

        b.pointer_down(layout.cell_center(second));
        b.pointer_up(layout.cell_center(second));
        b.tick(DT);
        assert_eq!(b.selected(), None);
        let events: Vec<_> = b.drain_events().collect();
        assert!(events.contains(&BoardEvent::SwapAccepted {
            from: first,
            to: second
        }));
    }

    #[test]
    fn test_click_outside_clears_selection() {
        let mut b = board(&NO_RUNS, 4);
        let layout = *b.layout();
        let pos = CellPos::new(1, 1);
        b.pointer_down(layout.cell_center(pos));
        b.pointer_up(layout.cell_center(pos));
        b.tick(DT);
        assert_eq!(b.selected(), Some(pos));

        b.pointer_down(Vec2::new(0.0, 0.0));
        b.pointer_up(Vec2::new(0.0, 0.0));
        b.tick(DT);
        assert_eq!(b.selected(), None);
        assert!(!b.gem_at(pos).unwrap().is_selected());
    }

    #[test]
    fn test_click_non_adjacent_clears_selection_without_swap() {
        let mut b = board(&NO_RUNS, 4);
        let layout = *b.layout();
        for pos in [CellPos::new(0, 0), CellPos::new(2, 0)] {
            b.pointer_down(layout.cell_center(pos));
            b.pointer_up(layout.cell_center(pos));
        }
        b.tick(DT);
        assert_eq!(b.selected(), None);
        assert_eq!(b.stats().pending_batches, 0);
        assert_eq!(b.drain_events().count(), 0);
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut b = board(&NO_RUNS, 4);
        let center = b.layout().cell_center(CellPos::new(1, 1));
        b.pointer_up(center);
        b.tick(DT);
        assert_eq!(b.selected(), None);
    }

    #[test]
    fn test_deadlock_reported_once() {
        let mut b = board(&["0123", "2301", "0123", "2301"], 4);
        assert!(!b.has_legal_move());
        b.tick(DT);
        b.tick(DT);
        let events: Vec<_> = b.drain_events().collect();
        assert_eq!(events, vec![BoardEvent::NoLegalMoves]);
    }

    #[test]
    fn test_unsettled_board_has_legal_move() {
        let b = board(&["11102", "10230", "12303", "03021", "20310"], 4);
        assert!(b.has_legal_move());
    }

    #[test]
    fn test_reset_restores_full_board() {
        let mut b = board(&["11102", "10230", "12303", "03021", "20310"], 4);
        b.tick(DT);
        b.reset();
        assert_eq!(b.score(), 0);
        assert!(b.grid().is_full());
        assert_eq!(b.stats().pending_batches, 0);
        assert_eq!(b.stats().in_flight, 0);
    }

    #[test]
    fn test_missing_cells_refill_from_above() {
        let mut kinds: Vec<_> = NO_RUNS
            .iter()
            .flat_map(|r| r.chars().map(|c| c.to_digit(10).map(|d| GemKind(d as u8))))
            .collect();
        kinds[0] = None;
        let mut b = Board::from_kinds(config(4, 4, 4), kinds).unwrap();
        b.tick(DT);
        assert!(b.grid().is_full());
        let spawned = b.gem_at(CellPos::new(0, 0)).unwrap();
        assert!(spawned.position().y < b.layout().geometry.margin_y);
        assert!(spawned.is_animating() || b.stats().pending_batches > 0);
    }

    #[test]
    fn test_fall_within_snap_threshold_is_not_animated() {
        let mut kinds: Vec<_> = NO_RUNS
            .iter()
            .flat_map(|r| r.chars().map(|c| c.to_digit(10).map(|d| GemKind(d as u8))))
            .collect();
        // (0,1) is empty, so the gem at (0,0) drops one cell.
        kinds[4] = None;
        let mut b = Board::from_kinds(config(4, 4, 4), kinds).unwrap();
        let id = b.grid().at(CellPos::new(0, 0)).unwrap().id;
        let rest = b.layout().cell_origin(CellPos::new(0, 1));
        b.gems
            .get_mut(&id)
            .unwrap()
            .snap_to(Vec2::new(rest.x, rest.y - 3.0));

        b.tick(DT);
        assert_eq!(b.grid().position_of(id), Some(CellPos::new(0, 1)));
        let gem = b.gems.get(&id).unwrap();
        assert_eq!(gem.position(), rest);
        assert!(!gem.is_animating());
        // Only the refill batch for (0,0) is queued.
        assert_eq!(b.stats().pending_batches, 1);

        b.tick(DT);
        assert_eq!(b.stats().in_flight, 1);
        assert!(!b.gems.get(&id).unwrap().is_animating());
        assert!(b.gem_at(CellPos::new(0, 0)).unwrap().is_animating());
    }

    #[test]
    fn test_no_animation_refill_places_instantly() {
        let mut kinds: Vec<_> = NO_RUNS
            .iter()
            .flat_map(|r| r.chars().map(|c| c.to_digit(10).map(|d| GemKind(d as u8))))
            .collect();
        kinds[0] = None;
        let mut cfg = config(4, 4, 4);
        cfg.animate_refill = false;
        let mut b = Board::from_kinds(cfg, kinds).unwrap();
        b.tick(DT);
        let origin = b.layout().cell_origin(CellPos::new(0, 0));
        assert_eq!(b.gem_at(CellPos::new(0, 0)).unwrap().position(), origin);
        assert_eq!(b.stats().pending_batches, 0);
    }
}
