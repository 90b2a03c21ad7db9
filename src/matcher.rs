//! Match detection: maximal horizontal and vertical runs of three or more equal kinds.

use crate::gem::GemKind;
use crate::grid::{CellPos, Grid};

/// Shortest sequence that counts as a match.
pub const MIN_RUN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    #[inline]
    fn step(self) -> (usize, usize) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
        }
    }
}

/// A run of equal kinds, cells ordered left-to-right or top-to-bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRun {
    pub kind: GemKind,
    pub axis: Axis,
    pub cells: Vec<CellPos>,
}

impl MatchRun {
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        self.cells.contains(&pos)
    }
}

/// Every maximal run on the grid. Runs of an L or T shape share a cell and are reported
/// separately; deduplication is up to the caller.
pub fn find_runs(grid: &Grid) -> Vec<MatchRun> {
    let mut runs = Vec::new();
    for x in 0..grid.width() {
        for y in 0..grid.height() {
            for axis in [Axis::Horizontal, Axis::Vertical] {
                if let Some(run) = run_from(grid, CellPos::new(x, y), axis) {
                    runs.push(run);
                }
            }
        }
    }
    runs
}

/// True if the grid holds at least one run.
pub fn has_runs(grid: &Grid) -> bool {
    (0..grid.width()).any(|x| {
        (0..grid.height()).any(|y| {
            let pos = CellPos::new(x, y);
            run_length(grid, pos, Axis::Horizontal) >= MIN_RUN
                || run_length(grid, pos, Axis::Vertical) >= MIN_RUN
        })
    })
}

/// The maximal run starting at `start` along `axis`, if `start` begins one.
fn run_from(grid: &Grid, start: CellPos, axis: Axis) -> Option<MatchRun> {
    let kind = grid.at(start)?.kind;
    if predecessor_kind(grid, start, axis) == Some(kind) {
        return None;
    }
    let len = run_length(grid, start, axis);
    if len < MIN_RUN {
        return None;
    }
    let (dx, dy) = axis.step();
    let cells = (0..len)
        .map(|i| CellPos::new(start.x + dx * i, start.y + dy * i))
        .collect();
    Some(MatchRun { kind, axis, cells })
}

/// Number of consecutive cells from `start` along `axis` sharing its kind (0 if empty).
fn run_length(grid: &Grid, start: CellPos, axis: Axis) -> usize {
    let Some(first) = grid.at(start) else {
        return 0;
    };
    let (dx, dy) = axis.step();
    let mut len = 1;
    while grid
        .get(start.x + dx * len, start.y + dy * len)
        .is_some_and(|o| o.kind == first.kind)
    {
        len += 1;
    }
    len
}

fn predecessor_kind(grid: &Grid, pos: CellPos, axis: Axis) -> Option<GemKind> {
    let prev = match axis {
        Axis::Horizontal => pos.x.checked_sub(1).map(|x| CellPos::new(x, pos.y)),
        Axis::Vertical => pos.y.checked_sub(1).map(|y| CellPos::new(pos.x, y)),
    }?;
    grid.at(prev).map(|o| o.kind)
}
