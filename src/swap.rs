//! Swap validation: adjacency check plus speculative evaluation on a grid snapshot.

use crate::grid::{CellPos, Grid};
use crate::matcher;

/// Result of a swap request as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Out of bounds, empty cell, or not neighbours. Nothing happened.
    Invalid,
    /// Legal move that forms no match; the grid is unchanged and the move is played back.
    Rejected,
    /// The swap formed at least one match and was committed.
    Accepted,
}

/// Speculative evaluation carrying the swapped snapshot when it should be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Invalid,
    Rejected,
    Accepted(Grid),
}

impl Resolution {
    pub fn outcome(&self) -> SwapOutcome {
        match self {
            Self::Invalid => SwapOutcome::Invalid,
            Self::Rejected => SwapOutcome::Rejected,
            Self::Accepted(_) => SwapOutcome::Accepted,
        }
    }
}

/// Both cells exist, are occupied, and touch along one axis.
pub fn is_valid_swap(grid: &Grid, a: CellPos, b: CellPos) -> bool {
    grid.at(a).is_some() && grid.at(b).is_some() && a.is_adjacent(b)
}

/// Evaluate swapping `a` and `b` without touching `grid`.
///
/// The swap is accepted when the swapped snapshot holds any run at all.
pub fn resolve(grid: &Grid, a: CellPos, b: CellPos) -> Resolution {
    if !is_valid_swap(grid, a, b) {
        return Resolution::Invalid;
    }
    let mut snapshot = grid.clone();
    snapshot.swap(a, b);
    if matcher::has_runs(&snapshot) {
        Resolution::Accepted(snapshot)
    } else {
        Resolution::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gem::GemKind;

    fn grid(rows: &[&str]) -> Grid {
        let width = rows[0].len();
        let kinds: Vec<_> = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c.to_digit(10).map(|d| GemKind(d as u8))))
            .collect();
        Grid::from_kinds(width, rows.len(), kinds)
    }

    #[test]
    fn test_non_adjacent_is_invalid() {
        let g = grid(&["012", "120"]);
        let r = resolve(&g, CellPos::new(0, 0), CellPos::new(2, 0));
        assert_eq!(r, Resolution::Invalid);
    }

    #[test]
    fn test_out_of_bounds_is_invalid() {
        let g = grid(&["012", "120"]);
        let r = resolve(&g, CellPos::new(2, 0), CellPos::new(3, 0));
        assert_eq!(r.outcome(), SwapOutcome::Invalid);
    }

    #[test]
    fn test_empty_cell_is_invalid() {
        let g = grid(&["0.2", "120"]);
        let r = resolve(&g, CellPos::new(0, 0), CellPos::new(1, 0));
        assert_eq!(r.outcome(), SwapOutcome::Invalid);
    }

    #[test]
    fn test_swap_without_match_is_rejected_and_grid_untouched() {
        let g = grid(&["012", "120", "201"]);
        let before = g.clone();
        let r = resolve(&g, CellPos::new(0, 0), CellPos::new(1, 0));
        assert_eq!(r, Resolution::Rejected);
        assert_eq!(g, before);
    }

    #[test]
    fn test_swap_forming_match_is_accepted() {
        // Moving the 1 at (2,1) up completes row 0.
        let g = grid(&["1102", "0210", "2021"]);
        let r = resolve(&g, CellPos::new(2, 0), CellPos::new(2, 1));
        let Resolution::Accepted(next) = r else {
            panic!("expected accepted, got {r:?}");
        };
        assert!(matcher::has_runs(&next));
        assert_eq!(next.at(CellPos::new(2, 0)).map(|o| o.kind), Some(GemKind(1)));
    }

    #[test]
    fn test_pending_run_elsewhere_accepts_swap() {
        // Row 0 still holds an unresolved run; the swap itself lines nothing up.
        let g = grid(&["3334", "0120", "1201", "2012"]);
        let r = resolve(&g, CellPos::new(0, 2), CellPos::new(1, 2));
        let Resolution::Accepted(next) = r else {
            panic!("expected accepted, got {r:?}");
        };
        assert_eq!(next.at(CellPos::new(0, 2)).map(|o| o.kind), Some(GemKind(2)));
        assert_eq!(next.at(CellPos::new(1, 2)).map(|o| o.kind), Some(GemKind(1)));
    }
}
