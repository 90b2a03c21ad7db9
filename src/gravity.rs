//! Gravity and refill: compact each column downward, then fill the vacated top cells.

use crate::gem::GemId;
use crate::grid::{CellPos, Grid, Occupant};

/// A gem that changed cell during compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub id: GemId,
    pub from: CellPos,
    pub to: CellPos,
}

/// What [`collapse`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collapse {
    /// Columns that had at least one empty cell, ascending.
    pub columns: Vec<usize>,
    pub falls: Vec<Fall>,
}

impl Collapse {
    pub fn is_noop(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Bottom-align the gems of every column, keeping their relative order. Full columns are left
/// alone.
pub fn collapse(grid: &mut Grid) -> Collapse {
    let mut out = Collapse::default();
    let height = grid.height();
    for x in 0..grid.width() {
        let mut survivors: Vec<(usize, Occupant)> = (0..height)
            .filter_map(|y| grid.get(x, y).map(|o| (y, o)))
            .collect();
        if survivors.len() == height {
            continue;
        }
        out.columns.push(x);
        for y in (0..height).rev() {
            let pos = CellPos::new(x, y);
            match survivors.pop() {
                Some((from_y, occupant)) => {
                    grid.set(pos, Some(occupant));
                    if from_y != y {
                        out.falls.push(Fall {
                            id: occupant.id,
                            from: CellPos::new(x, from_y),
                            to: pos,
                        });
                    }
                }
                None => {
                    grid.set(pos, None);
                }
            }
        }
    }
    out
}

/// Fill every empty cell with `spawn(pos, slot)`, where `slot` counts the column's empty cells
/// from the bottom (0 = lowest). Returns the filled cells.
pub fn refill<F>(grid: &mut Grid, mut spawn: F) -> Vec<CellPos>
where
    F: FnMut(CellPos, usize) -> Occupant,
{
    let mut filled = Vec::new();
    for x in 0..grid.width() {
        let empties: Vec<usize> = (0..grid.height())
            .filter(|&y| grid.get(x, y).is_none())
            .collect();
        for (slot, &y) in empties.iter().rev().enumerate() {
            let pos = CellPos::new(x, y);
            grid.set(pos, Some(spawn(pos, slot)));
            filled.push(pos);
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gem::GemKind;

    fn column(kinds: &[Option<u8>]) -> Grid {
        Grid::from_kinds(1, kinds.len(), kinds.iter().map(|k| k.map(GemKind)).collect::<Vec<_>>())
    }

    #[test]
    fn test_collapse_bottom_aligns_and_keeps_order() {
        let mut g = column(&[Some(1), None, Some(2), None, Some(3)]);
        let report = collapse(&mut g);
        assert_eq!(report.columns, vec![0]);
        assert_eq!(
            g.kinds(),
            vec![None, None, Some(GemKind(1)), Some(GemKind(2)), Some(GemKind(3))]
        );
        // Gem 3 stays put; 2 and 1 fall.
        assert_eq!(report.falls.len(), 2);
        assert!(report.falls.iter().all(|f| f.to.y > f.from.y));
    }

    #[test]
    fn test_full_column_untouched() {
        let mut g = column(&[Some(1), Some(2), Some(3)]);
        let before = g.clone();
        let report = collapse(&mut g);
        assert!(report.is_noop());
        assert_eq!(g, before);
    }

    #[test]
    fn test_refill_slots_count_from_bottom() {
        let mut g = column(&[None, None, Some(4)]);
        let mut seen = Vec::new();
        let filled = refill(&mut g, |pos, slot| {
            seen.push((pos.y, slot));
            Occupant {
                id: GemId(100 + slot as u32),
                kind: GemKind(0),
            }
        });
        assert_eq!(filled.len(), 2);
        assert_eq!(seen, vec![(1, 0), (0, 1)]);
        assert!(g.is_full());
    }

    #[test]
    fn test_rows_0_2_4_occupied_end_up_contiguous() {
        let mut g = column(&[Some(1), None, Some(2), None, Some(3), None]);
        collapse(&mut g);
        assert_eq!(
            g.kinds()[3..],
            [Some(GemKind(1)), Some(GemKind(2)), Some(GemKind(3))]
        );
        refill(&mut g, |pos, _| Occupant {
            id: GemId(50 + pos.y as u32),
            kind: GemKind(9),
        });
        assert!(g.is_full());
        assert_eq!(g.kinds()[..3], [Some(GemKind(9)); 3]);
    }
}
