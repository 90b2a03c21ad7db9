//! Grid: fixed-size board of optional gem references, plus screen layout mapping.
//!
//! Coordinates: (x, y) with x = column (left to right) and y = row (top to bottom).
//! Storage is a flat row-major buffer (`y * width + x`).

use crate::config::Geometry;
use crate::gem::{GemId, GemKind};

/// Continuous 2D coordinate in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    pub x: usize,
    pub y: usize,
}

impl CellPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// True if `other` is a 4-directional neighbour (Manhattan distance exactly 1).
    pub fn is_adjacent(self, other: Self) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }
}

impl From<(usize, usize)> for CellPos {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// What a grid cell holds: a reference to a gem entity plus a copy of its kind, so match
/// detection can run on a bare grid snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub id: GemId,
    pub kind: GemKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Occupant>>,
}

impl Grid {
    /// Empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    /// Grid from row-major kinds (`None` = empty). Ids are assigned in row-major order starting
    /// at 0. Extra items are ignored; missing ones leave cells empty.
    pub fn from_kinds<I>(width: usize, height: usize, kinds: I) -> Self
    where
        I: IntoIterator<Item = Option<GemKind>>,
    {
        let mut grid = Self::new(width, height);
        for (i, kind) in kinds.into_iter().take(width * height).enumerate() {
            grid.cells[i] = kind.map(|kind| Occupant {
                id: GemId(i as u32),
                kind,
            });
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    #[inline]
    pub fn contains(&self, pos: CellPos) -> bool {
        self.index(pos.x, pos.y).is_some()
    }

    /// Occupant at (x, y); `None` for empty or out-of-range cells.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Occupant> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    #[inline]
    pub fn at(&self, pos: CellPos) -> Option<Occupant> {
        self.get(pos.x, pos.y)
    }

    /// Kind at (x, y) with signed coordinates, so pattern scans can probe past the edges.
    #[inline]
    pub fn kind_at_signed(&self, x: isize, y: isize) -> Option<GemKind> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(x as usize, y as usize).map(|o| o.kind)
    }

    /// Set a cell. Returns false (and does nothing) when out of range.
    pub fn set(&mut self, pos: CellPos, occupant: Option<Occupant>) -> bool {
        match self.index(pos.x, pos.y) {
            Some(i) => {
                self.cells[i] = occupant;
                true
            }
            None => false,
        }
    }

    /// Empty a cell and return what it held.
    pub fn take(&mut self, pos: CellPos) -> Option<Occupant> {
        self.index(pos.x, pos.y).and_then(|i| self.cells[i].take())
    }

    /// Exchange two cells. Returns false when either is out of range.
    pub fn swap(&mut self, a: CellPos, b: CellPos) -> bool {
        match (self.index(a.x, a.y), self.index(b.x, b.y)) {
            (Some(i), Some(j)) => {
                self.cells.swap(i, j);
                true
            }
            _ => false,
        }
    }

    /// Cell currently holding the gem `id`.
    pub fn position_of(&self, id: GemId) -> Option<CellPos> {
        self.cells
            .iter()
            .position(|c| c.is_some_and(|o| o.id == id))
            .map(|i| CellPos::new(i % self.width, i / self.width))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Occupied cells in column-major order (x outer, y inner), the order gems are updated in.
    pub fn occupants(&self) -> impl Iterator<Item = (CellPos, Occupant)> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).filter_map(move |y| self.get(x, y).map(|o| (CellPos::new(x, y), o)))
        })
    }

    /// Kinds only, row-major. Two grids with equal kinds are equal boards for the rules.
    pub fn kinds(&self) -> Vec<Option<GemKind>> {
        self.cells.iter().map(|c| c.map(|o| o.kind)).collect()
    }
}

/// Maps between grid cells and screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub width: usize,
    pub height: usize,
    pub geometry: Geometry,
}

impl BoardLayout {
    pub const fn new(width: usize, height: usize, geometry: Geometry) -> Self {
        Self {
            width,
            height,
            geometry,
        }
    }

    /// Distance between the origins of neighbouring cells.
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.geometry.tile_size + self.geometry.padding
    }

    /// Resting (top-left) position of a cell's gem.
    pub fn cell_origin(&self, pos: CellPos) -> Vec2 {
        Vec2::new(
            self.geometry.margin_x + pos.x as f32 * self.pitch(),
            self.geometry.margin_y + pos.y as f32 * self.pitch(),
        )
    }

    /// Centre of a cell's tile; a pointer here always maps back to `pos`.
    pub fn cell_center(&self, pos: CellPos) -> Vec2 {
        let origin = self.cell_origin(pos);
        let half = self.geometry.tile_size / 2.0;
        Vec2::new(origin.x + half, origin.y + half)
    }

    /// Spawn position for the `slot`-th (0-based, counted upward) new gem above a column, so a
    /// refilled column falls in as a stack starting just above the board's top edge.
    pub fn spawn_origin(&self, x: usize, slot: usize) -> Vec2 {
        Vec2::new(
            self.geometry.margin_x + x as f32 * self.pitch(),
            self.geometry.margin_y - (slot as f32 + 1.0) * self.pitch(),
        )
    }

    /// Cell under a pointer, or `None` when the pointer is outside the board rectangle.
    pub fn pointer_to_cell(&self, coord: Vec2) -> Option<CellPos> {
        let g = &self.geometry;
        let pitch = self.pitch();
        let right = g.margin_x + pitch * self.width as f32;
        let bottom = g.margin_y + pitch * self.height as f32;
        if !(coord.x >= g.margin_x && coord.y >= g.margin_y && coord.x < right && coord.y < bottom)
        {
            return None;
        }
        let x = ((coord.x - g.margin_x) / pitch) as usize;
        let y = ((coord.y - g.margin_y) / pitch) as usize;
        (x < self.width && y < self.height).then_some(CellPos::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(ks: &[u8]) -> Vec<Option<GemKind>> {
        ks.iter().map(|&k| Some(GemKind(k))).collect()
    }

    #[test]
    fn test_get_out_of_range_is_none() {
        let grid = Grid::from_kinds(3, 2, kinds(&[0, 1, 2, 3, 4, 5]));
        assert_eq!(grid.get(2, 1).map(|o| o.kind), Some(GemKind(5)));
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 2), None);
        assert_eq!(grid.kind_at_signed(-1, 0), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let grid = Grid::from_kinds(2, 1, kinds(&[0, 1]));
        let mut snapshot = grid.clone();
        snapshot.swap(CellPos::new(0, 0), CellPos::new(1, 0));
        assert_eq!(grid.kinds(), kinds(&[0, 1]));
        assert_eq!(snapshot.kinds(), kinds(&[1, 0]));
    }

    #[test]
    fn test_position_of_follows_swap() {
        let mut grid = Grid::from_kinds(2, 2, kinds(&[0, 1, 2, 3]));
        let id = grid.get(0, 0).map(|o| o.id).unwrap();
        grid.swap(CellPos::new(0, 0), CellPos::new(0, 1));
        assert_eq!(grid.position_of(id), Some(CellPos::new(0, 1)));
    }

    #[test]
    fn test_adjacency() {
        let a = CellPos::new(1, 1);
        assert!(a.is_adjacent(CellPos::new(2, 1)));
        assert!(a.is_adjacent(CellPos::new(1, 0)));
        assert!(!a.is_adjacent(CellPos::new(2, 2)));
        assert!(!a.is_adjacent(a));
        assert!(!CellPos::new(0, 0).is_adjacent(CellPos::new(2, 0)));
    }

    #[test]
    fn test_pointer_to_cell() {
        let layout = BoardLayout::new(8, 8, Geometry::default());
        // margin 20/50, pitch 74
        assert_eq!(layout.pointer_to_cell(Vec2::new(20.0, 50.0)), Some(CellPos::new(0, 0)));
        assert_eq!(layout.pointer_to_cell(Vec2::new(95.0, 125.0)), Some(CellPos::new(1, 1)));
        assert_eq!(layout.pointer_to_cell(Vec2::new(19.9, 60.0)), None);
        assert_eq!(layout.pointer_to_cell(Vec2::new(20.0 + 74.0 * 8.0, 60.0)), None);
        assert_eq!(layout.pointer_to_cell(Vec2::new(600.0, 10.0)), None);
    }

    #[test]
    fn test_cell_center_round_trips() {
        let layout = BoardLayout::new(5, 4, Geometry::default());
        for y in 0..4 {
            for x in 0..5 {
                let pos = CellPos::new(x, y);
                assert_eq!(layout.pointer_to_cell(layout.cell_center(pos)), Some(pos));
            }
        }
    }
}
