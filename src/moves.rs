//! Deadlock detection: is there any single adjacent swap that lines up three equal kinds?

use crate::grid::Grid;

/// Three-cell shapes that one adjacent swap turns into a horizontal run. Each is also read
/// transposed, which covers the vertical runs.
const PATTERNS: [[(isize, isize); 3]; 8] = [
    // One gem below the line at the left, middle or right position.
    [(0, 1), (1, 0), (2, 0)],
    [(0, 0), (1, 1), (2, 0)],
    [(0, 0), (1, 0), (2, 1)],
    // One gem above the line.
    [(0, 0), (1, 1), (2, 1)],
    [(0, 1), (1, 0), (2, 1)],
    [(0, 1), (1, 1), (2, 0)],
    // Gapped lines: XX.X and X.XX.
    [(0, 0), (1, 0), (3, 0)],
    [(0, 0), (2, 0), (3, 0)],
];

/// True as soon as one playable move exists anywhere on the grid.
pub fn has_legal_move(grid: &Grid) -> bool {
    for x in 0..grid.width() as isize {
        for y in 0..grid.height() as isize {
            for pattern in &PATTERNS {
                if pattern_matches(grid, x, y, pattern, false)
                    || pattern_matches(grid, x, y, pattern, true)
                {
                    return true;
                }
            }
        }
    }
    false
}

fn pattern_matches(
    grid: &Grid,
    x: isize,
    y: isize,
    pattern: &[(isize, isize); 3],
    transposed: bool,
) -> bool {
    let kind_at = |(dx, dy): (isize, isize)| {
        let (dx, dy) = if transposed { (dy, dx) } else { (dx, dy) };
        grid.kind_at_signed(x + dx, y + dy)
    };
    let Some(first) = kind_at(pattern[0]) else {
        return false;
    };
    kind_at(pattern[1]) == Some(first) && kind_at(pattern[2]) == Some(first)
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
    fn test_bent_shape_is_a_move() {
        assert!(has_legal_move(&grid(&["1102", "0010", "2323"])));
    }

    #[test]
    fn test_vertical_bent_shape_is_a_move() {
        assert!(has_legal_move(&grid(&["10", "10", "01", "23"])));
    }

    #[test]
    fn test_gapped_line_is_a_move() {
        assert!(has_legal_move(&grid(&["5505", "0123"])));
        assert!(has_legal_move(&grid(&["5055", "0123"])));
    }

    #[test]
    fn test_vertical_gapped_line_is_a_move() {
        assert!(has_legal_move(&grid(&["40", "41", "02", "43"])));
    }

    #[test]
    fn test_deadlocked_board() {
        // Rows cycle through four kinds shifted by two: no swap lines up three.
        let g = grid(&["0123", "2301", "0123", "2301"]);
        assert!(!has_legal_move(&g));
    }

    #[test]
    fn test_empty_cells_never_match() {
        let g = Grid::new(4, 4);
        assert!(!has_legal_move(&g));
    }
}
