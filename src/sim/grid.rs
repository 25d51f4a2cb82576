//! Tile grid shared by the raycaster, collision and minimap

use serde::{Deserialize, Serialize};

use super::level::LevelError;
use crate::consts::MAX_MAP_SIZE;

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Wall,
}

/// Rectangular wall/empty map, immutable once a level is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl TileGrid {
    /// Parse rows of `#` (wall) and `.`/space (empty)
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyGrid);
        }
        if width > MAX_MAP_SIZE || height > MAX_MAP_SIZE {
            return Err(LevelError::GridTooLarge { width, height });
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(LevelError::RaggedRow { row: y });
            }
            for (x, ch) in row.chars().enumerate() {
                cells.push(match ch {
                    '#' => Cell::Wall,
                    '.' | ' ' => Cell::Empty,
                    other => return Err(LevelError::UnknownCell { ch: other, x, y }),
                });
            }
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at integer coordinates, `None` outside the grid
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.cells[y as usize * self.width + x as usize])
    }

    /// Out-of-bounds counts as solid for movement
    #[inline]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        !matches!(self.get(x, y), Some(Cell::Empty))
    }

    /// True if every border cell is a wall
    pub fn is_enclosed(&self) -> bool {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..w).all(|x| self.get(x, 0) == Some(Cell::Wall) && self.get(x, h - 1) == Some(Cell::Wall))
            && (0..h)
                .all(|y| self.get(0, y) == Some(Cell::Wall) && self.get(w - 1, y) == Some(Cell::Wall))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_lookup() {
        let grid = TileGrid::parse(&["###", "#.#", "###"]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.get(1, 1), Some(Cell::Empty));
        assert_eq!(grid.get(0, 1), Some(Cell::Wall));
        assert_eq!(grid.get(3, 1), None);
        assert!(grid.is_wall(-1, 0));
        assert!(grid.is_enclosed());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            TileGrid::parse(&["###", "##"]),
            Err(LevelError::RaggedRow { row: 1 })
        ));
        assert!(matches!(
            TileGrid::parse(&["#x#"]),
            Err(LevelError::UnknownCell { ch: 'x', .. })
        ));
        let wide = "#".repeat(MAX_MAP_SIZE + 1);
        assert!(matches!(
            TileGrid::parse(&[wide.as_str()]),
            Err(LevelError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_open_border_not_enclosed() {
        let grid = TileGrid::parse(&["#.#", "#.#", "###"]).unwrap();
        assert!(!grid.is_enclosed());
    }
}
