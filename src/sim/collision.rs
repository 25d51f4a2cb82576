//! Grid collision with per-axis wall sliding

use glam::Vec2;

use super::grid::TileGrid;

/// Apply `delta` to `pos`, resolving each axis independently
///
/// The X move is kept only if the destination cell (at the current Y) is
/// open, then the Y move likewise at the resulting X. Blocked on one axis,
/// the mover still slides along the other.
pub fn slide_move(grid: &TileGrid, pos: Vec2, delta: Vec2) -> Vec2 {
    let mut out = pos;

    let nx = pos.x + delta.x;
    if !grid.is_wall(nx.floor() as i32, out.y.floor() as i32) {
        out.x = nx;
    }

    let ny = pos.y + delta.y;
    if !grid.is_wall(out.x.floor() as i32, ny.floor() as i32) {
        out.y = ny;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> TileGrid {
        TileGrid::parse(&["#####", "#...#", "#...#", "#####"]).unwrap()
    }

    #[test]
    fn test_free_move() {
        let p = slide_move(&corridor(), Vec2::new(1.5, 1.5), Vec2::new(0.2, 0.3));
        assert!((p - Vec2::new(1.7, 1.8)).length() < 1e-6);
    }

    #[test]
    fn test_slides_along_wall() {
        // Pushing diagonally into the north wall keeps the X component
        let p = slide_move(&corridor(), Vec2::new(2.5, 1.05), Vec2::new(0.1, -0.1));
        assert!((p.x - 2.6).abs() < 1e-6);
        assert!((p.y - 1.05).abs() < 1e-6);
    }

    #[test]
    fn test_blocked_both_axes_in_corner() {
        let start = Vec2::new(1.02, 1.02);
        let p = slide_move(&corridor(), start, Vec2::new(-0.05, -0.05));
        assert_eq!(p, start);
    }
}
