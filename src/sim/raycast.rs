//! DDA grid traversal raycasting
//!
//! One ray per screen column. Distances are perpendicular to the view
//! direction so projected wall heights carry no fisheye bend.

use glam::{IVec2, Vec2};

use super::grid::{Cell, TileGrid};

/// Which family of grid lines the ray crossed last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// A vertical line (constant x); the face points east/west
    X,
    /// A horizontal line (constant y); the face points north/south
    Y,
}

/// Outcome of a cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Wall,
    /// Left the grid without striking a wall
    Unbounded,
}

/// Result of one raycast
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub kind: HitKind,
    /// Perpendicular distance to the struck face
    pub distance: f32,
    pub axis: Axis,
    /// Fractional position across the struck face, 0..1
    pub texture_u: f32,
    /// Struck cell (or the first cell outside the grid)
    pub cell: IVec2,
    /// Grid lines crossed
    pub steps: u32,
}

impl RayHit {
    #[inline]
    pub fn is_wall(&self) -> bool {
        self.kind == HitKind::Wall
    }
}

/// Per-column camera-space angle offsets, built once for a fixed FOV
///
/// Columns are spaced evenly across the projection plane rather than
/// evenly in angle, so straight walls stay straight on screen.
#[derive(Debug, Clone)]
pub struct RayTable {
    offsets: Vec<f32>,
    cosines: Vec<f32>,
}

impl RayTable {
    pub fn new(columns: usize, fov: f32) -> Self {
        let half_plane = (fov * 0.5).tan();
        let offsets: Vec<f32> = (0..columns)
            .map(|c| {
                let camera_x = 2.0 * c as f32 / columns as f32 - 1.0;
                (camera_x * half_plane).atan()
            })
            .collect();
        let cosines = offsets.iter().map(|o| o.cos()).collect();
        Self { offsets, cosines }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.offsets.len()
    }

    /// Angle offset from the view direction for a column
    #[inline]
    pub fn offset(&self, column: usize) -> f32 {
        self.offsets[column]
    }

    #[inline]
    pub fn cos_offset(&self, column: usize) -> f32 {
        self.cosines[column]
    }

    /// Cast the ray for `column` from a viewer at `origin` facing `view_angle`
    pub fn cast(&self, grid: &TileGrid, origin: Vec2, view_angle: f32, column: usize) -> RayHit {
        cast_ray(
            grid,
            origin,
            view_angle + self.offsets[column],
            self.cosines[column],
        )
    }
}

/// Trace a ray through `grid` until it enters a wall or leaves the grid
///
/// `cos_offset` is the cosine of the ray's angle relative to the view
/// direction; it projects the ray length onto the view axis. Terminates
/// after at most `width + height` grid-line crossings.
pub fn cast_ray(grid: &TileGrid, origin: Vec2, angle: f32, cos_offset: f32) -> RayHit {
    let dir = Vec2::new(angle.cos(), angle.sin());
    let mut cell = origin.floor().as_ivec2();

    // Ray length to cross one full cell along each axis
    let delta = Vec2::new(
        if dir.x == 0.0 { f32::INFINITY } else { (1.0 / dir.x).abs() },
        if dir.y == 0.0 { f32::INFINITY } else { (1.0 / dir.y).abs() },
    );
    let step = IVec2::new(
        if dir.x < 0.0 { -1 } else { 1 },
        if dir.y < 0.0 { -1 } else { 1 },
    );
    // Ray length to the first line on each axis
    let first_line = |pos: f32, cell: i32, dir: f32, delta: f32| {
        if delta.is_infinite() {
            f32::INFINITY
        } else if dir < 0.0 {
            (pos - cell as f32) * delta
        } else {
            (cell as f32 + 1.0 - pos) * delta
        }
    };
    let mut side = Vec2::new(
        first_line(origin.x, cell.x, dir.x, delta.x),
        first_line(origin.y, cell.y, dir.y, delta.y),
    );

    let max_steps = (grid.width() + grid.height()) as u32;
    let mut axis = Axis::X;
    let mut steps = 0;
    let mut kind = HitKind::Unbounded;

    while steps < max_steps {
        if side.x < side.y {
            side.x += delta.x;
            cell.x += step.x;
            axis = Axis::X;
        } else {
            side.y += delta.y;
            cell.y += step.y;
            axis = Axis::Y;
        }
        steps += 1;

        match grid.get(cell.x, cell.y) {
            Some(Cell::Wall) => {
                kind = HitKind::Wall;
                break;
            }
            Some(Cell::Empty) => {}
            None => break,
        }
    }

    let ray_length = match axis {
        Axis::X => side.x - delta.x,
        Axis::Y => side.y - delta.y,
    }
    .max(0.0);
    let hit_point = origin + dir * ray_length;
    let along = match axis {
        Axis::X => hit_point.y,
        Axis::Y => hit_point.x,
    };

    RayHit {
        kind,
        distance: ray_length * cos_offset,
        axis,
        texture_u: along - along.floor(),
        cell,
        steps,
    }
}
