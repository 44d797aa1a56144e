// Axis-aligned box overlap checks.

use super::state::Obstacle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self { x, y, size }
    }
}

/// Strict overlap on both axes. Boxes that only share an edge do not overlap.
pub fn overlaps(a: Aabb, b: Aabb) -> bool {
    a.x < b.x + b.size && a.x + a.size > b.x && a.y < b.y + b.size && a.y + a.size > b.y
}

/// Returns true if `mover` overlaps any obstacle (naive O(n) scan).
pub fn hits_any(mover: Aabb, obstacles: &[Obstacle], obstacle_size: f32) -> bool {
    obstacles
        .iter()
        .any(|o| overlaps(mover, Aabb::new(o.x, o.y, obstacle_size)))
}
