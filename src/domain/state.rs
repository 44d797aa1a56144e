// Domain-level simulation entities and input/snapshot types.

/// Team identifier in `0..num_teams`.
pub type TeamId = u32;

/// Move intent sent by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit delta for this direction in screen coordinates (+y points down).
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frog {
    /// Index clients use to address this frog; equal to its team id.
    pub id: u32,
    pub team: TeamId,
    pub x: f32,
    pub y: f32,
    // Nothing clears this yet; reaching the goal ends the game instead.
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub kind: ObstacleKind,
}

/// Full world view broadcast on every running tick.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub frogs: Vec<Frog>,
    pub obstacles: Vec<Obstacle>,
    pub timer: f32,
}
