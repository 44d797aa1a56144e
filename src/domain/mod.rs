// Domain layer: core simulation types and rules.

pub mod collision;
pub mod state;
pub mod teams;
pub mod tuning;
pub mod world;

pub use state::{Direction, Frog, Obstacle, ObstacleKind, TeamId, WorldSnapshot};
pub use tuning::GameTuning;
pub use world::{GameWorld, MoveOutcome, MoveRejection, TickResult};
