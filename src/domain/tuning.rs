/// Gameplay tuning for the arena, frogs and obstacles.
///
/// Keep this separate from runtime/server configuration (ports, channel sizes, etc.).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameTuning {
    /// Arena width in pixels.
    pub width: f32,

    /// Arena height in pixels. The goal line is `y = 0`.
    pub height: f32,

    /// Side length of a frog's square hitbox.
    pub frog_size: f32,

    /// Side length of an obstacle's square hitbox.
    pub obstacle_size: f32,

    /// Number of teams, which is also the number of frogs.
    pub num_teams: u32,

    /// Obstacles generated per game.
    pub obstacle_count: usize,

    /// Positional delta applied by one move command.
    pub move_step: f32,

    /// Seconds on the clock when a game starts.
    pub start_timer: f32,

    /// Seconds removed from the clock when a frog hits an obstacle.
    pub collision_penalty: f32,

    /// Gap between a spawned frog and the bottom edge.
    pub spawn_margin: f32,

    /// Height of the bottom band kept free of obstacles.
    pub spawn_band: f32,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            frog_size: 20.0,
            obstacle_size: 40.0,
            num_teams: 4,
            obstacle_count: 10,
            move_step: 20.0,
            start_timer: 180.0,
            collision_penalty: 5.0,
            spawn_margin: 10.0,
            spawn_band: 200.0,
        }
    }
}

impl GameTuning {
    /// Largest x a frog may occupy.
    pub fn max_frog_x(&self) -> f32 {
        self.width - self.frog_size
    }

    /// Largest y a frog may occupy.
    pub fn max_frog_y(&self) -> f32 {
        self.height - self.frog_size
    }
}
