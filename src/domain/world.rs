// Authoritative arena state and the rules that mutate it.

use super::collision::{Aabb, hits_any};
use super::state::{Direction, Frog, Obstacle, ObstacleKind, TeamId, WorldSnapshot};
use super::tuning::GameTuning;
use rand::Rng;

/// Why a move command had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// No game is running.
    Inactive,
    /// Sender is not in the lobby roster.
    UnknownPlayer,
    /// Frog index out of range.
    UnknownFrog,
    FrogNotAlive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Moved { x: f32, y: f32 },
    /// Frog hit an obstacle, was sent back to spawn and the clock was penalized.
    Collided { timer: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Running,
    Won { team: TeamId },
    TimedOut,
}

pub struct GameWorld {
    tuning: GameTuning,
    frogs: Vec<Frog>,
    obstacles: Vec<Obstacle>,
    timer: f32,
}

impl GameWorld {
    /// Empty arena; call [`GameWorld::init`] before the first tick.
    pub fn new(tuning: GameTuning) -> Self {
        Self {
            tuning,
            frogs: Vec::new(),
            obstacles: Vec::new(),
            timer: tuning.start_timer,
        }
    }

    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    pub fn frogs(&self) -> &[Frog] {
        &self.frogs
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Resets the clock, spawns one frog per team and scatters obstacles over
    /// the upper play area.
    pub fn init<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let t = self.tuning;
        self.timer = t.start_timer;

        self.frogs = (0..t.num_teams)
            .map(|team| {
                let (x, y) = spawn_position(&t, team);
                Frog {
                    id: team,
                    team,
                    x,
                    y,
                    alive: true,
                }
            })
            .collect();

        let x_range = t.width - t.obstacle_size;
        let y_range = t.height - t.spawn_band;
        self.obstacles = (0..t.obstacle_count)
            .map(|_| Obstacle {
                x: rng.random::<f32>() * x_range,
                y: rng.random::<f32>() * y_range,
                kind: ObstacleKind::Block,
            })
            .collect();
    }

    /// Steps a frog one move in `dir`, clamps it to the arena and sends it back
    /// to spawn with a clock penalty if it lands on an obstacle.
    pub fn apply_move(
        &mut self,
        frog_ref: i64,
        dir: Direction,
    ) -> Result<MoveOutcome, MoveRejection> {
        let t = self.tuning;
        let frog = usize::try_from(frog_ref)
            .ok()
            .and_then(|i| self.frogs.get_mut(i))
            .ok_or(MoveRejection::UnknownFrog)?;
        if !frog.alive {
            return Err(MoveRejection::FrogNotAlive);
        }

        let (dx, dy) = dir.delta();
        frog.x = clamp_axis(frog.x + dx * t.move_step, t.max_frog_x());
        frog.y = clamp_axis(frog.y + dy * t.move_step, t.max_frog_y());

        if hits_any(
            Aabb::new(frog.x, frog.y, t.frog_size),
            &self.obstacles,
            t.obstacle_size,
        ) {
            let (x, y) = spawn_position(&t, frog.team);
            frog.x = x;
            frog.y = y;
            // May go negative; the next tick reports the timeout.
            self.timer -= t.collision_penalty;
            return Ok(MoveOutcome::Collided { timer: self.timer });
        }

        Ok(MoveOutcome::Moved {
            x: frog.x,
            y: frog.y,
        })
    }

    /// Advances the clock by `dt` seconds and evaluates the end conditions.
    /// A frog on the goal line wins before the clock is checked; ties go to the
    /// lowest team id.
    pub fn advance(&mut self, dt: f32) -> TickResult {
        self.timer -= dt;

        if let Some(frog) = self.frogs.iter().find(|f| f.y <= 0.0) {
            return TickResult::Won { team: frog.team };
        }
        if self.timer <= 0.0 {
            return TickResult::TimedOut;
        }
        TickResult::Running
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            frogs: self.frogs.clone(),
            obstacles: self.obstacles.clone(),
            timer: self.timer,
        }
    }
}

/// Spawn point for a team's frog: evenly spaced along the bottom edge.
pub fn spawn_position(t: &GameTuning, team: TeamId) -> (f32, f32) {
    let spacing = t.width / (t.num_teams + 1) as f32;
    let x = spacing * (team + 1) as f32 - t.frog_size / 2.0;
    let y = t.height - t.frog_size - t.spawn_margin;
    (x, y)
}

fn clamp_axis(value: f32, max: f32) -> f32 {
    value.min(max).max(0.0)
}
