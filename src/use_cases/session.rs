// The single game session: lobby roster, arena and the phase that gates them.

use super::lobby::{Lobby, LobbyError, Player};
use super::types::{GamePhase, PlayerId};
use crate::domain::{
    Direction, GameTuning, GameWorld, MoveOutcome, MoveRejection, TeamId, TickResult,
    WorldSnapshot,
};
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::info;

/// Settings a session is built from.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Players needed to start the game; later joins beyond this are refused.
    pub capacity: usize,
    /// Divisor for team pre-assignment.
    pub players_per_team: u32,
    /// Period the clock is decremented by on every tick.
    pub tick_interval: Duration,
    pub tuning: GameTuning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinAccepted {
    pub player_id: PlayerId,
    /// True when this join filled the lobby and started the game.
    pub started: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No game running; nothing to publish.
    Idle,
    State(WorldSnapshot),
    Ended { winner: Option<TeamId> },
}

pub struct GameSession {
    settings: SessionSettings,
    lobby: Lobby,
    world: GameWorld,
    phase: GamePhase,
    rng: StdRng,
}

impl GameSession {
    pub fn new(settings: SessionSettings, rng: StdRng) -> Self {
        Self {
            settings,
            lobby: Lobby::new(settings.capacity),
            world: GameWorld::new(settings.tuning),
            phase: GamePhase::Lobby,
            rng,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        self.lobby.players()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot()
    }

    /// Admits a player. The join that fills the lobby deals teams, builds the
    /// arena and starts the game; this happens at most once per session.
    pub fn join(&mut self) -> Result<JoinAccepted, LobbyError> {
        let player_id = self.lobby.join()?;
        info!(player_id, players = self.lobby.players().len(), "player joined");

        let started = self.phase == GamePhase::Lobby && self.lobby.is_full();
        if started {
            self.start_game();
        }
        Ok(JoinAccepted { player_id, started })
    }

    pub fn leave(&mut self, player_id: PlayerId) {
        if self.lobby.leave(player_id) {
            info!(player_id, "player left");
        }
    }

    /// Applies a move from any connected player to any frog.
    pub fn apply_move(
        &mut self,
        player_id: PlayerId,
        frog_ref: i64,
        dir: Direction,
    ) -> Result<MoveOutcome, MoveRejection> {
        if self.phase != GamePhase::Running {
            return Err(MoveRejection::Inactive);
        }
        if !self.lobby.contains(player_id) {
            return Err(MoveRejection::UnknownPlayer);
        }
        self.world.apply_move(frog_ref, dir)
    }

    /// One scheduler tick. Ends the game on a win or when the clock runs out.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != GamePhase::Running {
            return TickOutcome::Idle;
        }

        match self.world.advance(self.settings.tick_interval.as_secs_f32()) {
            TickResult::Running => TickOutcome::State(self.world.snapshot()),
            TickResult::Won { team } => {
                self.phase = GamePhase::Finished;
                info!(team, "frog reached the goal");
                TickOutcome::Ended { winner: Some(team) }
            }
            TickResult::TimedOut => {
                self.phase = GamePhase::Finished;
                info!("clock ran out");
                TickOutcome::Ended { winner: None }
            }
        }
    }

    fn start_game(&mut self) {
        self.lobby
            .assign_teams(self.settings.players_per_team, &mut self.rng);
        self.world.init(&mut self.rng);
        self.phase = GamePhase::Running;

        let teams: Vec<Option<TeamId>> = self.lobby.players().iter().map(|p| p.team).collect();
        info!(?teams, timer = self.world.timer(), "game started");
    }
}
