// Use-case level inputs/outputs for the game loop.

use super::lobby::LobbyError;
use crate::domain::{Direction, TeamId, WorldSnapshot};
use tokio::sync::oneshot;

pub type PlayerId = u64;

#[derive(Debug)]
pub enum GameEvent {
    /// Ask for a lobby slot; the world task answers with the assigned id.
    Join {
        reply: oneshot::Sender<Result<PlayerId, LobbyError>>,
    },
    Leave {
        player_id: PlayerId,
    },
    Move {
        player_id: PlayerId,
        frog_id: i64,
        dir: Direction,
    },
}

/// Events fanned out to every connected client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Lobby filled and the game began. Carries the id of the player whose
    /// join filled the lobby.
    Start { your_id: PlayerId },
    State(WorldSnapshot),
    /// Terminal event; `None` means the clock ran out.
    End { winner: Option<TeamId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Lobby,
    Running,
    Finished,
}
