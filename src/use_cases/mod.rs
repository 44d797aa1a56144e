// Use cases layer: application workflows for the game server.

pub mod game;
pub mod lobby;
pub mod session;
pub mod types;

pub use lobby::{Lobby, LobbyError, Player};
pub use session::{GameSession, SessionSettings};
pub use types::{GameEvent, GamePhase, PlayerId, ServerEvent};
