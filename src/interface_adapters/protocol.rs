// Wire protocol DTOs and conversions for client-facing WebSocket messages.

use crate::domain::{Direction, Frog, Obstacle, ObstacleKind, TeamId, WorldSnapshot};
use crate::use_cases::{PlayerId, ServerEvent};
use serde::{Deserialize, Deserializer, Serialize, de};

/// Messages the server sends to connected clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    // Private to one connection: the id it was admitted with.
    Welcome {
        #[serde(rename = "yourId")]
        your_id: PlayerId,
    },
    Start {
        #[serde(rename = "yourId")]
        your_id: PlayerId,
    },
    State(StateDto),
    End {
        winner: Option<TeamId>,
    },
    // Sent right before the server closes the connection.
    Error {
        message: String,
    },
}

/// Messages clients send to the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Move {
        #[serde(rename = "frogId", deserialize_with = "frog_ref")]
        frog_id: i64,
        dir: DirectionDto,
    },
    // Any other type tag; ignored.
    #[serde(other)]
    Other,
}

// Browsers may send whole numbers as `1.0`; fractional refs are refused.
fn frog_ref<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(id) = number.as_i64() {
        return Ok(id);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(de::Error::custom(format!(
            "frogId {number} is not a whole number"
        ))),
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionDto {
    Up,
    Down,
    Left,
    Right,
}

impl From<DirectionDto> for Direction {
    fn from(dir: DirectionDto) -> Self {
        match dir {
            DirectionDto::Up => Direction::Up,
            DirectionDto::Down => Direction::Down,
            DirectionDto::Left => Direction::Left,
            DirectionDto::Right => Direction::Right,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StateDto {
    pub frogs: Vec<FrogDto>,
    pub obstacles: Vec<ObstacleDto>,
    pub timer: f32,
}

impl From<WorldSnapshot> for StateDto {
    fn from(snapshot: WorldSnapshot) -> Self {
        Self {
            frogs: snapshot.frogs.iter().map(FrogDto::from).collect(),
            obstacles: snapshot.obstacles.iter().map(ObstacleDto::from).collect(),
            timer: snapshot.timer,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FrogDto {
    pub id: u32,
    pub team: TeamId,
    pub x: f32,
    pub y: f32,
    pub alive: bool,
}

impl From<&Frog> for FrogDto {
    fn from(frog: &Frog) -> Self {
        Self {
            id: frog.id,
            team: frog.team,
            x: frog.x,
            y: frog.y,
            alive: frog.alive,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleDto {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: ObstacleKindDto,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKindDto {
    Block,
}

impl From<&Obstacle> for ObstacleDto {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            x: obstacle.x,
            y: obstacle.y,
            kind: match obstacle.kind {
                ObstacleKind::Block => ObstacleKindDto::Block,
            },
        }
    }
}

impl From<ServerEvent> for ServerMessage {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::Start { your_id } => ServerMessage::Start { your_id },
            ServerEvent::State(snapshot) => ServerMessage::State(snapshot.into()),
            ServerEvent::End { winner } => ServerMessage::End { winner },
        }
    }
}
