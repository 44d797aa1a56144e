use crate::domain::GameTuning;
use crate::use_cases::SessionSettings;
use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};
use tracing::warn;

// Runtime/server constants (not gameplay tuning).
pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const EVENT_BROADCAST_CAPACITY: usize = 128;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Everything the server needs to boot.
#[derive(Debug, Clone, Copy)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
    pub session: SessionSettings,
}

/// Settings that would produce a broken game.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoPlayers,
    NoTeams,
    NoPlayersPerTeam,
    ZeroTickInterval,
    /// Pre-assignment would deal a team id past the last team.
    TeamOverflow {
        players: usize,
        teams: u32,
        players_per_team: u32,
    },
    /// Frogs or obstacles do not fit inside the arena.
    ArenaTooSmall,
    /// Obstacle-free band is taller than the arena.
    SpawnBandTooTall,
    /// Sizes, step and starting clock must be finite and above zero.
    NotPositive { key: &'static str },
    /// Margins, bands and penalties must be finite and not below zero.
    Negative { key: &'static str },
    /// Teams are spaced too tightly for a frog to fit at the edges.
    TeamsDoNotFit,
    /// Spawn margin puts frogs above the top or below the bottom edge.
    SpawnOffArena,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            session: SessionSettings {
                capacity: 2,
                players_per_team: 1,
                tick_interval: DEFAULT_TICK_INTERVAL,
                tuning: GameTuning::default(),
            },
        }
    }
}

impl ServerSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key/value source; unset or unparseable keys
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let t = d.session.tuning;
        let get = |key: &str, default| parse_or(&lookup, key, default);

        let tick_ms = parse_or(&lookup, "TICK_RATE_MS", d.session.tick_interval.as_millis() as u64);

        Self {
            host: parse_or(&lookup, "HOST", d.host),
            port: parse_or(&lookup, "PORT", d.port),
            session: SessionSettings {
                capacity: parse_or(&lookup, "NUM_PLAYERS", d.session.capacity),
                players_per_team: parse_or(&lookup, "PLAYERS_PER_TEAM", d.session.players_per_team),
                tick_interval: Duration::from_millis(tick_ms),
                tuning: GameTuning {
                    width: get("GAME_WIDTH", t.width),
                    height: get("GAME_HEIGHT", t.height),
                    frog_size: get("FROG_SIZE", t.frog_size),
                    obstacle_size: get("OBSTACLE_SIZE", t.obstacle_size),
                    num_teams: parse_or(&lookup, "NUM_TEAMS", t.num_teams),
                    obstacle_count: parse_or(&lookup, "OBSTACLE_COUNT", t.obstacle_count),
                    move_step: get("MOVE_STEP", t.move_step),
                    start_timer: get("START_TIMER_SECS", t.start_timer),
                    collision_penalty: get("COLLISION_PENALTY_SECS", t.collision_penalty),
                    spawn_margin: get("SPAWN_MARGIN", t.spawn_margin),
                    spawn_band: get("SPAWN_BAND", t.spawn_band),
                },
            },
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.session;
        let t = &s.tuning;

        if s.capacity == 0 {
            return Err(ConfigError::NoPlayers);
        }
        if t.num_teams == 0 {
            return Err(ConfigError::NoTeams);
        }
        if s.players_per_team == 0 {
            return Err(ConfigError::NoPlayersPerTeam);
        }
        if s.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        for (key, value) in [
            ("GAME_WIDTH", t.width),
            ("GAME_HEIGHT", t.height),
            ("FROG_SIZE", t.frog_size),
            ("OBSTACLE_SIZE", t.obstacle_size),
            ("MOVE_STEP", t.move_step),
            ("START_TIMER_SECS", t.start_timer),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { key });
            }
        }
        for (key, value) in [
            ("COLLISION_PENALTY_SECS", t.collision_penalty),
            ("SPAWN_MARGIN", t.spawn_margin),
            ("SPAWN_BAND", t.spawn_band),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { key });
            }
        }
        if s.capacity as u64 > u64::from(t.num_teams) * u64::from(s.players_per_team) {
            return Err(ConfigError::TeamOverflow {
                players: s.capacity,
                teams: t.num_teams,
                players_per_team: s.players_per_team,
            });
        }
        if t.frog_size > t.width
            || t.frog_size > t.height
            || t.obstacle_size > t.width
            || t.obstacle_size > t.height
        {
            return Err(ConfigError::ArenaTooSmall);
        }
        if t.spawn_band > t.height {
            return Err(ConfigError::SpawnBandTooTall);
        }
        // Outermost frogs sit half a frog inside the first and last spacing mark.
        if t.width / (t.num_teams as f32 + 1.0) < t.frog_size / 2.0 {
            return Err(ConfigError::TeamsDoNotFit);
        }
        if t.spawn_margin > t.height - t.frog_size {
            return Err(ConfigError::SpawnOffArena);
        }
        Ok(())
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid config value; using default");
            default
        }),
        None => default,
    }
}
