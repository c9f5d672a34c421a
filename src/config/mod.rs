//! Configuration module - environment variable parsing

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use std::str::FromStr;

use rand::Rng;

use crate::game::combat::MAX_ENEMY_DIFFICULTY;
use crate::util::rate_limit::COMMAND_RATE_LIMIT;

/// Ports a controller port is drawn from when none is configured
pub const COMMAND_PORT_RANGE: RangeInclusive<u16> = 10038..=10099;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Command channel binding address
    pub command_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Arena width in world units
    pub arena_width: f32,
    /// Arena height in world units (the floor line)
    pub arena_height: f32,

    /// Enemy difficulty multiplier, fixed at spawn
    pub enemy_difficulty: u32,
    /// Number of enemies spawned at match start
    pub enemy_count: usize,

    /// Max remote commands per second per connection (0 = unlimited)
    pub command_rate_limit: u32,
    /// Hold the match until a remote controller connects
    pub wait_for_controller: bool,
    /// Keep the game-over screen up until quit instead of exiting
    pub hold_game_over: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command_addr: SocketAddr::from(([0, 0, 0, 0], *COMMAND_PORT_RANGE.start())),
            log_level: "info".to_string(),
            arena_width: 1280.0,
            arena_height: 720.0,
            enemy_difficulty: 1,
            enemy_count: 1,
            command_rate_limit: COMMAND_RATE_LIMIT,
            wait_for_controller: false,
            hold_game_over: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host: IpAddr = parse_or(&lookup, "COMMAND_HOST", defaults.command_addr.ip())?;
        let port: u16 = match lookup("COMMAND_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("COMMAND_PORT"))?,
            None => rand::thread_rng().gen_range(COMMAND_PORT_RANGE),
        };

        let config = Self {
            command_addr: SocketAddr::new(host, port),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            arena_width: parse_or(&lookup, "ARENA_WIDTH", defaults.arena_width)?,
            arena_height: parse_or(&lookup, "ARENA_HEIGHT", defaults.arena_height)?,
            enemy_difficulty: parse_or(&lookup, "ENEMY_DIFFICULTY", defaults.enemy_difficulty)?,
            enemy_count: parse_or(&lookup, "ENEMY_COUNT", defaults.enemy_count)?,
            command_rate_limit: parse_or(
                &lookup,
                "COMMAND_RATE_LIMIT",
                defaults.command_rate_limit,
            )?,
            wait_for_controller: parse_or(
                &lookup,
                "WAIT_FOR_CONTROLLER",
                defaults.wait_for_controller,
            )?,
            hold_game_over: parse_or(&lookup, "HOLD_GAME_OVER", defaults.hold_game_over)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena_width > 0.0 && self.arena_width.is_finite()) {
            return Err(ConfigError::Invalid("ARENA_WIDTH"));
        }
        if !(self.arena_height > 0.0 && self.arena_height.is_finite()) {
            return Err(ConfigError::Invalid("ARENA_HEIGHT"));
        }
        if !(1..=MAX_ENEMY_DIFFICULTY).contains(&self.enemy_difficulty) {
            return Err(ConfigError::Invalid("ENEMY_DIFFICULTY"));
        }
        if self.enemy_count == 0 {
            return Err(ConfigError::Invalid("ENEMY_COUNT"));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
