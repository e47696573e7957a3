//! Round parameters and file locations.
//!
//! The defaults reproduce the classic cabinet: a 20x20 board, a three cell
//! snake entering from the left, and a tick that starts at 150ms and speeds up
//! by 5ms per morsel until it bottoms out at 60ms.

use std::fmt;
use std::time::Duration;

use crate::geometry::{Pos, Size};

/// Side of the square board.
pub const GRID_SIDE: u16 = 20;
/// Segments of a freshly spawned snake.
pub const INITIAL_LENGTH: u16 = 3;
/// Where the head of a new snake starts. The body trails off to the left.
pub const SPAWN_HEAD: Pos = Pos::new(5, 10);

pub const BASE_TICK_MILLIS: u64 = 150;
pub const TICK_STEP_MILLIS: u64 = 5;
pub const MIN_TICK_MILLIS: u64 = 60;

pub const POINTS_PER_MORSEL: u32 = 10;

/// Random picks tried before falling back to scanning the free cells.
pub const PLACEMENT_ATTEMPTS: u32 = 64;

/// Cells a mouse drag must travel along its dominant axis to count as a swipe.
pub const SWIPE_THRESHOLD: i32 = 1;

/// Fixed identifier of the persisted high score.
pub const HIGH_SCORE_KEY: &str = "snakeHighScore";
pub const HIGH_SCORE_FILE: &str = ".snakeHighScore";
pub const LOG_FILE: &str = "snek-arcade.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The spawn snake does not fit on the board.
    SpawnOutOfBounds { head: Pos, length: u16, size: Size },
    InvalidLength,
    InvalidTickRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SpawnOutOfBounds { head, length, size } => write!(
                f,
                "a snake of length {} headed at ({}, {}) does not fit on a {}x{} board",
                length, head.x, head.y, size.width, size.height
            ),
            ConfigError::InvalidLength => write!(f, "initial snake length must be at least 1"),
            ConfigError::InvalidTickRange => {
                write!(f, "minimum tick interval must be positive and not above the base")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub size: Size,
    pub spawn_head: Pos,
    pub initial_length: u16,
    pub base_tick: Duration,
    pub tick_step: Duration,
    pub min_tick: Duration,
    pub points_per_morsel: u32,
    pub placement_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            size: Size::square(GRID_SIDE),
            spawn_head: SPAWN_HEAD,
            initial_length: INITIAL_LENGTH,
            base_tick: Duration::from_millis(BASE_TICK_MILLIS),
            tick_step: Duration::from_millis(TICK_STEP_MILLIS),
            min_tick: Duration::from_millis(MIN_TICK_MILLIS),
            points_per_morsel: POINTS_PER_MORSEL,
            placement_attempts: PLACEMENT_ATTEMPTS,
        }
    }
}

impl EngineConfig {
    /// Checks that a round can be started with these parameters.
    ///
    /// The snake spawns horizontally with its tail to the left of the head,
    /// so the head column must leave room for the rest of the body.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_length == 0 {
            return Err(ConfigError::InvalidLength);
        }
        if self.min_tick.is_zero() || self.min_tick > self.base_tick {
            return Err(ConfigError::InvalidTickRange);
        }
        let fits = self.size.contains(self.spawn_head)
            && self.spawn_head.x + 1 >= self.initial_length;
        if !fits {
            return Err(ConfigError::SpawnOutOfBounds {
                head: self.spawn_head,
                length: self.initial_length,
                size: self.size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.size, Size::square(20));
        assert_eq!(config.base_tick, Duration::from_millis(150));
        assert_eq!(config.min_tick, Duration::from_millis(60));
    }

    #[test]
    fn test_spawn_must_fit() {
        let config = EngineConfig {
            spawn_head: Pos::new(1, 0),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpawnOutOfBounds { length: 3, .. })
        ));

        let config = EngineConfig {
            size: Size::square(4),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());

        // Tail exactly at the left wall is fine
        let config = EngineConfig {
            size: Size::square(4),
            spawn_head: Pos::new(2, 0),
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_tick_range() {
        let config = EngineConfig {
            min_tick: Duration::from_millis(200),
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickRange));

        let config = EngineConfig {
            min_tick: Duration::ZERO,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickRange));
    }
}
