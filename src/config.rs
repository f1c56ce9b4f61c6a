use std::time::Duration;

use crate::{error::ConfigError, Grid};

pub const DEFAULT_SIZE: i32 = 700;
pub const DEFAULT_SPOTS: i32 = 100;

pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 2000;
pub const INTERVAL_STEP_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// side of the arena, in pixels
    pub size: i32,
    /// cells per side
    pub spots: i32,
    pub initial_interval: Duration,
    pub min_interval: Duration,
    pub max_interval: Duration,
    pub interval_step: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            spots: DEFAULT_SPOTS,
            initial_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            min_interval: Duration::from_millis(MIN_INTERVAL_MS),
            max_interval: Duration::from_millis(MAX_INTERVAL_MS),
            interval_step: Duration::from_millis(INTERVAL_STEP_MS),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spots <= 0 {
            return Err(ConfigError::NoSpots);
        }
        if self.size < self.spots {
            return Err(ConfigError::ArenaTooSmall {
                size: self.size,
                spots: self.spots,
            });
        }
        // neighbor lookups reach one cell past the last center
        let cell_size = self.size / self.spots;
        let reach = cell_size
            .checked_mul(2)
            .and_then(|margin| self.size.checked_add(margin));
        if reach.is_none() {
            return Err(ConfigError::ArenaTooLarge {
                size: self.size,
                spots: self.spots,
            });
        }
        if self.min_interval > self.max_interval {
            return Err(ConfigError::InvertedBounds {
                min: self.min_interval.as_millis() as u64,
                max: self.max_interval.as_millis() as u64,
            });
        }
        if self.interval_step.is_zero() {
            return Err(ConfigError::ZeroStep);
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<Grid, ConfigError> {
        self.validate()?;
        Ok(Grid::new(self.size, self.spots))
    }
}
