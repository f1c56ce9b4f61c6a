use std::{fmt, time::Duration};

use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    #[default]
    Idle,
    Running,
    Paused,
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockState::Running => write!(f, "Running"),
            ClockState::Idle | ClockState::Paused => write!(f, "Stopped"),
        }
    }
}

/// Run state and tick interval of a simulation. Calls that are not valid
/// from the current state are ignored.
#[derive(Debug, Clone)]
pub struct Clock {
    state: ClockState,
    interval: Duration,
    min_interval: Duration,
    max_interval: Duration,
    step: Duration,
}

impl Clock {
    pub fn new(config: &Config) -> Self {
        let interval = config
            .initial_interval
            .clamp(config.min_interval, config.max_interval);
        Self {
            state: ClockState::Idle,
            interval,
            min_interval: config.min_interval,
            max_interval: config.max_interval,
            step: config.interval_step,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// whether the tick loop keeps a deadline armed, paused ticks included.
    pub fn is_ticking(&self) -> bool {
        self.state != ClockState::Idle
    }

    pub fn start(&mut self) -> bool {
        if self.state != ClockState::Idle {
            return false;
        }
        self.state = ClockState::Running;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.state = match self.state {
            ClockState::Running => ClockState::Paused,
            ClockState::Paused => ClockState::Running,
            ClockState::Idle => return false,
        };
        true
    }

    pub fn reset(&mut self) {
        self.state = ClockState::Idle;
    }

    pub fn adjust_interval(&mut self, delta_ms: i64) -> Duration {
        let min = self.min_interval.as_millis() as i64;
        let max = self.max_interval.as_millis() as i64;
        let current = self.interval.as_millis() as i64;
        let next = current.saturating_add(delta_ms).clamp(min, max);
        self.interval = Duration::from_millis(next as u64);
        self.interval
    }

    pub fn speed_up(&mut self) -> Duration {
        self.adjust_interval(-(self.step.as_millis() as i64))
    }

    pub fn slow_down(&mut self) -> Duration {
        self.adjust_interval(self.step.as_millis() as i64)
    }
}
