//! Countdown used for rounds and mini-games.
//!
//! The timer does not know about wall-clock time. Whoever owns it calls
//! [`Timer::tick`] once per elapsed second while it is running.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Paused,
    Running,
    /// Reached zero, only `reset` or `adjust` move the timer out of here
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    duration: u32,
    remaining: u32,
    state: TimerState,
}

impl Timer {
    /// Remaining seconds at or below which the countdown counts as critical.
    pub const CRITICAL_SECONDS: u32 = 10;

    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
            state: TimerState::Paused,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == TimerState::Expired
    }

    pub fn is_critical(&self) -> bool {
        self.remaining > 0 && self.remaining <= Self::CRITICAL_SECONDS
    }

    /// Returns whether the timer started.
    pub fn start(&mut self) -> bool {
        if self.state != TimerState::Paused || self.remaining == 0 {
            return false;
        }

        self.state = TimerState::Running;
        true
    }

    /// Returns whether the timer was running.
    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        self.state = TimerState::Paused;
        true
    }

    /// Advances a running timer by one second. Returns whether anything changed.
    pub fn tick(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            tracing::debug!("Timer expired");
            self.state = TimerState::Expired;
        }
        true
    }

    /// Stops the timer and sets the remaining time, negative values become 0.
    pub fn reset(&mut self, seconds: i64) {
        self.remaining = clamp_seconds(seconds);
        self.state = TimerState::Paused;
    }

    /// Resets to the duration the timer was created with.
    pub fn restart(&mut self) {
        self.reset(i64::from(self.duration));
    }

    /// Adds `delta` seconds, never going below zero.
    pub fn adjust(&mut self, delta: i64) {
        self.remaining = clamp_seconds(i64::from(self.remaining).saturating_add(delta));

        self.state = match (self.state, self.remaining) {
            (TimerState::Running, 0) => {
                tracing::debug!("Timer expired by adjustment");
                TimerState::Expired
            }
            (TimerState::Expired, r) if r > 0 => TimerState::Paused,
            (state, _) => state,
        };
    }
}

fn clamp_seconds(seconds: i64) -> u32 {
    seconds.clamp(0, i64::from(u32::MAX)) as u32
}

impl std::fmt::Display for Timer {
    /// Formats the remaining time as `m:ss`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
