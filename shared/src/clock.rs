//! Session clock: stopwatch and countdown timer
//!
//! All state is derived from caller-supplied monotonic timestamps in
//! milliseconds. Nothing here ticks on its own; the UI polls with the
//! current time and renders what comes back, so a missed tick never drifts.
//! A timestamp earlier than the last start counts as zero elapsed time.

use crate::errors::{DomainError, DomainResult};
use crate::validation::validate_countdown_seconds;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which face of the clock is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    Stopwatch,
    Timer,
}

/// Events surfaced by [`Clock::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    CountdownFinished,
}

// ============================================================================
// Stopwatch
// ============================================================================

/// Accumulating stopwatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwatch {
    accumulated_ms: u64,
    started_at: Option<u64>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start or resume. No-op when already running.
    pub fn start(&mut self, now_ms: u64) {
        if self.started_at.is_none() {
            self.started_at = Some(now_ms);
        }
    }

    /// Pause, folding the running span into the total
    pub fn pause(&mut self, now_ms: u64) {
        if let Some(start) = self.started_at.take() {
            self.accumulated_ms = self
                .accumulated_ms
                .saturating_add(now_ms.saturating_sub(start));
        }
    }

    pub fn elapsed(&self, now_ms: u64) -> Duration {
        let running = self
            .started_at
            .map(|start| now_ms.saturating_sub(start))
            .unwrap_or(0);
        Duration::from_millis(self.accumulated_ms.saturating_add(running))
    }

    /// Stop and zero
    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.started_at = None;
    }

    /// Overwrite the elapsed total. A running stopwatch keeps running from `now_ms`.
    pub fn set_elapsed(&mut self, elapsed: Duration, now_ms: u64) {
        self.accumulated_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if self.started_at.is_some() {
            self.started_at = Some(now_ms);
        }
    }
}

// ============================================================================
// Countdown
// ============================================================================

/// Countdown over a fixed total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total: Duration,
    consumed: Stopwatch,
}

impl Countdown {
    pub fn new(total: Duration) -> Self {
        Self {
            total,
            consumed: Stopwatch::new(),
        }
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn is_running(&self) -> bool {
        self.consumed.is_running()
    }

    pub fn start(&mut self, now_ms: u64) {
        self.consumed.start(now_ms);
    }

    pub fn pause(&mut self, now_ms: u64) {
        self.consumed.pause(now_ms);
    }

    /// Time left, never below zero
    pub fn remaining(&self, now_ms: u64) -> Duration {
        self.total.saturating_sub(self.consumed.elapsed(now_ms))
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        self.remaining(now_ms).is_zero()
    }

    /// Remaining time in whole seconds, rounded up
    pub fn remaining_secs(&self, now_ms: u64) -> u64 {
        ceil_secs(self.remaining(now_ms))
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let ms = d.as_millis();
    u64::try_from(ms.div_ceil(1000)).unwrap_or(u64::MAX)
}

// ============================================================================
// Clock
// ============================================================================

/// The session clock shown during a workout
#[derive(Debug, Clone, Default)]
pub struct Clock {
    mode: ClockMode,
    active: bool,
    stopwatch: Stopwatch,
    countdown: Option<Countdown>,
    laps: Vec<u64>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Switch faces. Whatever was running is paused.
    pub fn set_mode(&mut self, mode: ClockMode, now_ms: u64) {
        self.pause_all(now_ms);
        self.mode = mode;
    }

    /// Start or pause the current face.
    ///
    /// Activating the timer face with no countdown armed does nothing.
    pub fn set_active(&mut self, active: bool, now_ms: u64) {
        match self.mode {
            ClockMode::Stopwatch => {
                if active {
                    self.stopwatch.start(now_ms);
                } else {
                    self.stopwatch.pause(now_ms);
                }
                self.active = active;
            }
            ClockMode::Timer => match self.countdown.as_mut() {
                Some(countdown) => {
                    if active {
                        countdown.start(now_ms);
                    } else {
                        countdown.pause(now_ms);
                    }
                    self.active = active;
                }
                None => self.active = false,
            },
        }
    }

    pub fn toggle(&mut self, now_ms: u64) {
        self.set_active(!self.active, now_ms);
    }

    /// Whole seconds on the stopwatch
    pub fn duration_secs(&self, now_ms: u64) -> u64 {
        self.stopwatch.elapsed(now_ms).as_secs()
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    /// Arm and start a countdown, switching to the timer face
    pub fn start_timer(&mut self, seconds: u64, now_ms: u64) -> DomainResult<()> {
        validate_countdown_seconds(seconds).map_err(DomainError::Validation)?;

        if self.mode != ClockMode::Timer {
            self.set_mode(ClockMode::Timer, now_ms);
        }
        let mut countdown = Countdown::new(Duration::from_secs(seconds));
        countdown.start(now_ms);
        self.countdown = Some(countdown);
        self.active = true;
        Ok(())
    }

    /// Seconds left on the countdown (rounded up), `None` when unarmed
    pub fn countdown_remaining_secs(&self, now_ms: u64) -> Option<u64> {
        self.countdown.as_ref().map(|c| c.remaining_secs(now_ms))
    }

    /// Check for a finished countdown.
    ///
    /// Fires once: the countdown is disarmed and the clock deactivated.
    pub fn poll(&mut self, now_ms: u64) -> Option<ClockEvent> {
        let finished = self
            .countdown
            .as_ref()
            .is_some_and(|c| c.is_finished(now_ms));
        if !finished {
            return None;
        }

        self.countdown = None;
        if self.mode == ClockMode::Timer {
            self.active = false;
        }
        Some(ClockEvent::CountdownFinished)
    }

    /// Record a lap. Only a running stopwatch takes laps.
    pub fn add_lap(&mut self, now_ms: u64) -> Option<u64> {
        if self.mode != ClockMode::Stopwatch || !self.stopwatch.is_running() {
            return None;
        }
        let lap = self.duration_secs(now_ms);
        self.laps.insert(0, lap);
        Some(lap)
    }

    /// Laps, newest first
    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    /// Stop everything and clear elapsed time, laps and countdown. Mode is kept.
    pub fn reset(&mut self) {
        self.active = false;
        self.stopwatch.reset();
        self.countdown = None;
        self.laps.clear();
    }

    /// The number the clock face shows
    pub fn display_secs(&self, now_ms: u64) -> u64 {
        match self.mode {
            ClockMode::Stopwatch => self.duration_secs(now_ms),
            ClockMode::Timer => self.countdown_remaining_secs(now_ms).unwrap_or(0),
        }
    }

    fn pause_all(&mut self, now_ms: u64) {
        self.stopwatch.pause(now_ms);
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.pause(now_ms);
        }
        self.active = false;
    }
}

/// Render seconds as `MM:SS`
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
