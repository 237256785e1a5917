//! Time management utilities
//!
//! [`Timing`] is the clock shared by the application loop and the systems
//! it drives. [`Stopwatch`] measures how long individual tick phases take.

use std::time::{Duration, Instant};

/// Default fixed simulation step (60 Hz)
pub const DEFAULT_FIXED_DELTA_TIME: f32 = 1.0 / 60.0;

/// Frame and fixed-step clock
///
/// `fixed_delta_time` may be changed at runtime to tune the simulation rate;
/// the tick counters are diagnostics only.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Total simulated time in seconds
    pub elapsed: f32,

    /// Time between the last two frames in seconds
    pub delta: f32,

    /// Fixed step between simulation ticks in seconds
    pub fixed_delta_time: f32,

    /// Number of variable-rate frames run so far
    pub delta_ticks: u64,

    /// Number of fixed ticks run so far
    pub fixed_ticks: u64,

    /// Wall-clock seconds spent in fixed updates during the last frame
    pub fixed_update_time: f32,

    /// Wall-clock seconds spent in variable updates during the last frame
    pub update_time: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_DELTA_TIME)
    }
}

impl Timing {
    /// Create a clock with the given fixed step
    pub const fn new(fixed_delta_time: f32) -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            fixed_delta_time,
            delta_ticks: 0,
            fixed_ticks: 0,
            fixed_update_time: 0.0,
            update_time: 0.0,
        }
    }

    /// Change the fixed simulation step; non-positive values are ignored
    pub fn set_fixed_delta_time(&mut self, fixed_delta_time: f32) {
        if fixed_delta_time > 0.0 {
            self.fixed_delta_time = fixed_delta_time;
        } else {
            log::warn!("Ignoring non-positive fixed delta time {fixed_delta_time}");
        }
    }

    /// Record the start of a new frame
    pub(crate) fn begin_frame(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta;
        self.delta_ticks += 1;
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub const fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Reset the stopwatch to zero
    pub fn reset(&mut self) {
        self.start_time = None;
        self.elapsed = Duration::ZERO;
    }

    /// Restart the stopwatch (reset and start)
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Check if the stopwatch is currently running
    pub const fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}
