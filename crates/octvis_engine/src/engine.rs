//! Core engine implementation
//!
//! The engine owns the scene and the clock and drives registered
//! applications through a fixed-step loop: each frame adds its delta to an
//! accumulator, runs one fixed tick per whole step the accumulator exceeds,
//! then runs one variable update.

use crate::{
    application::{AppContext, AppError, Application},
    config::ConfigError,
    core::config::TimingConfig,
    ecs::World,
    foundation::time::{Stopwatch, Timing},
};
use thiserror::Error;

/// Main engine struct
pub struct Engine {
    world: World,
    timing: Timing,
    applications: Vec<Box<dyn Application>>,
    accumulator: f32,
    max_fixed_steps_per_frame: u32,
    quit_requested: bool,
    started: bool,
    finished: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(config: &TimingConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine: fixed step {:.4}s, at most {} fixed ticks per frame",
            config.fixed_delta_time,
            config.max_fixed_steps_per_frame
        );

        Ok(Self {
            world: World::new(),
            timing: Timing::new(config.fixed_delta_time),
            applications: Vec::new(),
            accumulator: 0.0,
            max_fixed_steps_per_frame: config.max_fixed_steps_per_frame,
            quit_requested: false,
            started: false,
            finished: false,
        })
    }

    /// Register an application; callbacks run in registration order
    pub fn add_application<A: Application + 'static>(&mut self, application: A) {
        self.applications.push(Box::new(application));
    }

    /// Run `on_start` on every application (once)
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        log::info!("Starting {} application(s)", self.applications.len());
        self.dispatch("start", |app, ctx| app.on_start(ctx))
    }

    /// Advance one frame by `frame_delta` seconds
    ///
    /// A quit request ends the fixed ticks of the frame early. Returns the
    /// number of fixed ticks run.
    pub fn step(&mut self, frame_delta: f32) -> Result<u32, EngineError> {
        self.start()?;
        self.timing.begin_frame(frame_delta);
        self.accumulator += frame_delta;

        let stopwatch = Stopwatch::start_new();
        let mut steps = 0;
        while self.accumulator > self.timing.fixed_delta_time && !self.quit_requested {
            if steps == self.max_fixed_steps_per_frame {
                log::debug!(
                    "Dropping {:.4}s of simulation backlog after {steps} fixed ticks",
                    self.accumulator
                );
                self.accumulator = self.accumulator.min(self.timing.fixed_delta_time);
                break;
            }
            self.accumulator -= self.timing.fixed_delta_time;
            self.dispatch("fixed update", |app, ctx| app.on_fixed_update(ctx))?;
            self.timing.fixed_ticks += 1;
            steps += 1;
        }
        self.timing.fixed_update_time = stopwatch.elapsed_secs();

        let stopwatch = Stopwatch::start_new();
        self.dispatch("update", |app, ctx| app.on_update(ctx, frame_delta))?;
        self.timing.update_time = stopwatch.elapsed_secs();

        Ok(steps)
    }

    /// Run `on_finish` on every application (once)
    pub fn finish(&mut self) -> Result<(), EngineError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let result = self.dispatch("finish", |app, ctx| app.on_finish(ctx));
        log::info!(
            "Engine shutdown: {} frames, {} fixed ticks",
            self.timing.delta_ticks,
            self.timing.fixed_ticks
        );
        result
    }

    /// Headless loop: `frames` frames of `frame_delta` seconds each
    ///
    /// Stops early when an application requests quit. Returns the number of
    /// frames run.
    pub fn run_frames(&mut self, frames: u64, frame_delta: f32) -> Result<u64, EngineError> {
        self.start()?;
        let mut run = 0;
        while run < frames && !self.quit_requested {
            self.step(frame_delta)?;
            run += 1;
        }
        self.finish()?;
        Ok(run)
    }

    /// Wall-clock loop until an application requests quit
    pub fn run(&mut self) -> Result<u64, EngineError> {
        self.start()?;
        let mut frame_clock = Stopwatch::start_new();
        let mut run = 0;
        while !self.quit_requested {
            let delta = frame_clock.elapsed_secs();
            frame_clock.restart();
            self.step(delta)?;
            run += 1;
        }
        self.finish()?;
        Ok(run)
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.quit_requested = true;
    }

    /// Whether shutdown was requested
    pub const fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Get the ECS world
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the engine clock
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Get mutable access to the engine clock
    pub fn timing_mut(&mut self) -> &mut Timing {
        &mut self.timing
    }

    fn dispatch<F>(&mut self, phase: &'static str, mut callback: F) -> Result<(), EngineError>
    where
        F: FnMut(&mut dyn Application, &mut AppContext<'_>) -> Result<(), AppError>,
    {
        let mut ctx = AppContext::new(&mut self.world, &mut self.timing, &mut self.quit_requested);
        for application in &mut self.applications {
            callback(application.as_mut(), &mut ctx)
                .map_err(|source| EngineError::Application { phase, source })?;
        }
        Ok(())
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An application callback failed
    #[error("Application failed during {phase}: {source}")]
    Application {
        /// Loop phase that was running
        phase: &'static str,
        /// Error returned by the application
        #[source]
        source: AppError,
    },
}
