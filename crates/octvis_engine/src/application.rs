//! Application trait and lifecycle management

use crate::config::ConfigError;
use crate::ecs::World;
use crate::foundation::time::Timing;
use thiserror::Error;

/// What an application sees of the engine during a callback
pub struct AppContext<'a> {
    /// Scene shared by every registered application
    pub world: &'a mut World,

    /// Engine clock; `fixed_delta_time` may be changed here
    pub timing: &'a mut Timing,

    quit_requested: &'a mut bool,
}

impl<'a> AppContext<'a> {
    pub(crate) fn new(world: &'a mut World, timing: &'a mut Timing, quit_requested: &'a mut bool) -> Self {
        Self {
            world,
            timing,
            quit_requested,
        }
    }

    /// Ask the engine to stop after the current frame
    pub fn request_quit(&mut self) {
        *self.quit_requested = true;
    }

    /// Whether any application asked to stop
    pub const fn quit_requested(&self) -> bool {
        *self.quit_requested
    }
}

/// Application lifecycle trait
///
/// Implement this trait to plug a simulation or tool into the engine loop.
/// Every callback has a no-op default.
pub trait Application {
    /// Called once before the first frame
    fn on_start(&mut self, _ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        Ok(())
    }

    /// Called every frame after the fixed ticks of that frame
    ///
    /// # Arguments
    /// * `ctx` - Engine state shared with the application
    /// * `delta_time` - Time since last frame in seconds
    fn on_update(&mut self, _ctx: &mut AppContext<'_>, _delta_time: f32) -> Result<(), AppError> {
        Ok(())
    }

    /// Called once per fixed tick; the step is `ctx.timing.fixed_delta_time`
    fn on_fixed_update(&mut self, _ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        Ok(())
    }

    /// Called once when the loop ends
    fn on_finish(&mut self, _ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        Ok(())
    }
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
