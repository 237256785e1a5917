//! # Octvis Engine
//!
//! Headless rigid-body sandbox built around an octree-accelerated broad phase.
//!
//! ## Features
//!
//! - **Octree**: arena-backed, fully subdivided spatial index with
//!   predicate search, region queries and visitor traversal
//! - **Physics**: fixed-step integration, sphere/box narrow phase, positional
//!   and impulse resolution, per-entity collision tracking
//! - **ECS**: small generational entity store with typed components
//! - **Debug**: per-tick reports, collision highlights, octree wireframes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use octvis_engine::prelude::*;
//!
//! struct Simulation {
//!     physics: PhysicsSystem,
//! }
//!
//! impl Application for Simulation {
//!     fn on_fixed_update(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
//!         let stats = self.physics.fixed_update(ctx.world, ctx.timing.fixed_delta_time);
//!         log::debug!("{} collisions", stats.collisions_resolved);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SandboxConfig::default();
//!     let mut engine = Engine::new(&config.timing)?;
//!     engine.add_application(Simulation {
//!         physics: PhysicsSystem::new(config.physics),
//!     });
//!     engine.run_frames(600, 1.0 / 60.0)?;
//!     Ok(())
//! }
//! ```

// Core engine modules
pub mod core;
pub mod config;

pub mod foundation;
pub mod ecs;
pub mod spatial;
pub mod physics;
pub mod debug;

mod application;
mod engine;

pub use application::{AppContext, AppError, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppContext, AppError, Application,
        Engine, EngineError,
        config::{Config, ConfigError},
        core::config::{BroadPhaseMode, OctreeConfig, PhysicsConfig, SandboxConfig, SceneConfig, TimingConfig},
        debug::{CollisionDebugRecorder, Highlight, LogReportSink, ReportHistory, ReportSink, TickReport},
        ecs::{
            components::{
                BoxColliderComponent, Collider, CollisionTrackerComponent, RigidBodyComponent,
                SphereColliderComponent, TransformComponent,
            },
            Component, Entity, World,
        },
        foundation::{
            math::{Vec3, Mat4, AABB},
            time::{Stopwatch, Timing},
        },
        physics::{PhysicsSystem, TickStats},
        spatial::Octree,
    };
}
