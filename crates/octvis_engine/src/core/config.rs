//! # Sandbox Configuration
//!
//! All tunables of the sandbox in one serializable tree. Every section is
//! `#[serde(default)]`, so a config file only needs the keys it overrides.
//!
//! ## Configuration Categories
//!
//! - **Timing**: fixed simulation step and catch-up limits
//! - **Physics**: broad-phase selection, floor plane, octree sizing and padding
//! - **Scene**: population of the demo scene

use serde::{Deserialize, Serialize};

use crate::foundation::time::DEFAULT_FIXED_DELTA_TIME;
use crate::spatial::{DEFAULT_DEPTH, MAX_DEPTH, MIN_DEPTH};

// Re-export from the config module for convenience
pub use crate::config::{Config, ConfigError};

/// Default octree subdivision depth used by the accelerated broad phase
pub const DEFAULT_OCTREE_DEPTH: u32 = DEFAULT_DEPTH;

/// Broad-phase strategy used by the physics tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhaseMode {
    /// Test every ordered pair of collider entities
    Linear,
    /// Rebuild an octree each tick and test only co-located entities
    #[default]
    Octree,
}

/// # Octree Configuration
///
/// Sizing of the per-tick spatial index and the padding applied to collider
/// bounds before insertion. The paddings compensate for first-fit placement
/// and for entities moving during the tick; they are empirical.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Requested subdivision depth (clamped to the supported range on rebuild)
    pub depth: u32,

    /// Fit the world volume around the current scene bounds every tick
    pub fit_to_scene: bool,

    /// World centre when `fit_to_scene` is off
    pub centre: [f32; 3],

    /// World half-extent when `fit_to_scene` is off
    pub half_size: f32,

    /// Sphere radius multiplier used for the inserted AABB
    pub sphere_padding: f32,

    /// Flat margin added to every side of a box collider's AABB
    pub box_padding: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_OCTREE_DEPTH,
            fit_to_scene: true,
            centre: [0.0, 0.0, 0.0],
            half_size: 512.0,
            sphere_padding: 1.5,
            box_padding: 5.0,
        }
    }
}

impl OctreeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&self.depth) {
            // Clamped later; worth a note but not an error.
            log::warn!(
                "Octree depth {} outside [{MIN_DEPTH}, {MAX_DEPTH}], it will be clamped",
                self.depth
            );
        }
        if !self.fit_to_scene && self.half_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "octree half_size must be positive, got {}",
                self.half_size
            )));
        }
        if self.sphere_padding < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "sphere_padding must be at least 1.0, got {}",
                self.sphere_padding
            )));
        }
        if self.box_padding < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "box_padding must not be negative, got {}",
                self.box_padding
            )));
        }
        Ok(())
    }
}

/// # Physics Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Which broad phase feeds the narrow phase
    pub broad_phase: BroadPhaseMode,

    /// Integrate rigid bodies on the rayon thread pool
    pub parallel_integration: bool,

    /// Height of the floor plane nothing may sink below
    pub floor_height: f32,

    /// Spatial index settings for the accelerated broad phase
    pub octree: OctreeConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            broad_phase: BroadPhaseMode::default(),
            parallel_integration: true,
            floor_height: 0.0,
            octree: OctreeConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.floor_height.is_finite() {
            return Err(ConfigError::Invalid("floor_height must be finite".to_string()));
        }
        self.octree.validate()
    }
}

/// # Timing Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Fixed simulation step in seconds
    pub fixed_delta_time: f32,

    /// Upper bound on fixed ticks run to catch up within one frame
    pub max_fixed_steps_per_frame: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fixed_delta_time: DEFAULT_FIXED_DELTA_TIME,
            max_fixed_steps_per_frame: 8,
        }
    }
}

impl TimingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixed_delta_time <= 0.0 || !self.fixed_delta_time.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "fixed_delta_time must be positive, got {}",
                self.fixed_delta_time
            )));
        }
        if self.max_fixed_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_fixed_steps_per_frame must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// # Scene Configuration
///
/// Population of the demo scene spawned by the sandbox binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of sphere bodies
    pub sphere_count: usize,

    /// Number of box bodies
    pub box_count: usize,

    /// Bodies spawn in `[-spawn_extent, spawn_extent]` on x and z
    pub spawn_extent: f32,

    /// Initial height of every body
    pub spawn_height: f32,

    /// Seed for the scene generator
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sphere_count: 256,
            box_count: 256,
            spawn_extent: 128.0,
            spawn_height: 32.0,
            seed: 0x0C7_7EE,
        }
    }
}

/// # Sandbox Configuration
///
/// Root of the configuration tree, loadable from TOML or RON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,

    /// Clock settings
    pub timing: TimingConfig,

    /// Simulation settings
    pub physics: PhysicsConfig,

    /// Demo scene settings
    pub scene: SceneConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            timing: TimingConfig::default(),
            physics: PhysicsConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl Config for SandboxConfig {}

impl SandboxConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        self.physics.validate()?;
        Ok(())
    }
}
