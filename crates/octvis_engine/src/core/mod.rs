//! # Core Engine Module
//!
//! Shared abstractions the other subsystems depend on. Currently this is the
//! unified configuration tree.

pub mod config;

// Re-export commonly used config types
pub use config::{
    BroadPhaseMode,
    Config,
    ConfigError,
    OctreeConfig,
    PhysicsConfig,
    SandboxConfig,
    SceneConfig,
    TimingConfig,
};
