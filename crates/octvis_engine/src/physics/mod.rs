//! Physics module for collision detection and response
//!
//! Narrow-phase predicates, pairwise resolvers, the broad phases that feed
//! them and the fixed-step [`PhysicsSystem`] tying everything together.

pub mod collision;
pub mod resolution;
pub mod broad_phase;
pub mod system;

#[cfg(test)]
mod tests;

pub use broad_phase::{BroadPhase, LinearBroadPhase, OctreeBroadPhase};
pub use collision::{box_intersects_box, box_intersects_sphere, sphere_intersects_sphere};
pub use resolution::{is_colliding, resolve_collision, RESTITUTION_FACTOR};
pub use system::{integrate, PhysicsSystem, TickStats, DAMPING, GRAVITY, MAX_VELOCITY};
