//! ECS Components module
//!
//! Data attached to simulated entities: transform, dynamics, collider shapes
//! and the optional collision tracker.

pub mod transform;
pub mod rigid_body;
pub mod collider;
pub mod collision_tracker;

pub use transform::TransformComponent;
pub use rigid_body::RigidBodyComponent;
pub use collider::{BoxColliderComponent, Collider, SphereColliderComponent};
pub use collision_tracker::{CollisionCallback, CollisionTrackerComponent};
