//! Rigid body component: per-entity dynamics state

use crate::ecs::Component;
use crate::foundation::math::Vec3;

/// Dynamics state integrated by the physics tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyComponent {
    /// Accumulated acceleration, damped every tick
    pub acceleration: Vec3,

    /// Linear velocity in units per second
    pub velocity: Vec3,

    /// Mass, must be positive
    pub mass: f32,

    /// Fraction of velocity removed per tick, in `[0, 1]`
    pub friction: f32,
}

impl Component for RigidBodyComponent {}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self {
            acceleration: Vec3::zeros(),
            velocity: Vec3::zeros(),
            mass: 5.0,
            friction: 0.05,
        }
    }
}

impl RigidBodyComponent {
    /// Create a body at rest with the given mass and friction
    ///
    /// Mass is floored at a small positive value and friction is clamped to `[0, 1]`.
    pub fn new(mass: f32, friction: f32) -> Self {
        Self {
            mass: mass.max(f32::EPSILON),
            friction: friction.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Builder: start with a velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Add to acceleration
    pub fn add_acceleration(&mut self, delta_acceleration: Vec3) {
        self.acceleration += delta_acceleration;
    }

    /// Momentum `mass * velocity`
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }
}
