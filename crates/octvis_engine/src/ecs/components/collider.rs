//! Collider components
//!
//! Geometry lives in world space and is refreshed from the owning
//! [`TransformComponent`] whenever the physics tick moves an entity.
//! Rotation is ignored; both shapes stay axis-aligned.

use crate::ecs::Component;
use crate::ecs::components::TransformComponent;
use crate::foundation::math::{Vec3, AABB};

/// Axis-aligned box collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxColliderComponent {
    /// Minimum corner (componentwise `<= max`)
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Component for BoxColliderComponent {}

impl BoxColliderComponent {
    /// Collider matching a transform (`scale` holds the half-extents)
    pub fn from_transform(transform: &TransformComponent) -> Self {
        Self {
            min: transform.position - transform.scale,
            max: transform.position + transform.scale,
        }
    }

    /// Refresh the bounds from the owning transform
    pub fn sync_from_transform(&mut self, transform: &TransformComponent) {
        *self = Self::from_transform(transform);
    }

    /// Bounds as an [`AABB`]
    pub const fn aabb(&self) -> AABB {
        AABB::new(self.min, self.max)
    }

    /// Half-extents per axis
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Sphere collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereColliderComponent {
    /// World-space centre
    pub centre: Vec3,
    /// Radius, never negative
    pub radius: f32,
}

impl Component for SphereColliderComponent {}

impl SphereColliderComponent {
    /// Create a sphere collider; negative radii are clamped to zero
    pub fn new(centre: Vec3, radius: f32) -> Self {
        Self {
            centre,
            radius: radius.max(0.0),
        }
    }

    /// Refresh the centre from the owning transform
    pub fn sync_from_transform(&mut self, transform: &TransformComponent) {
        self.centre = transform.position;
    }

    /// Tight bounding box
    pub fn aabb(&self) -> AABB {
        AABB::cube(self.centre, self.radius)
    }
}

/// Shape of a collider, copied out of the store for the narrow phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collider {
    /// Sphere shape
    Sphere(SphereColliderComponent),
    /// Axis-aligned box shape
    Box(BoxColliderComponent),
}

impl Collider {
    /// Tight bounding box of the shape
    pub fn aabb(&self) -> AABB {
        match self {
            Self::Sphere(sphere) => sphere.aabb(),
            Self::Box(bounds) => bounds.aabb(),
        }
    }

    /// Refresh the shape from the owning transform
    pub fn sync_from_transform(&mut self, transform: &TransformComponent) {
        match self {
            Self::Sphere(sphere) => sphere.sync_from_transform(transform),
            Self::Box(bounds) => bounds.sync_from_transform(transform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_from_transform_uses_scale_as_half_extents() {
        let transform = TransformComponent::from_position_scale(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let collider = BoxColliderComponent::from_transform(&transform);
        assert_eq!(collider.min, Vec3::new(-1.0, 3.0, -3.0));
        assert_eq!(collider.max, Vec3::new(1.0, 7.0, 3.0));
        assert_eq!(collider.half_extents(), transform.scale);
    }

    #[test]
    fn test_sphere_sync_keeps_radius() {
        let mut sphere = SphereColliderComponent::new(Vec3::zeros(), 2.0);
        let transform = TransformComponent::from_position(Vec3::new(4.0, 4.0, 4.0));
        sphere.sync_from_transform(&transform);
        assert_eq!(sphere.centre, transform.position);
        assert!((sphere.radius - 2.0).abs() < f32::EPSILON);
        assert_eq!(SphereColliderComponent::new(Vec3::zeros(), -1.0).radius, 0.0);
    }
}
