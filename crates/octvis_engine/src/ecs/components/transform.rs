//! Transform component for the ECS system
//!
//! Pure data component: position, Euler rotation and scale. Colliders are
//! axis-aligned and do not follow `rotation`; it only affects the model
//! matrix handed to renderers.

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// ECS Transform component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponent {
    /// World space position (Y-up)
    pub position: Vec3,

    /// Euler angles in radians, applied X then Y then Z
    pub rotation: Vec3,

    /// Scale factors; for box bodies these are the half-extents
    pub scale: Vec3,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create from position and scale
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// Compose `translate * rotate_x * rotate_y * rotate_z * scale`
    pub fn as_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}
