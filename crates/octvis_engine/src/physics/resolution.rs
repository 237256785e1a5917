//! Collision resolution
//!
//! Pairwise positional correction and impulse response. Each resolver takes
//! both colliders, both rigid bodies and both transforms and leaves the
//! colliders in sync with the corrected transforms.
//!
//! Boxes behave like heavy obstacles: a sphere hitting a box is pushed out
//! while the box stays put, and box-box contacts are separated without any
//! velocity change.

use crate::ecs::components::{
    BoxColliderComponent, Collider, RigidBodyComponent, SphereColliderComponent,
    TransformComponent,
};
use crate::physics::collision::{
    box_intersects_box, box_intersects_sphere, closest_point_on_box, sphere_intersects_sphere,
};

/// Impulse scale for sphere-sphere contacts (`1 + 1.2`)
pub const RESTITUTION_FACTOR: f32 = 2.2;

/// Centres closer than this are treated as coincident
const DEGENERATE_DISTANCE: f32 = f32::EPSILON;

/// Narrow-phase test dispatched on the two shapes
pub fn is_colliding(lhs: &Collider, rhs: &Collider) -> bool {
    match (lhs, rhs) {
        (Collider::Sphere(s0), Collider::Sphere(s1)) => {
            sphere_intersects_sphere(s0.centre, s0.radius, s1.centre, s1.radius)
        }
        (Collider::Sphere(s0), Collider::Box(b1)) => {
            box_intersects_sphere(b1.min, b1.max, s0.centre, s0.radius)
        }
        (Collider::Box(b0), Collider::Sphere(s1)) => {
            box_intersects_sphere(b0.min, b0.max, s1.centre, s1.radius)
        }
        (Collider::Box(b0), Collider::Box(b1)) => box_intersects_box(b0.min, b0.max, b1.min, b1.max),
    }
}

/// Resolve a contact between two bodies, dispatched on the two shapes
///
/// A box-sphere pair is handed to the sphere-box resolver with its sides
/// swapped.
pub fn resolve_collision(
    c0: &mut Collider,
    rb0: &mut RigidBodyComponent,
    tr0: &mut TransformComponent,
    c1: &mut Collider,
    rb1: &mut RigidBodyComponent,
    tr1: &mut TransformComponent,
) {
    match (c0, c1) {
        (Collider::Sphere(s0), Collider::Sphere(s1)) => {
            resolve_sphere_vs_sphere(s0, rb0, tr0, s1, rb1, tr1);
        }
        (Collider::Sphere(s0), Collider::Box(b1)) => {
            resolve_sphere_vs_box(s0, rb0, tr0, b1, rb1, tr1);
        }
        (Collider::Box(b0), Collider::Sphere(s1)) => {
            resolve_sphere_vs_box(s1, rb1, tr1, b0, rb0, tr0);
        }
        (Collider::Box(b0), Collider::Box(b1)) => {
            resolve_box_vs_box(b0, rb0, tr0, b1, rb1, tr1);
        }
    }
}

/// Push two spheres apart and exchange an impulse along the contact normal
pub fn resolve_sphere_vs_sphere(
    c0: &mut SphereColliderComponent,
    rb0: &mut RigidBodyComponent,
    tr0: &mut TransformComponent,
    c1: &mut SphereColliderComponent,
    rb1: &mut RigidBodyComponent,
    tr1: &mut TransformComponent,
) {
    let delta = tr1.position - tr0.position;
    let distance = delta.magnitude();
    if distance <= DEGENERATE_DISTANCE {
        log::trace!("Skipping coincident sphere pair");
        return;
    }

    let overlap = c0.radius + c1.radius - distance;
    if overlap <= 0.0 {
        return;
    }

    let normal = delta / distance;
    let separation = normal * (overlap * 0.5);
    tr0.position -= separation;
    tr1.position += separation;

    let relative_velocity = rb1.velocity - rb0.velocity;
    let impulse = normal * ((-relative_velocity).dot(&normal) * RESTITUTION_FACTOR);
    rb0.velocity -= impulse / rb0.mass;
    rb1.velocity += impulse / rb1.mass;

    c0.sync_from_transform(tr0);
    c1.sync_from_transform(tr1);
}

/// Push a sphere out of a box; the box does not move
pub fn resolve_sphere_vs_box(
    sphere: &mut SphereColliderComponent,
    _sphere_body: &mut RigidBodyComponent,
    sphere_transform: &mut TransformComponent,
    bounds: &mut BoxColliderComponent,
    _box_body: &mut RigidBodyComponent,
    box_transform: &mut TransformComponent,
) {
    let closest = closest_point_on_box(bounds.min, bounds.max, sphere.centre);
    let offset = sphere.centre - closest;
    let distance_squared = offset.magnitude_squared();

    // Centre on or inside the surface
    if distance_squared <= 0.0 {
        return;
    }

    let distance = distance_squared.sqrt();
    sphere_transform.position += offset / distance * (sphere.radius - distance);

    sphere.sync_from_transform(sphere_transform);
    bounds.sync_from_transform(box_transform);
}

/// Separate two boxes along the axis of least overlap, half each
pub fn resolve_box_vs_box(
    c0: &mut BoxColliderComponent,
    _rb0: &mut RigidBodyComponent,
    tr0: &mut TransformComponent,
    c1: &mut BoxColliderComponent,
    _rb1: &mut RigidBodyComponent,
    tr1: &mut TransformComponent,
) {
    let distance = tr1.position - tr0.position;
    let half_size_sum = c0.half_extents() + c1.half_extents();
    let overlap = half_size_sum - distance.abs();

    if overlap.x > 0.0 && overlap.y > 0.0 && overlap.z > 0.0 {
        let axis = if overlap.x < overlap.y && overlap.x < overlap.z {
            0
        } else if overlap.y < overlap.z {
            1
        } else {
            2
        };

        let direction = if distance[axis] > 0.0 { 1.0 } else { -1.0 };
        let shift = overlap[axis] * 0.5 * direction;
        tr0.position[axis] -= shift;
        tr1.position[axis] += shift;
    }

    c0.sync_from_transform(tr0);
    c1.sync_from_transform(tr1);
}
