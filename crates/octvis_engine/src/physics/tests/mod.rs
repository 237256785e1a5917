//! Scenario tests for the physics tick
//!
//! Shared scene builders live here; the scenarios are split by concern.

mod broad_phase_equivalence;

use rand::{rngs::StdRng, Rng};

use crate::ecs::components::{
    BoxColliderComponent, RigidBodyComponent, SphereColliderComponent, TransformComponent,
};
use crate::ecs::{Entity, World};
use crate::foundation::math::Vec3;

fn spawn_sphere(world: &mut World, position: Vec3, radius: f32) -> Entity {
    let entity = world.create_entity();
    world.add_component(entity, TransformComponent::from_position_scale(position, Vec3::repeat(radius)));
    world.add_component(entity, RigidBodyComponent::default());
    world.add_component(entity, SphereColliderComponent::new(position, radius));
    entity
}

fn spawn_box(world: &mut World, position: Vec3, half_extents: Vec3) -> Entity {
    let entity = world.create_entity();
    let transform = TransformComponent::from_position_scale(position, half_extents);
    world.add_component(entity, BoxColliderComponent::from_transform(&transform));
    world.add_component(entity, transform);
    world.add_component(entity, RigidBodyComponent::default());
    entity
}

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
        rng.gen_range(-extent..=extent),
    )
}
