//! Demo scene: a field of spheres and boxes dropped onto the floor

use octvis_engine::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Sphere radii are drawn from `[0, MAX_SPHERE_RADIUS)`
const MAX_SPHERE_RADIUS: f32 = 12.0;

/// Box half-extents are drawn from this range on every axis
const BOX_HALF_EXTENT_RANGE: std::ops::Range<f32> = 3.5..12.0;

/// What was spawned
#[derive(Debug, Default)]
pub struct SpawnedScene {
    /// Sphere bodies in spawn order
    pub spheres: Vec<Entity>,
    /// Box bodies in spawn order
    pub boxes: Vec<Entity>,
}

impl SpawnedScene {
    /// Total number of bodies
    pub fn body_count(&self) -> usize {
        self.spheres.len() + self.boxes.len()
    }
}

fn spawn_point(rng: &mut StdRng, config: &SceneConfig) -> Vec3 {
    let extent = config.spawn_extent.max(f32::EPSILON);
    Vec3::new(
        rng.gen_range(-extent..extent),
        config.spawn_height,
        rng.gen_range(-extent..extent),
    )
}

/// Populate `world` with the configured spheres and boxes
pub fn spawn_scene(world: &mut World, config: &SceneConfig) -> SpawnedScene {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut scene = SpawnedScene::default();

    for _ in 0..config.sphere_count {
        let position = spawn_point(&mut rng, config);
        let size = rng.gen_range(0.0..MAX_SPHERE_RADIUS);
        let friction = rng.gen_range(0.70..1.0);

        let entity = world.create_entity();
        world.add_component(entity, TransformComponent::from_position_scale(position, Vec3::repeat(size)));
        world.add_component(entity, RigidBodyComponent::new(3.0 + size, friction));
        world.add_component(entity, SphereColliderComponent::new(position, size));
        scene.spheres.push(entity);
    }

    for _ in 0..config.box_count {
        let position = spawn_point(&mut rng, config);
        let half_extents = Vec3::new(
            rng.gen_range(BOX_HALF_EXTENT_RANGE),
            rng.gen_range(BOX_HALF_EXTENT_RANGE),
            rng.gen_range(BOX_HALF_EXTENT_RANGE),
        );
        let mass = 3.0 + half_extents.mean() * 0.5;

        let entity = world.create_entity();
        let transform = TransformComponent::from_position_scale(position, half_extents);
        world.add_component(entity, BoxColliderComponent::from_transform(&transform));
        world.add_component(entity, transform);
        world.add_component(entity, RigidBodyComponent::new(mass, 0.9));
        scene.boxes.push(entity);
    }

    log::info!(
        "Spawned {} spheres and {} boxes (seed {:#x})",
        scene.spheres.len(),
        scene.boxes.len(),
        config.seed
    );
    scene
}
