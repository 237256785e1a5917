//! The octree broad phase must report the same intersecting pairs as the
//! exhaustive one for the same snapshot.

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{random_point, spawn_box, spawn_sphere};
use crate::core::config::{BroadPhaseMode, OctreeConfig, PhysicsConfig};
use crate::ecs::World;
use crate::foundation::math::Vec3;
use crate::physics::PhysicsSystem;

fn physics(mode: BroadPhaseMode, octree: OctreeConfig) -> PhysicsSystem {
    PhysicsSystem::new(PhysicsConfig {
        broad_phase: mode,
        octree,
        ..PhysicsConfig::default()
    })
}

fn fixed_world_octree() -> OctreeConfig {
    OctreeConfig {
        depth: 2,
        fit_to_scene: false,
        centre: [0.0, 0.0, 0.0],
        half_size: 512.0,
        ..OctreeConfig::default()
    }
}

fn sphere_scene(seed: u64, count: usize, extent: f32) -> World {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = World::new();
    for _ in 0..count {
        let position = random_point(&mut rng, extent);
        let radius = rng.gen_range(1.0..=12.0);
        spawn_sphere(&mut world, position, radius);
    }
    world
}

#[test]
fn test_scattered_spheres_match_linear() {
    for seed in 0..8 {
        let world = sphere_scene(seed, 100, 128.0);
        let linear = physics(BroadPhaseMode::Linear, fixed_world_octree()).detect_pairs(&world);
        let accelerated = physics(BroadPhaseMode::Octree, fixed_world_octree()).detect_pairs(&world);
        assert_eq!(linear, accelerated, "seed {seed}");
    }
}

#[test]
fn test_dense_spheres_match_linear() {
    let world = sphere_scene(42, 100, 32.0);
    let linear = physics(BroadPhaseMode::Linear, fixed_world_octree()).detect_pairs(&world);
    assert!(!linear.is_empty());

    for depth in 1..=4 {
        let octree = OctreeConfig {
            depth,
            ..fixed_world_octree()
        };
        let accelerated = physics(BroadPhaseMode::Octree, octree).detect_pairs(&world);
        assert_eq!(linear, accelerated, "depth {depth}");
    }
}

#[test]
fn test_mixed_shapes_with_fitted_volume_match_linear() {
    let mut rng = StdRng::seed_from_u64(0x0C7);
    let mut world = World::new();
    for _ in 0..60 {
        let position = random_point(&mut rng, 64.0);
        spawn_sphere(&mut world, position, rng.gen_range(1.0..=12.0));
    }
    for _ in 0..60 {
        let position = random_point(&mut rng, 64.0);
        let half_extents = Vec3::new(
            rng.gen_range(3.5..=12.0),
            rng.gen_range(3.5..=12.0),
            rng.gen_range(3.5..=12.0),
        );
        spawn_box(&mut world, position, half_extents);
    }

    let fitted = OctreeConfig {
        depth: 3,
        ..OctreeConfig::default()
    };
    let linear = physics(BroadPhaseMode::Linear, fitted.clone()).detect_pairs(&world);
    let accelerated = physics(BroadPhaseMode::Octree, fitted).detect_pairs(&world);
    assert!(!linear.is_empty());
    assert_eq!(linear, accelerated);
}

#[test]
fn test_accelerated_tests_fewer_pairs() {
    let mut linear_world = sphere_scene(9, 100, 128.0);
    let mut accelerated_world = sphere_scene(9, 100, 128.0);
    let mut linear = physics(BroadPhaseMode::Linear, fixed_world_octree());
    let mut accelerated = physics(BroadPhaseMode::Octree, fixed_world_octree());

    let linear_stats = linear.fixed_update(&mut linear_world, 1.0 / 60.0);
    let accelerated_stats = accelerated.fixed_update(&mut accelerated_world, 1.0 / 60.0);

    assert_eq!(linear_stats.collision_tests, 100 * 99);
    assert!(accelerated_stats.collision_tests < linear_stats.collision_tests);
    assert_eq!(accelerated_stats.body_count, 100);
}
