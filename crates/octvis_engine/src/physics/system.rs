//! Fixed-step physics tick
//!
//! Each tick copies the simulated entities out of the [`World`] into a dense
//! body buffer, runs the whole pipeline on that buffer and writes the results
//! back:
//!
//! 1. reset collision tracker counters
//! 2. clamp bodies above the floor and refresh collider geometry
//! 3. integrate rigid bodies (optionally on the rayon pool)
//! 4. broad phase, then narrow phase and resolution in candidate order
//! 5. clamp above the floor again
//!
//! Only integration runs in parallel. Resolution mutates both members of a
//! pair, so the collision loop is single-threaded and tracker callbacks fire
//! in a deterministic order.

use std::collections::BTreeSet;
use std::time::Duration;

use rayon::prelude::*;

use crate::core::config::{BroadPhaseMode, PhysicsConfig};
use crate::ecs::components::{
    BoxColliderComponent, Collider, CollisionTrackerComponent, RigidBodyComponent,
    SphereColliderComponent, TransformComponent,
};
use crate::ecs::{Entity, World};
use crate::foundation::math::{Vec3, AABB};
use crate::foundation::time::Stopwatch;
use crate::physics::broad_phase::{BroadPhase, LinearBroadPhase, OctreeBroadPhase};
use crate::physics::resolution::{is_colliding, resolve_collision};
use crate::spatial::Octree;

/// Downward acceleration added every tick
pub const GRAVITY: f32 = 10.0;

/// Per-tick decay applied to accumulated acceleration
pub const DAMPING: f32 = 0.98;

/// Velocity clamp applied per component
pub const MAX_VELOCITY: f32 = 1000.0;

/// Counters and timings of one fixed tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    /// Bodies taking part in collision detection
    pub body_count: usize,
    /// Narrow-phase tests run
    pub collision_tests: usize,
    /// Confirmed collisions handed to the resolvers
    pub collisions_resolved: usize,
    /// Time spent integrating
    pub integration_time: Duration,
    /// Time spent in broad phase, narrow phase and resolution
    pub collision_time: Duration,
}

/// Snapshot of one simulated entity
#[derive(Debug, Clone, Copy)]
struct Body {
    entity: Entity,
    transform: TransformComponent,
    rigid_body: Option<RigidBodyComponent>,
    collider: Option<Collider>,
    tracked: bool,
}

/// Physics system driving the fixed-step simulation
pub struct PhysicsSystem {
    config: PhysicsConfig,
    broad_phase: Box<dyn BroadPhase>,
    bodies: Vec<Body>,
    colliders: Vec<Collider>,
    collision_set: Vec<usize>,
    pairs: Vec<(usize, usize)>,
    last_entities: Vec<Entity>,
    last_stats: TickStats,
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsSystem {
    /// Create a physics system with the given configuration
    pub fn new(config: PhysicsConfig) -> Self {
        let broad_phase = make_broad_phase(&config);
        log::info!(
            "Physics system created: {} broad phase, parallel integration {}",
            broad_phase.name(),
            config.parallel_integration
        );
        Self {
            config,
            broad_phase,
            bodies: Vec::new(),
            colliders: Vec::new(),
            collision_set: Vec::new(),
            pairs: Vec::new(),
            last_entities: Vec::new(),
            last_stats: TickStats::default(),
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Switch between the linear and the octree broad phase
    pub fn set_broad_phase_mode(&mut self, mode: BroadPhaseMode) {
        if self.config.broad_phase == mode {
            return;
        }
        self.config.broad_phase = mode;
        self.broad_phase = make_broad_phase(&self.config);
        self.last_entities.clear();
        log::info!("Broad phase switched to {}", self.broad_phase.name());
    }

    /// Name of the active broad phase
    pub fn broad_phase_name(&self) -> &'static str {
        self.broad_phase.name()
    }

    /// Octree built by the last tick, if the octree broad phase is active
    pub fn octree(&self) -> Option<&Octree<usize>> {
        self.broad_phase.octree()
    }

    /// Statistics of the last tick
    pub const fn last_stats(&self) -> TickStats {
        self.last_stats
    }

    /// Run one fixed tick
    pub fn fixed_update(&mut self, world: &mut World, fixed_dt: f32) -> TickStats {
        let mut stats = TickStats::default();

        for (_, tracker) in world.query_mut::<CollisionTrackerComponent>() {
            tracker.reset();
        }

        self.gather(world);
        let floor = self.config.floor_height;
        rectify(&mut self.bodies, floor);

        let stopwatch = Stopwatch::start_new();
        if self.config.parallel_integration {
            self.bodies.par_iter_mut().for_each(|body| integrate_body(body, fixed_dt));
        } else {
            self.bodies.iter_mut().for_each(|body| integrate_body(body, fixed_dt));
        }
        stats.integration_time = stopwatch.elapsed();

        let stopwatch = Stopwatch::start_new();
        self.collect_candidates();
        stats.body_count = self.collision_set.len();

        for &(a, b) in &self.pairs {
            let (i, j) = (self.collision_set[a], self.collision_set[b]);
            stats.collision_tests += 1;

            let other = self.bodies[j].entity;
            if let Some(tracker) = tracked(world, &self.bodies[i]) {
                tracker.record_test(other);
            }

            let (first, second) = pair_mut(&mut self.bodies, i, j);
            let (Some(c0), Some(c1)) = (first.collider.as_mut(), second.collider.as_mut()) else {
                continue;
            };
            if !is_colliding(c0, c1) {
                continue;
            }
            let (Some(rb0), Some(rb1)) = (first.rigid_body.as_mut(), second.rigid_body.as_mut()) else {
                continue;
            };

            stats.collisions_resolved += 1;
            resolve_collision(c0, rb0, &mut first.transform, c1, rb1, &mut second.transform);

            if let Some(tracker) = tracked(world, &self.bodies[i]) {
                tracker.record_collision(other);
            }
        }
        stats.collision_time = stopwatch.elapsed();

        rectify(&mut self.bodies, floor);
        self.reindex();
        self.scatter(world);

        log::trace!(
            "Physics tick: {} bodies, {} tests, {} collisions",
            stats.body_count,
            stats.collision_tests,
            stats.collisions_resolved
        );
        self.last_stats = stats;
        stats
    }

    /// Every intersecting pair of collider entities in the current world state
    ///
    /// Runs the active broad phase and the narrow-phase tests without
    /// resolving anything. Pairs are reported once, smaller entity first, in
    /// sorted order.
    pub fn detect_pairs(&mut self, world: &World) -> Vec<(Entity, Entity)> {
        self.gather(world);
        self.collect_candidates();

        let mut found = BTreeSet::new();
        for &(a, b) in &self.pairs {
            let (i, j) = (self.collision_set[a], self.collision_set[b]);
            let (Some(c0), Some(c1)) = (&self.bodies[i].collider, &self.bodies[j].collider) else {
                continue;
            };
            if is_colliding(c0, c1) {
                let (e0, e1) = (self.bodies[i].entity, self.bodies[j].entity);
                found.insert((e0.min(e1), e0.max(e1)));
            }
        }
        found.into_iter().collect()
    }

    /// Entities whose collider bounds overlap the box `[min, max]`
    ///
    /// With the octree broad phase the candidates come from the index left
    /// by the last tick (refreshed after resolution) or detection call;
    /// otherwise every collider in the
    /// world is scanned. Candidates are filtered against the current
    /// collider bounds.
    pub fn query_region(&self, world: &World, min: Vec3, max: Vec3) -> Vec<Entity> {
        let region = AABB::new(min, max);
        let overlaps = |entity: Entity| collider_of(world, entity).is_some_and(|c| c.aabb().intersects(&region));

        let indexed = self
            .broad_phase
            .region_candidates(&region)
            .filter(|_| !self.last_entities.is_empty());

        let mut found: Vec<Entity> = match indexed {
            Some(indices) => indices
                .into_iter()
                .filter_map(|index| self.last_entities.get(index).copied())
                .filter(|&entity| overlaps(entity))
                .collect(),
            None => world
                .query::<TransformComponent>()
                .map(|(entity, _)| entity)
                .filter(|&entity| overlaps(entity))
                .collect(),
        };
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Accelerate every rigid body towards `target`
    ///
    /// Adds `normalize(target - position) * mass * strength`; bodies already
    /// at the target are left alone.
    pub fn attract_towards(world: &mut World, target: Vec3, strength: f32) {
        world.for_each_pair_mut::<RigidBodyComponent, TransformComponent, _>(|_, rb, transform| {
            let offset = target - transform.position;
            if let Some(direction) = offset.try_normalize(f32::EPSILON) {
                rb.add_acceleration(direction * rb.mass * strength);
            }
        });
    }

    fn gather(&mut self, world: &World) {
        self.bodies.clear();
        self.bodies.extend(world.query::<TransformComponent>().map(|(entity, transform)| Body {
            entity,
            transform: *transform,
            rigid_body: world.get_component::<RigidBodyComponent>(entity).copied(),
            collider: collider_of(world, entity),
            tracked: world.has_component::<CollisionTrackerComponent>(entity),
        }));
    }

    fn collect_candidates(&mut self) {
        self.collision_set.clear();
        self.colliders.clear();
        self.last_entities.clear();
        for (index, body) in self.bodies.iter().enumerate() {
            // Only bodies with both a rigid body and a collider collide
            if let Some(collider) = body.rigid_body.and(body.collider) {
                self.collision_set.push(index);
                self.colliders.push(collider);
                self.last_entities.push(body.entity);
            }
        }

        self.pairs.clear();
        self.broad_phase.collect_pairs(&self.colliders, &mut self.pairs);
    }

    /// Hand the broad phase the post-resolution colliders of the tick
    fn reindex(&mut self) {
        self.colliders.clear();
        self.colliders.extend(self.collision_set.iter().filter_map(|&index| self.bodies[index].collider));
        self.broad_phase.reindex(&self.colliders);
    }

    fn scatter(&self, world: &mut World) {
        for body in &self.bodies {
            if let Some(transform) = world.get_component_mut::<TransformComponent>(body.entity) {
                *transform = body.transform;
            }
            if let (Some(rb), Some(stored)) = (
                body.rigid_body,
                world.get_component_mut::<RigidBodyComponent>(body.entity),
            ) {
                *stored = rb;
            }
            match body.collider {
                Some(Collider::Sphere(sphere)) => {
                    if let Some(stored) = world.get_component_mut::<SphereColliderComponent>(body.entity) {
                        *stored = sphere;
                    }
                }
                Some(Collider::Box(bounds)) => {
                    if let Some(stored) = world.get_component_mut::<BoxColliderComponent>(body.entity) {
                        *stored = bounds;
                    }
                }
                None => {}
            }
        }
    }
}

fn make_broad_phase(config: &PhysicsConfig) -> Box<dyn BroadPhase> {
    match config.broad_phase {
        BroadPhaseMode::Linear => Box::new(LinearBroadPhase),
        BroadPhaseMode::Octree => Box::new(OctreeBroadPhase::new(config.octree.clone())),
    }
}

/// Collider attached to `entity`; a sphere wins when both shapes are present
fn collider_of(world: &World, entity: Entity) -> Option<Collider> {
    world
        .get_component::<SphereColliderComponent>(entity)
        .map(|sphere| Collider::Sphere(*sphere))
        .or_else(|| {
            world
                .get_component::<BoxColliderComponent>(entity)
                .map(|bounds| Collider::Box(*bounds))
        })
}

fn tracked<'w>(world: &'w mut World, body: &Body) -> Option<&'w mut CollisionTrackerComponent> {
    if body.tracked {
        world.get_component_mut::<CollisionTrackerComponent>(body.entity)
    } else {
        None
    }
}

/// Two distinct bodies borrowed mutably at once
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Keep every collider above the floor plane and in sync with its transform
fn rectify(bodies: &mut [Body], floor: f32) {
    for body in bodies {
        match body.collider.as_mut() {
            Some(Collider::Sphere(sphere)) => {
                body.transform.position.y = body.transform.position.y.max(floor + sphere.radius);
                sphere.sync_from_transform(&body.transform);
            }
            Some(Collider::Box(bounds)) => {
                body.transform.position.y = body.transform.position.y.max(floor + body.transform.scale.y);
                bounds.sync_from_transform(&body.transform);
            }
            None => {}
        }
    }
}

fn integrate_body(body: &mut Body, dt: f32) {
    if let Some(rb) = body.rigid_body.as_mut() {
        integrate(rb, &mut body.transform, dt);
    }
}

/// Advance one body by `dt`
pub fn integrate(rb: &mut RigidBodyComponent, transform: &mut TransformComponent, dt: f32) {
    rb.velocity += rb.acceleration;
    rb.velocity -= rb.velocity * rb.friction;
    rb.acceleration.y -= GRAVITY;
    rb.velocity = rb.velocity.map(|v| v.clamp(-MAX_VELOCITY, MAX_VELOCITY));
    transform.position += rb.velocity * dt;
    rb.acceleration *= DAMPING;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integrate_order() {
        let mut rb = RigidBodyComponent::new(1.0, 0.5);
        rb.acceleration = Vec3::new(2.0, 0.0, 0.0);
        let mut transform = TransformComponent::identity();

        integrate(&mut rb, &mut transform, 0.5);

        // v = (0 + a) * (1 - friction); gravity lands in the acceleration for the next tick
        assert_relative_eq!(rb.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(transform.position, Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(rb.acceleration, Vec3::new(2.0, -GRAVITY, 0.0) * DAMPING);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let mut rb = RigidBodyComponent::new(1.0, 0.0);
        rb.acceleration = Vec3::new(5000.0, -5000.0, 10.0);
        let mut transform = TransformComponent::identity();

        integrate(&mut rb, &mut transform, 1.0);
        assert_relative_eq!(rb.velocity, Vec3::new(MAX_VELOCITY, -MAX_VELOCITY, 10.0));
    }

    #[test]
    fn test_empty_world_tick() {
        let mut world = World::new();
        let mut physics = PhysicsSystem::default();
        let stats = physics.fixed_update(&mut world, 1.0 / 60.0);
        assert_eq!(stats.body_count, 0);
        assert_eq!(stats.collision_tests, 0);
        assert!(physics.detect_pairs(&world).is_empty());
    }

    #[test]
    fn test_pair_mut_borrows_both_orders() {
        let body = Body {
            entity: Entity::default(),
            transform: TransformComponent::identity(),
            rigid_body: None,
            collider: None,
            tracked: false,
        };
        let mut bodies = vec![body; 3];
        bodies[2].transform.position.x = 2.0;

        let (a, b) = pair_mut(&mut bodies, 2, 0);
        assert_relative_eq!(a.transform.position.x, 2.0);
        assert_relative_eq!(b.transform.position.x, 0.0);
        let (a, b) = pair_mut(&mut bodies, 0, 2);
        assert_relative_eq!(a.transform.position.x, 0.0);
        assert_relative_eq!(b.transform.position.x, 2.0);
    }
}
