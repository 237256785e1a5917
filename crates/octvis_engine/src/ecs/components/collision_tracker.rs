//! Collision tracking component
//!
//! Optional per-entity observer for the physics tick. The callback runs
//! synchronously inside the collision loop: once for every candidate pair the
//! entity is tested against, and once more when that test confirms a
//! collision. Counters are reset at the start of every fixed tick.

use crate::ecs::{Component, Entity};

/// Callback signature: `(other_entity, tests_so_far, collisions_so_far)`
pub type CollisionCallback = Box<dyn FnMut(Entity, usize, usize) + Send + Sync>;

/// Per-entity collision observer with running counters
pub struct CollisionTrackerComponent {
    callback: Option<CollisionCallback>,

    /// Narrow-phase tests run for this entity during the current tick
    pub num_collision_tests: usize,

    /// Confirmed collisions for this entity during the current tick
    pub num_collisions: usize,
}

impl Component for CollisionTrackerComponent {}

impl Default for CollisionTrackerComponent {
    fn default() -> Self {
        Self::counting()
    }
}

impl std::fmt::Debug for CollisionTrackerComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionTrackerComponent")
            .field("has_callback", &self.callback.is_some())
            .field("num_collision_tests", &self.num_collision_tests)
            .field("num_collisions", &self.num_collisions)
            .finish()
    }
}

impl CollisionTrackerComponent {
    /// Tracker that invokes `callback` on every test and every collision
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(Entity, usize, usize) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
            num_collision_tests: 0,
            num_collisions: 0,
        }
    }

    /// Tracker that only keeps counters
    pub const fn counting() -> Self {
        Self {
            callback: None,
            num_collision_tests: 0,
            num_collisions: 0,
        }
    }

    /// Zero the per-tick counters
    pub fn reset(&mut self) {
        self.num_collision_tests = 0;
        self.num_collisions = 0;
    }

    /// Record a narrow-phase test against `other`
    pub fn record_test(&mut self, other: Entity) {
        self.num_collision_tests += 1;
        self.notify(other);
    }

    /// Record a confirmed collision with `other`
    pub fn record_collision(&mut self, other: Entity) {
        self.num_collisions += 1;
        self.notify(other);
    }

    fn notify(&mut self, other: Entity) {
        if let Some(callback) = self.callback.as_mut() {
            callback(other, self.num_collision_tests, self.num_collisions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_callback_sees_running_counts() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let mut tracker = CollisionTrackerComponent::new(move |other, tests, collisions| {
            sink.lock().unwrap().push((other, tests, collisions));
        });

        let other = Entity::default();
        tracker.record_test(other);
        tracker.record_collision(other);
        tracker.record_test(other);

        assert_eq!(
            *calls.lock().unwrap(),
            vec![(other, 1, 0), (other, 1, 1), (other, 2, 1)]
        );

        tracker.reset();
        assert_eq!(tracker.num_collision_tests, 0);
        assert_eq!(tracker.num_collisions, 0);
    }
}
