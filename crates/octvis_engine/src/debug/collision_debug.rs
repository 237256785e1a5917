//! Collision debug recording
//!
//! Collects what the collision trackers report during a tick so a viewer can
//! highlight bodies that were tested or actually collided.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ecs::components::CollisionTrackerComponent;
use crate::ecs::{Entity, World};

/// Colors for collision debug highlighting (RGBA)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionDebugColors {
    /// Body with no narrow-phase test this tick
    pub idle: [f32; 4],
    /// Body tested but not colliding
    pub tested: [f32; 4],
    /// Body that collided
    pub colliding: [f32; 4],
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            idle: [0.0, 1.0, 0.0, 0.5],
            tested: [1.0, 1.0, 0.0, 0.7],
            colliding: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Highlight state of a tracked body for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// Not tested against anything
    Idle,
    /// Tested, no overlap found
    Tested,
    /// At least one collision
    Colliding,
}

impl Highlight {
    /// Color for this state
    pub const fn color(self, colors: &CollisionDebugColors) -> [f32; 4] {
        match self {
            Self::Idle => colors.idle,
            Self::Tested => colors.tested,
            Self::Colliding => colors.colliding,
        }
    }
}

/// What a single tracker reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackedContact {
    /// Narrow-phase tests this tick
    pub collision_tests: usize,
    /// Collisions this tick
    pub collisions: usize,
    /// Partner of the most recent test or collision
    pub last_partner: Option<Entity>,
}

type ContactMap = HashMap<Entity, TrackedContact>;

/// Shared sink for collision tracker callbacks
///
/// Cloning shares the underlying record. Call [`begin_tick`](Self::begin_tick)
/// before each fixed tick so highlights reflect that tick only.
#[derive(Debug, Clone, Default)]
pub struct CollisionDebugRecorder {
    contacts: Arc<Mutex<ContactMap>>,
    /// Palette used by [`Highlight::color`]
    pub colors: CollisionDebugColors,
}

impl CollisionDebugRecorder {
    /// Create an empty recorder with the default palette
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker whose callbacks feed this recorder under `entity`
    pub fn tracker_for(&self, entity: Entity) -> CollisionTrackerComponent {
        let contacts = Arc::clone(&self.contacts);
        CollisionTrackerComponent::new(move |other, tests, collisions| {
            let mut contacts = contacts.lock().unwrap_or_else(PoisonError::into_inner);
            let contact = contacts.entry(entity).or_default();
            contact.collision_tests = tests;
            contact.collisions = collisions;
            contact.last_partner = Some(other);
        })
    }

    /// Attach a recording tracker to `entity`, replacing any existing one
    pub fn track(&self, world: &mut World, entity: Entity) {
        world.add_component(entity, self.tracker_for(entity));
    }

    /// Forget everything recorded so far
    pub fn begin_tick(&self) {
        self.lock().clear();
    }

    /// What `entity`'s tracker reported since the last `begin_tick`
    pub fn contact(&self, entity: Entity) -> Option<TrackedContact> {
        self.lock().get(&entity).copied()
    }

    /// Highlight for `entity`; untracked entities are idle
    pub fn highlight(&self, entity: Entity) -> Highlight {
        match self.contact(entity) {
            Some(contact) if contact.collisions > 0 => Highlight::Colliding,
            Some(contact) if contact.collision_tests > 0 => Highlight::Tested,
            _ => Highlight::Idle,
        }
    }

    /// Number of tracked bodies that collided this tick
    pub fn colliding_count(&self) -> usize {
        self.lock().values().filter(|contact| contact.collisions > 0).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ContactMap> {
        self.contacts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
