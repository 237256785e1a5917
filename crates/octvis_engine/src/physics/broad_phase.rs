//! Broad-phase candidate generation
//!
//! A broad phase turns the dense collider buffer of a tick into ordered
//! candidate pairs `(i, j)`, `i != j`, indexing into that buffer. The narrow
//! phase then runs the exact test on every candidate in order.
//!
//! The octree path never drops a pair the linear path would report as
//! intersecting, as long as both bodies lie inside the octree volume.

use crate::core::config::OctreeConfig;
use crate::ecs::components::Collider;
use crate::foundation::math::{Vec3, AABB};
use crate::spatial::Octree;

/// Margin added around the fitted scene bounds
const FIT_MARGIN: f32 = 1.0;

/// Candidate pair generator
pub trait BroadPhase: Send + Sync {
    /// Short name for logs and reports
    fn name(&self) -> &'static str;

    /// Append the candidate pairs for `colliders` to `pairs`
    fn collect_pairs(&mut self, colliders: &[Collider], pairs: &mut Vec<(usize, usize)>);

    /// Refresh the spatial index with the colliders' current bounds
    ///
    /// Called once the tick has moved the bodies, so that region queries
    /// answer from where the bodies ended up. `colliders` keeps the order of
    /// the last `collect_pairs` call.
    fn reindex(&mut self, _colliders: &[Collider]) {}

    /// Spatial index built by the last call, if this broad phase keeps one
    fn octree(&self) -> Option<&Octree<usize>> {
        None
    }

    /// Indices from the last call whose bounds may overlap `region`
    ///
    /// `None` when the broad phase keeps no index to answer from.
    fn region_candidates(&self, _region: &AABB) -> Option<Vec<usize>> {
        None
    }
}

/// Every ordered pair of distinct colliders
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearBroadPhase;

impl BroadPhase for LinearBroadPhase {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn collect_pairs(&mut self, colliders: &[Collider], pairs: &mut Vec<(usize, usize)>) {
        let count = colliders.len();
        pairs.reserve(count.saturating_mul(count.saturating_sub(1)));
        for i in 0..count {
            for j in (0..count).filter(|&j| j != i) {
                pairs.push((i, j));
            }
        }
    }
}

/// Octree-accelerated broad phase
///
/// Each call rebuilds the tree, inserts every collider's padded bounds, then
/// pairs each collider with the residents of the subtree under the deepest
/// node enclosing its padded bounds.
#[derive(Debug, Clone)]
pub struct OctreeBroadPhase {
    config: OctreeConfig,
    octree: Octree<usize>,
    padded: Vec<AABB>,
    max_padded_extent: f32,
    unplaced: usize,
}

impl OctreeBroadPhase {
    /// Create a broad phase with the given octree settings
    pub fn new(config: OctreeConfig) -> Self {
        let octree = Octree::new(Vec3::from(config.centre), config.half_size, config.depth);
        Self {
            config,
            octree,
            padded: Vec::new(),
            max_padded_extent: 0.0,
            unplaced: 0,
        }
    }

    /// Octree settings in use
    pub const fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Bodies that got no candidates in the last call (outside the volume)
    pub const fn unplaced(&self) -> usize {
        self.unplaced
    }

    /// Bounds inserted into the octree for a collider
    pub fn padded_bounds(&self, collider: &Collider) -> AABB {
        padded_bounds(&self.config, collider)
    }

    fn rebuild(&mut self) {
        if self.config.fit_to_scene {
            let Some(scene) = self.padded.iter().copied().reduce(|a, b| a.union(&b)) else {
                self.octree.clear_data();
                return;
            };
            let half_size = scene.extents().max() + FIT_MARGIN;
            self.octree.rebuild(scene.center(), half_size, self.config.depth);
        } else {
            self.octree.rebuild(
                Vec3::from(self.config.centre),
                self.config.half_size,
                self.config.depth,
            );
        }
    }

    /// Rebuild the tree around `colliders` and insert their padded bounds
    ///
    /// Returns the number of colliders that fit no node.
    fn index(&mut self, colliders: &[Collider]) -> usize {
        self.padded.clear();
        self.padded.extend(colliders.iter().map(|collider| padded_bounds(&self.config, collider)));
        self.max_padded_extent = self
            .padded
            .iter()
            .map(|bounds| bounds.extents().max())
            .fold(0.0, f32::max);
        self.rebuild();

        let mut failed_inserts = 0;
        for (index, bounds) in self.padded.iter().enumerate() {
            if !self.octree.insert(index, bounds.min, bounds.max) {
                failed_inserts += 1;
            }
        }
        failed_inserts
    }
}

fn padded_bounds(config: &OctreeConfig, collider: &Collider) -> AABB {
    match collider {
        Collider::Sphere(sphere) => AABB::cube(sphere.centre, sphere.radius * config.sphere_padding),
        Collider::Box(bounds) => bounds.aabb().expanded(config.box_padding),
    }
}

impl Default for OctreeBroadPhase {
    fn default() -> Self {
        Self::new(OctreeConfig::default())
    }
}

impl BroadPhase for OctreeBroadPhase {
    fn name(&self) -> &'static str {
        "octree"
    }

    fn collect_pairs(&mut self, colliders: &[Collider], pairs: &mut Vec<(usize, usize)>) {
        let failed_inserts = self.index(colliders);

        self.unplaced = 0;
        for (index, bounds) in self.padded.iter().enumerate() {
            let Some(node) = self.octree.find_enclosing(bounds.min, bounds.max) else {
                self.unplaced += 1;
                continue;
            };
            self.octree.for_each_element(node, |&other| {
                if other != index {
                    pairs.push((index, other));
                }
            });
        }

        if failed_inserts > 0 || self.unplaced > 0 {
            log::debug!(
                "Octree broad phase: {failed_inserts} inserts failed, {} bodies outside the volume",
                self.unplaced
            );
        }
        log::trace!(
            "Octree broad phase: {} colliders, {} candidate pairs",
            colliders.len(),
            pairs.len()
        );
    }

    fn reindex(&mut self, colliders: &[Collider]) {
        let failed_inserts = self.index(colliders);
        if failed_inserts > 0 {
            log::debug!("Octree reindex: {failed_inserts} colliders left the volume");
        }
    }

    fn octree(&self) -> Option<&Octree<usize>> {
        Some(&self.octree)
    }

    fn region_candidates(&self, region: &AABB) -> Option<Vec<usize>> {
        // A resident's leaf touches its padded bounds somewhere, so widen the
        // region by the largest padded diameter before collecting leaves.
        let search = region.expanded(self.max_padded_extent * 2.0);
        let mut found = Vec::new();
        self.octree.query_region(search.min, search.max, &mut found);
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{BoxColliderComponent, SphereColliderComponent};

    fn sphere(x: f32, y: f32, z: f32, radius: f32) -> Collider {
        Collider::Sphere(SphereColliderComponent::new(Vec3::new(x, y, z), radius))
    }

    #[test]
    fn test_linear_yields_all_ordered_pairs() {
        let colliders = vec![sphere(0.0, 0.0, 0.0, 1.0); 4];
        let mut pairs = Vec::new();
        LinearBroadPhase.collect_pairs(&colliders, &mut pairs);
        assert_eq!(pairs.len(), 12);
        assert!(pairs.iter().all(|(i, j)| i != j));
        assert_eq!(pairs[0], (0, 1));

        pairs.clear();
        LinearBroadPhase.collect_pairs(&[], &mut pairs);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_padding() {
        let broad_phase = OctreeBroadPhase::default();
        let padded = broad_phase.padded_bounds(&sphere(0.0, 0.0, 0.0, 2.0));
        assert_eq!(padded.max, Vec3::repeat(3.0));

        let bounds = Collider::Box(BoxColliderComponent {
            min: Vec3::zeros(),
            max: Vec3::repeat(1.0),
        });
        let padded = broad_phase.padded_bounds(&bounds);
        assert_eq!(padded.min, Vec3::repeat(-5.0));
        assert_eq!(padded.max, Vec3::repeat(6.0));
    }

    #[test]
    fn test_octree_separates_distant_clusters() {
        let colliders = vec![
            sphere(-100.0, -100.0, -100.0, 1.0),
            sphere(-98.0, -100.0, -100.0, 1.0),
            sphere(100.0, 100.0, 100.0, 1.0),
            sphere(101.0, 100.0, 100.0, 1.0),
        ];
        let mut broad_phase = OctreeBroadPhase::default();
        let mut pairs = Vec::new();
        broad_phase.collect_pairs(&colliders, &mut pairs);

        assert!(pairs.contains(&(0, 1)) || pairs.contains(&(1, 0)));
        assert!(pairs.contains(&(2, 3)) || pairs.contains(&(3, 2)));
        assert!(!pairs.iter().any(|&(i, j)| (i < 2) != (j < 2)));
        assert_eq!(broad_phase.unplaced(), 0);
        assert_eq!(broad_phase.octree().map(Octree::element_count), Some(4));
    }

    #[test]
    fn test_fixed_volume_skips_outside_bodies() {
        let config = OctreeConfig {
            fit_to_scene: false,
            half_size: 16.0,
            ..OctreeConfig::default()
        };
        let mut broad_phase = OctreeBroadPhase::new(config);
        let colliders = vec![sphere(0.0, 0.0, 0.0, 1.0), sphere(100.0, 0.0, 0.0, 1.0)];
        let mut pairs = Vec::new();
        broad_phase.collect_pairs(&colliders, &mut pairs);

        assert_eq!(broad_phase.unplaced(), 1);
        assert!(pairs.is_empty());
    }
}
