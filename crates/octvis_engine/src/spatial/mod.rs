//! Spatial partitioning data structures
//!
//! Provides the bounded-depth octree used as the accelerated broad phase and
//! for region queries.

mod octree;

pub use octree::{
    NodeId, Octree, OctreeNode, OctreeVisitor, CHILD_COUNT, DEFAULT_DEPTH, MAX_DEPTH, MIN_DEPTH,
    OCTANT_FLAG_X, OCTANT_FLAG_Y, OCTANT_FLAG_Z,
};
