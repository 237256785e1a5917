//! Octree wireframe extraction
//!
//! Flattens an [`Octree`] into one box per node so a renderer can draw the
//! partition as cube outlines, colored by depth or occupancy.

use crate::foundation::math::{Vec3, AABB};
use crate::spatial::{NodeId, Octree, OctreeNode, OctreeVisitor};

/// One node of the octree, ready for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctantBox {
    /// Node centre
    pub centre: Vec3,
    /// Half the edge length of the cube
    pub half_size: f32,
    /// Depth of the node (root is 0)
    pub depth: u32,
    /// Elements resident in the node itself
    pub occupancy: usize,
}

impl OctantBox {
    /// Axis-aligned bounds of the box
    pub fn bounds(&self) -> AABB {
        AABB::cube(self.centre, self.half_size)
    }

    /// Whether the node holds any element
    pub const fn is_occupied(&self) -> bool {
        self.occupancy > 0
    }
}

#[derive(Default)]
struct OctantCollector {
    boxes: Vec<OctantBox>,
}

impl<T> OctreeVisitor<T> for OctantCollector {
    fn visit_node(&mut self, _id: NodeId, node: &OctreeNode<T>) {
        self.boxes.push(OctantBox {
            centre: node.centre,
            half_size: node.half_size,
            depth: node.depth,
            occupancy: node.data().len(),
        });
    }
}

/// Every node below the root, in pre-order
pub fn collect_octant_boxes<T: Copy + Ord>(octree: &Octree<T>) -> Vec<OctantBox> {
    let mut collector = OctantCollector::default();
    octree.visit(&mut collector, true);
    collector.boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_root_is_skipped() {
        let octree: Octree<u32> = Octree::new(Vec3::zeros(), 8.0, 2);
        let boxes = collect_octant_boxes(&octree);
        assert_eq!(boxes.len(), octree.node_count() - 1);
        assert!(boxes.iter().all(|b| b.depth >= 1));
        assert!(boxes.iter().all(|b| !b.is_occupied()));

        assert_eq!(boxes[0].depth, 1);
        assert_relative_eq!(boxes[0].half_size, 4.0);
        assert_eq!(boxes[1].depth, 2);
        assert_relative_eq!(boxes[1].half_size, 2.0);
    }

    #[test]
    fn test_occupancy_is_per_node() {
        let mut octree = Octree::new(Vec3::zeros(), 8.0, 1);
        assert!(octree.insert_cube(7_u32, Vec3::repeat(4.0), 1.0));
        assert!(octree.insert_cube(8_u32, Vec3::repeat(5.0), 1.0));

        let boxes = collect_octant_boxes(&octree);
        let occupied: Vec<_> = boxes.iter().filter(|b| b.is_occupied()).collect();
        assert_eq!(occupied.len(), 1);
        assert_eq!(occupied[0].occupancy, 2);
        assert_relative_eq!(occupied[0].centre, Vec3::repeat(4.0));
        assert_relative_eq!(occupied[0].bounds().max, Vec3::repeat(8.0));
    }
}
