//! Octree spatial partitioning structure
//!
//! A cubic world volume is subdivided eagerly into a complete tree of bounded
//! depth. Nodes live in a flat arena and refer to each other by [`NodeId`];
//! the eight children of an internal node occupy consecutive slots.
//!
//! Element membership is rebuilt from scratch each time the tree is used as a
//! broad phase, so the structure never rebalances and never moves elements
//! between nodes.
//!
//! Octant layout (bit 0 selects x, bit 1 selects y, bit 2 selects z):
//!
//! ```text
//! 0: -X, -Y, -Z    4: -X, -Y, +Z
//! 1: +X, -Y, -Z    5: +X, -Y, +Z
//! 2: -X, +Y, -Z    6: -X, +Y, +Z
//! 3: +X, +Y, -Z    7: +X, +Y, +Z
//! ```

use std::collections::BTreeSet;

use crate::foundation::math::{Vec3, AABB};

/// Number of children of an internal node
pub const CHILD_COUNT: usize = 8;

/// Shallowest supported tree (9 nodes)
pub const MIN_DEPTH: u32 = 1;

/// Deepest supported tree (4681 nodes)
pub const MAX_DEPTH: u32 = 4;

/// Depth used when none is requested
pub const DEFAULT_DEPTH: u32 = 2;

/// Octant bit selecting the +x half
pub const OCTANT_FLAG_X: usize = 1;

/// Octant bit selecting the +y half
pub const OCTANT_FLAG_Y: usize = 2;

/// Octant bit selecting the +z half
pub const OCTANT_FLAG_Z: usize = 4;

/// Index of a node inside the octree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node of every tree
    pub const ROOT: Self = Self(0);

    /// Position in the arena
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode<T> {
    /// Centre of the node's cube
    pub centre: Vec3,

    /// Half the edge length; the node spans `centre ± half_size` on every axis
    pub half_size: f32,

    /// Distance from the root (0 at the root)
    pub depth: u32,

    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    data: BTreeSet<T>,
}

impl<T> OctreeNode<T> {
    fn new(centre: Vec3, half_size: f32, depth: u32, parent: Option<NodeId>) -> Self {
        Self {
            centre,
            half_size,
            depth,
            parent,
            first_child: None,
            data: BTreeSet::new(),
        }
    }

    /// Check if this node is a leaf (has no children)
    pub const fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }

    /// Owning node, `None` for the root
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in octant order; empty for leaves
    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        let first = self.first_child.map_or(0, NodeId::index);
        let count = if self.first_child.is_some() { CHILD_COUNT } else { 0 };
        (first..first + count).map(NodeId)
    }

    /// Elements resident in this node
    pub const fn data(&self) -> &BTreeSet<T> {
        &self.data
    }

    /// World-space bounds
    pub fn bounds(&self) -> AABB {
        AABB::cube(self.centre, self.half_size)
    }

    /// Centre of child `octant` of a node with this centre and half-size
    fn child_centre(&self, octant: usize) -> Vec3 {
        let offset = self.half_size * 0.5;
        let sign = |flag: usize| if octant & flag != 0 { offset } else { -offset };
        self.centre + Vec3::new(sign(OCTANT_FLAG_X), sign(OCTANT_FLAG_Y), sign(OCTANT_FLAG_Z))
    }
}

/// Callbacks for [`Octree::visit`]
///
/// Both methods default to doing nothing so implementors only override what
/// they need.
pub trait OctreeVisitor<T> {
    /// Called once per node, parents before children
    fn visit_node(&mut self, _id: NodeId, _node: &OctreeNode<T>) {}

    /// Called for every element resident in the node just visited
    fn visit_element(&mut self, _element: &T) {}
}

/// Octree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Octree<T> {
    nodes: Vec<OctreeNode<T>>,
    depth: u32,
}

impl<T: Copy + Ord> Octree<T> {
    /// Create a fully subdivided tree
    ///
    /// `depth` is clamped to `[MIN_DEPTH, MAX_DEPTH]`.
    pub fn new(centre: Vec3, half_size: f32, depth: u32) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            depth: MIN_DEPTH,
        };
        tree.rebuild(centre, half_size, depth);
        tree
    }

    /// Number of nodes in a complete tree of the given depth
    pub const fn nodes_for_depth(depth: u32) -> usize {
        let mut total = 0;
        let mut level = 0;
        let mut width = 1;
        while level <= depth {
            total += width;
            width *= CHILD_COUNT;
            level += 1;
        }
        total
    }

    /// Discard every node and subdivide a new tree
    pub fn rebuild(&mut self, centre: Vec3, half_size: f32, depth: u32) {
        let clamped = depth.clamp(MIN_DEPTH, MAX_DEPTH);
        if clamped != depth {
            log::trace!("Octree depth {depth} clamped to {clamped}");
        }

        self.depth = clamped;
        self.nodes.clear();
        self.nodes.reserve(Self::nodes_for_depth(clamped));
        self.nodes.push(OctreeNode::new(centre, half_size, 0, None));
        self.subdivide(NodeId::ROOT);
    }

    fn subdivide(&mut self, id: NodeId) {
        let node = &self.nodes[id.index()];
        if node.depth >= self.depth {
            return;
        }

        let depth = node.depth + 1;
        let half_size = node.half_size * 0.5;
        let centres: [Vec3; CHILD_COUNT] = std::array::from_fn(|octant| node.child_centre(octant));

        let first = NodeId(self.nodes.len());
        for centre in centres {
            self.nodes.push(OctreeNode::new(centre, half_size, depth, Some(id)));
        }
        self.nodes[id.index()].first_child = Some(first);

        for octant in 0..CHILD_COUNT {
            self.subdivide(NodeId(first.index() + octant));
        }
    }

    /// Subdivision depth of the tree (leaves sit at this depth)
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Root node
    pub fn root(&self) -> &OctreeNode<T> {
        &self.nodes[NodeId::ROOT.index()]
    }

    /// Node by id
    ///
    /// Panics if `id` did not come from this tree's current build.
    pub fn node(&self, id: NodeId) -> &OctreeNode<T> {
        &self.nodes[id.index()]
    }

    /// Bounds of the whole tree
    pub fn bounds(&self) -> AABB {
        self.root().bounds()
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Number of resident elements across all nodes
    pub fn element_count(&self) -> usize {
        self.nodes.iter().map(|node| node.data.len()).sum()
    }

    /// Empty every node's membership, keeping the structure
    pub fn clear_data(&mut self) {
        for node in &mut self.nodes {
            node.data.clear();
        }
    }

    /// Predicate-guided descent
    ///
    /// Starts at the root's children and tests them in octant order. The first
    /// child accepted by `predicate` is committed to: if it is a leaf (or sits
    /// at `max_depth`) it is returned, otherwise its children are searched the
    /// same way and the deepest accepted node along that path is returned.
    /// Rejected nodes are skipped together with their subtree. `max_depth`
    /// defaults to the tree depth.
    pub fn search<P>(&self, mut predicate: P, max_depth: Option<u32>) -> Option<NodeId>
    where
        P: FnMut(&OctreeNode<T>) -> bool,
    {
        let max_depth = max_depth.unwrap_or(self.depth);
        self.search_children(NodeId::ROOT, &mut predicate, max_depth)
    }

    fn search_children<P>(&self, parent: NodeId, predicate: &mut P, max_depth: u32) -> Option<NodeId>
    where
        P: FnMut(&OctreeNode<T>) -> bool,
    {
        for child in self.node(parent).children() {
            let node = self.node(child);
            if node.depth > max_depth || !predicate(node) {
                continue;
            }
            if node.is_leaf() || node.depth == max_depth {
                return Some(child);
            }
            return self.search_children(child, predicate, max_depth).or(Some(child));
        }
        None
    }

    /// Insert an element covering `[min, max]`
    ///
    /// Descends first-fit through nodes whose closed bounds intersect the
    /// element's and adds it to the node reached. Returns `false` when the
    /// bounds miss the tree entirely. Re-inserting an element into the same
    /// node is a no-op.
    pub fn insert(&mut self, element: T, min: Vec3, max: Vec3) -> bool {
        let bounds = AABB::new(min, max);
        match self.search(|node| node.bounds().intersects(&bounds), None) {
            Some(id) => {
                self.nodes[id.index()].data.insert(element);
                true
            }
            None => false,
        }
    }

    /// Insert an element covering the cube `centre ± half_size`
    pub fn insert_cube(&mut self, element: T, centre: Vec3, half_size: f32) -> bool {
        let half = Vec3::repeat(half_size);
        self.insert(element, centre - half, centre + half)
    }

    /// Deepest node, root included, whose bounds fully contain `[min, max]`
    ///
    /// Below the root a child is only entered when the bounds lie strictly
    /// inside it, so anything [`Octree::insert`] placed for the same bounds is
    /// resident in the returned node's subtree. `None` when the bounds are not
    /// inside the root volume.
    pub fn find_enclosing(&self, min: Vec3, max: Vec3) -> Option<NodeId> {
        let bounds = AABB::new(min, max);
        if !self.root().bounds().contains(&bounds) {
            return None;
        }

        let mut current = NodeId::ROOT;
        while let Some(child) = self
            .node(current)
            .children()
            .find(|&child| self.node(child).bounds().contains_interior(&bounds))
        {
            current = child;
        }
        Some(current)
    }

    /// Collect the residents of every node whose bounds intersect `[min, max]`
    pub fn query_region(&self, min: Vec3, max: Vec3, out: &mut Vec<T>) {
        let region = AABB::new(min, max);
        self.query_region_from(NodeId::ROOT, &region, out);
    }

    fn query_region_from(&self, id: NodeId, region: &AABB, out: &mut Vec<T>) {
        let node = self.node(id);
        if !node.bounds().intersects(region) {
            return;
        }
        out.extend(node.data.iter().copied());
        for child in node.children() {
            self.query_region_from(child, region, out);
        }
    }

    /// Depth-first traversal, parents before children, children in octant order
    pub fn for_each<F>(&self, skip_root: bool, mut f: F)
    where
        F: FnMut(NodeId, &OctreeNode<T>),
    {
        if skip_root {
            for child in self.root().children() {
                self.for_each_from(child, &mut f);
            }
        } else {
            self.for_each_from(NodeId::ROOT, &mut f);
        }
    }

    fn for_each_from<F>(&self, id: NodeId, f: &mut F)
    where
        F: FnMut(NodeId, &OctreeNode<T>),
    {
        let node = self.node(id);
        f(id, node);
        for child in node.children() {
            self.for_each_from(child, f);
        }
    }

    /// Same traversal as [`Octree::for_each`] with element callbacks
    pub fn visit<V: OctreeVisitor<T>>(&self, visitor: &mut V, skip_root: bool) {
        self.for_each(skip_root, |id, node| {
            visitor.visit_node(id, node);
            for element in &node.data {
                visitor.visit_element(element);
            }
        });
    }

    /// Visit every element resident in the subtree rooted at `id`
    pub fn for_each_element<F>(&self, id: NodeId, mut f: F)
    where
        F: FnMut(&T),
    {
        self.for_each_element_from(id, &mut f);
    }

    fn for_each_element_from<F>(&self, id: NodeId, f: &mut F)
    where
        F: FnMut(&T),
    {
        let node = self.node(id);
        for element in &node.data {
            f(element);
        }
        for child in node.children() {
            self.for_each_element_from(child, f);
        }
    }
}

impl<T: Copy + Ord> Default for Octree<T> {
    fn default() -> Self {
        Self::new(Vec3::zeros(), 1.0, DEFAULT_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn tree(depth: u32) -> Octree<u32> {
        Octree::new(Vec3::zeros(), 64.0, depth)
    }

    #[test]
    fn test_depth_is_clamped() {
        assert_eq!(tree(0).depth(), MIN_DEPTH);
        assert_eq!(tree(9).depth(), MAX_DEPTH);
        assert_eq!(tree(3).depth(), 3);

        let mut deepest = 0;
        tree(9).for_each(false, |_, node| deepest = deepest.max(node.depth));
        assert_eq!(deepest, MAX_DEPTH);
    }

    #[test]
    fn test_node_count_matches_geometric_series() {
        for (depth, expected) in [(1, 9), (2, 73), (3, 585), (4, 4681)] {
            let octree = tree(depth);
            let mut visited = 0;
            octree.for_each(false, |_, _| visited += 1);
            assert_eq!(visited, expected);
            assert_eq!(octree.node_count(), expected);
            assert_eq!(Octree::<u32>::nodes_for_depth(depth), expected);
        }
        assert_eq!(tree(2).leaf_count(), 64);

        let mut without_root = 0;
        tree(1).for_each(true, |_, _| without_root += 1);
        assert_eq!(without_root, 8);
    }

    #[test]
    fn test_children_tile_parent() {
        let octree = tree(3);
        octree.for_each(false, |id, node| {
            if node.is_leaf() {
                return;
            }
            let mut volume = 0.0;
            for (octant, child_id) in node.children().enumerate() {
                let child = octree.node(child_id);
                assert_eq!(child.parent(), Some(id));
                assert_eq!(child.depth, node.depth + 1);
                assert_relative_eq!(child.half_size, node.half_size * 0.5);
                assert!(node.bounds().contains(&child.bounds()));

                let offset = child.centre - node.centre;
                assert_eq!(offset.x > 0.0, octant & OCTANT_FLAG_X != 0);
                assert_eq!(offset.y > 0.0, octant & OCTANT_FLAG_Y != 0);
                assert_eq!(offset.z > 0.0, octant & OCTANT_FLAG_Z != 0);
                assert_relative_eq!(offset.abs(), Vec3::repeat(child.half_size));

                volume += (child.half_size * 2.0).powi(3);
            }
            assert_relative_eq!(volume, (node.half_size * 2.0).powi(3), max_relative = 1e-5);
        });
        assert_eq!(octree.root().parent(), None);
    }

    #[test]
    fn test_insert_lands_in_single_intersecting_leaf() {
        let mut octree = tree(2);
        let min = Vec3::new(10.0, 20.0, -30.0);
        let max = Vec3::new(12.0, 22.0, -28.0);
        assert!(octree.insert(7, min, max));

        let mut holders = Vec::new();
        octree.for_each(false, |id, node| {
            if node.data().contains(&7) {
                holders.push(id);
            }
        });
        assert_eq!(holders.len(), 1);

        let leaf = octree.node(holders[0]);
        assert!(leaf.is_leaf());
        assert!(leaf.bounds().intersects(&AABB::new(min, max)));

        // Same element, same node: still one resident
        assert!(octree.insert(7, min, max));
        assert_eq!(octree.element_count(), 1);
    }

    #[test]
    fn test_random_inserts_land_in_single_intersecting_leaf() {
        let mut rng = StdRng::seed_from_u64(11);
        for depth in MIN_DEPTH..=MAX_DEPTH {
            let mut octree = tree(depth);
            let mut placed = Vec::new();
            for id in 0..200u32 {
                let centre = Vec3::new(
                    rng.gen_range(-60.0..60.0),
                    rng.gen_range(-60.0..60.0),
                    rng.gen_range(-60.0..60.0),
                );
                let half = Vec3::new(rng.gen_range(0.0..4.0), rng.gen_range(0.0..4.0), rng.gen_range(0.0..4.0));
                let bounds = AABB::new(centre - half, centre + half);
                assert!(octree.insert(id, bounds.min, bounds.max), "depth {depth}, element {id}");
                placed.push(bounds);
            }

            for (id, bounds) in (0u32..).zip(&placed) {
                let mut holders = Vec::new();
                octree.for_each(false, |node_id, node| {
                    if node.data().contains(&id) {
                        holders.push(node_id);
                    }
                });
                assert_eq!(holders.len(), 1, "depth {depth}, element {id}");
                let leaf = octree.node(holders[0]);
                assert!(leaf.is_leaf());
                assert!(leaf.bounds().intersects(bounds));
            }
            assert_eq!(octree.element_count(), placed.len());
        }
    }

    #[test]
    fn test_insert_outside_world_fails() {
        let mut octree = tree(2);
        assert!(!octree.insert_cube(1, Vec3::new(500.0, 0.0, 0.0), 1.0));
        assert_eq!(octree.element_count(), 0);
    }

    #[test]
    fn test_straddling_insert_takes_first_octant() {
        let mut octree = tree(1);
        assert!(octree.insert_cube(3, Vec3::zeros(), 1.0));
        let first = octree.root().children().next();
        assert_eq!(first.map(|id| octree.node(id).data().contains(&3)), Some(true));
    }

    #[test]
    fn test_touching_bounds_count_as_intersecting() {
        let mut octree = tree(1);
        // Lies in the +x half and meets octant 0 only on the x = 0 plane
        let min = Vec3::new(0.0, -10.0, -10.0);
        let max = Vec3::new(4.0, -5.0, -5.0);
        assert!(octree.insert(1, min, max));
        let first = octree.root().children().next();
        assert_eq!(first.map(|id| octree.node(id).data().contains(&1)), Some(true));

        let face = Vec3::new(64.0, 0.0, 0.0);
        assert!(octree.insert(2, face, face + Vec3::repeat(1.0)));
    }

    #[test]
    fn test_search_respects_order_and_max_depth() {
        let octree = tree(3);
        let found = octree.search(|_| true, None).map(|id| octree.node(id).depth);
        assert_eq!(found, Some(3));

        let shallow = octree.search(|_| true, Some(1));
        assert_eq!(shallow, octree.root().children().next());

        // Only +x nodes accepted: commits to octant 1 and keeps descending
        let positive_x = octree.search(|node| node.centre.x > 0.0, None);
        let node = positive_x.map(|id| octree.node(id));
        assert!(node.is_some_and(|n| n.is_leaf() && n.centre.x > 0.0));

        // Accept level-1 nodes only: the deepest match is the level-1 node itself
        let level_one = octree.search(|node| node.depth == 1, None);
        assert_eq!(level_one.map(|id| octree.node(id).depth), Some(1));

        assert_eq!(octree.search(|_| false, None), None);
    }

    #[test]
    fn test_for_each_is_preorder() {
        let octree = tree(2);
        let mut order = Vec::new();
        octree.for_each(false, |id, _| order.push(id));

        assert_eq!(order[0], NodeId::ROOT);
        for (position, id) in order.iter().enumerate() {
            if let Some(parent) = octree.node(*id).parent() {
                let parent_position = order.iter().position(|p| *p == parent);
                assert!(parent_position.is_some_and(|p| p < position));
            }
        }
        // The first child's whole subtree comes before the second child
        let second_child = octree.root().children().nth(1);
        assert_eq!(order.iter().position(|id| Some(*id) == second_child), Some(1 + 1 + 8));
    }

    #[test]
    fn test_find_enclosing_and_subtree_elements() {
        let mut octree = tree(2);
        // Straddles the centre planes: only the root encloses it
        assert_eq!(
            octree.find_enclosing(Vec3::repeat(-1.0), Vec3::repeat(1.0)),
            Some(NodeId::ROOT)
        );
        assert_eq!(octree.find_enclosing(Vec3::repeat(60.0), Vec3::repeat(70.0)), None);
        // Touching a child's face keeps the search at the parent
        assert_eq!(
            octree.find_enclosing(Vec3::zeros(), Vec3::repeat(10.0)),
            Some(NodeId::ROOT)
        );

        let small = octree.find_enclosing(Vec3::repeat(40.0), Vec3::repeat(41.0));
        assert_eq!(small.map(|id| octree.node(id).depth), Some(2));

        octree.insert_cube(1, Vec3::repeat(40.0), 1.0);
        octree.insert_cube(2, Vec3::repeat(-40.0), 1.0);

        let mut everything = Vec::new();
        octree.for_each_element(NodeId::ROOT, |e| everything.push(*e));
        everything.sort_unstable();
        assert_eq!(everything, vec![1, 2]);

        let mut positive = Vec::new();
        if let Some(id) = octree.find_enclosing(Vec3::repeat(1.0), Vec3::repeat(63.0)) {
            octree.for_each_element(id, |e| positive.push(*e));
        }
        assert_eq!(positive, vec![1]);

        let mut region = Vec::new();
        octree.query_region(Vec3::repeat(-50.0), Vec3::repeat(-30.0), &mut region);
        assert_eq!(region, vec![2]);

        octree.clear_data();
        assert_eq!(octree.element_count(), 0);
        assert_eq!(octree.node_count(), 73);
    }

    #[test]
    fn test_visitor_sees_nodes_and_elements() {
        #[derive(Default)]
        struct Counter {
            nodes: usize,
            elements: Vec<u32>,
        }

        impl OctreeVisitor<u32> for Counter {
            fn visit_node(&mut self, _id: NodeId, _node: &OctreeNode<u32>) {
                self.nodes += 1;
            }

            fn visit_element(&mut self, element: &u32) {
                self.elements.push(*element);
            }
        }

        let mut octree = tree(1);
        octree.insert_cube(5, Vec3::repeat(10.0), 1.0);

        let mut counter = Counter::default();
        octree.visit(&mut counter, true);
        assert_eq!(counter.nodes, 8);
        assert_eq!(counter.elements, vec![5]);
    }
}
