//! Bounding-volume octree over arbitrary bounded items.
//!
//! Nodes live in a flat arena addressed by index; children are a fixed array
//! of 8 node indices. Items are stored once in an item arena and referenced by
//! id from every leaf whose region they intersect, so an item spanning an
//! octant boundary appears in several leaves.

use crate::core::error::Error;
use crate::core::types::Result;
use crate::core::OptimizeConfig;
use crate::math::Aabb;

/// Anything with an axis-aligned bounding box
pub trait Bounded {
    fn bounds(&self) -> Aabb;
}

impl Bounded for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }
}

/// Index of an item in insertion order
pub type ItemId = usize;
/// Index of a node in the arena (root is 0)
pub type NodeId = u32;

/// A single node of the octree.
///
/// Leaves hold item ids in `data`; internal nodes hold exactly 8 children and
/// no data.
#[derive(Clone, Debug)]
pub struct OctreeNode {
    pub bounds: Aabb,
    pub depth: u8,
    pub data: Vec<ItemId>,
    pub children: Option<[NodeId; 8]>,
}

impl OctreeNode {
    fn leaf(bounds: Aabb, depth: u8) -> Self {
        Self {
            bounds,
            depth,
            data: Vec::new(),
            children: None,
        }
    }

    pub fn is_leaf_node(&self) -> bool {
        self.children.is_none()
    }
}

/// Subdivision threshold and termination rules
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeLimits {
    /// A leaf that grows past this many items on insert subdivides
    pub min_elements_per_region: usize,
    /// Nodes at this depth never subdivide
    pub max_depth: u8,
    /// Children smaller than this along any axis are never created
    pub min_region_size: f64,
}

impl Default for OctreeLimits {
    fn default() -> Self {
        Self {
            min_elements_per_region: 8,
            max_depth: 6,
            min_region_size: 0.25,
        }
    }
}

impl From<&OptimizeConfig> for OctreeLimits {
    fn from(config: &OptimizeConfig) -> Self {
        Self {
            min_elements_per_region: config.min_elements_per_region,
            max_depth: config.max_depth,
            min_region_size: config.min_region_size,
        }
    }
}

/// Shape and health of a built octree
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OctreeStats {
    pub items: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub subdivisions: usize,
    /// Leaves over the item threshold that the limits kept from subdividing
    pub saturated_leaves: usize,
    pub deepest_leaf: u8,
    pub largest_leaf: usize,
}

/// Octree spatial index over items of type `T`
#[derive(Clone, Debug)]
pub struct Octree<T> {
    nodes: Vec<OctreeNode>,
    items: Vec<T>,
    item_bounds: Vec<Aabb>,
    limits: OctreeLimits,
    subdivisions: usize,
}

impl<T> Octree<T> {
    /// Create an empty octree covering `world_bounds`
    pub fn new(world_bounds: Aabb, limits: OctreeLimits) -> Self {
        Self {
            nodes: vec![OctreeNode::leaf(world_bounds, 0)],
            items: Vec::new(),
            item_bounds: Vec::new(),
            limits,
            subdivisions: 0,
        }
    }

    /// Create with the default termination limits
    pub fn with_min_elements(world_bounds: Aabb, min_elements_per_region: usize) -> Self {
        Self::new(world_bounds, OctreeLimits {
            min_elements_per_region,
            ..Default::default()
        })
    }

    pub fn root(&self) -> &OctreeNode {
        &self.nodes[0]
    }

    /// World bounds covered by the root node
    pub fn bounds(&self) -> Aabb {
        self.nodes[0].bounds
    }

    pub fn limits(&self) -> OctreeLimits {
        self.limits
    }

    pub fn node(&self, index: NodeId) -> &OctreeNode {
        &self.nodes[index as usize]
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    /// Number of inserted items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> &T {
        &self.items[id]
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn bounds_of(&self, id: ItemId) -> Aabb {
        self.item_bounds[id]
    }

    /// Consume the tree, returning items in insertion order
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Iterate leaf nodes
    pub fn leaves(&self) -> impl Iterator<Item = &OctreeNode> {
        self.nodes.iter().filter(|n| n.is_leaf_node())
    }

    /// Insert an item with explicit bounds.
    ///
    /// Returns the item id, or `None` (dropping the item) when the bounds do
    /// not touch the root region.
    pub fn insert_with_bounds(&mut self, item: T, bounds: Aabb) -> Option<ItemId> {
        if !self.nodes[0].bounds.intersects(&bounds) {
            return None;
        }
        let id = self.items.len();
        self.items.push(item);
        self.item_bounds.push(bounds);
        self.insert_into(0, id);
        Some(id)
    }

    fn insert_into(&mut self, node: NodeId, id: ItemId) {
        let bounds = self.item_bounds[id];
        let current = &mut self.nodes[node as usize];
        if !current.bounds.intersects(&bounds) {
            return;
        }
        match current.children {
            None => {
                current.data.push(id);
                if current.data.len() > self.limits.min_elements_per_region && self.can_subdivide(node) {
                    self.subdivide(node);
                }
            }
            Some(children) => {
                for child in children {
                    self.insert_into(child, id);
                }
            }
        }
    }

    /// Whether the limits allow `node` to split further
    pub fn can_subdivide(&self, node: NodeId) -> bool {
        self.limits_allow_split(&self.nodes[node as usize])
    }

    fn limits_allow_split(&self, node: &OctreeNode) -> bool {
        node.depth < self.limits.max_depth
            && node.bounds.half_extent().min_element() >= self.limits.min_region_size
    }

    /// Over the item threshold with no split allowed
    fn is_saturated(&self, leaf: &OctreeNode) -> bool {
        leaf.data.len() > self.limits.min_elements_per_region && !self.limits_allow_split(leaf)
    }

    /// Split a leaf into 8 octants and redistribute its items.
    ///
    /// Every item lands in each child it intersects. Children are filled
    /// directly and only split on their own next insert, so one call performs
    /// exactly one subdivision. Returns false if `node` is already internal.
    pub fn subdivide(&mut self, node: NodeId) -> bool {
        let (bounds, depth) = {
            let n = &self.nodes[node as usize];
            if !n.is_leaf_node() {
                return false;
            }
            (n.bounds, n.depth)
        };

        let base = self.nodes.len() as NodeId;
        for octant in 0..8u8 {
            self.nodes.push(OctreeNode::leaf(bounds.child_octant(octant), depth + 1));
        }
        let children: [NodeId; 8] = std::array::from_fn(|i| base + i as NodeId);

        let data = std::mem::take(&mut self.nodes[node as usize].data);
        self.nodes[node as usize].children = Some(children);
        self.subdivisions += 1;

        log::trace!("Subdivided octree node {} at depth {} ({} items)", node, depth, data.len());

        for id in data {
            let item = self.item_bounds[id];
            for child in children {
                let target = &mut self.nodes[child as usize];
                if target.bounds.intersects(&item) {
                    target.data.push(id);
                }
            }
        }
        true
    }

    /// Ids of items whose bounds intersect `region`, ascending and unique.
    ///
    /// Only leaves intersecting `region` are visited.
    pub fn query(&self, region: &Aabb) -> Vec<ItemId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.bounds.intersects(region) {
                continue;
            }
            match node.children {
                Some(children) => stack.extend(children),
                None => found.extend(
                    node.data.iter().copied().filter(|&id| self.item_bounds[id].intersects(region)),
                ),
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats {
            items: self.items.len(),
            nodes: self.nodes.len(),
            subdivisions: self.subdivisions,
            ..Default::default()
        };
        for leaf in self.leaves() {
            stats.leaves += 1;
            stats.deepest_leaf = stats.deepest_leaf.max(leaf.depth);
            stats.largest_leaf = stats.largest_leaf.max(leaf.data.len());
            if self.is_saturated(leaf) {
                stats.saturated_leaves += 1;
            }
        }
        stats
    }

    /// Report the fullest leaf that the limits kept from subdividing.
    ///
    /// Saturated leaves still hold all their items; this only surfaces that
    /// the index degraded towards linear scans there.
    pub fn ensure_within_limits(&self) -> Result<()> {
        let worst = self
            .leaves()
            .filter(|leaf| self.is_saturated(leaf))
            .max_by_key(|leaf| leaf.data.len());
        match worst {
            Some(leaf) => Err(Error::IndexDepthExceeded {
                depth: leaf.depth,
                items: leaf.data.len(),
            }),
            None => Ok(()),
        }
    }
}

impl<T: Bounded> Octree<T> {
    /// Insert an item using its own bounds
    pub fn insert(&mut self, item: T) -> Option<ItemId> {
        let bounds = item.bounds();
        self.insert_with_bounds(item, bounds)
    }
}
