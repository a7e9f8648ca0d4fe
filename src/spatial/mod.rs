//! Spatial indexing over bounded items

pub mod octree;

pub use octree::{Bounded, ItemId, NodeId, Octree, OctreeLimits, OctreeNode, OctreeStats};
