//! Model optimization passes
//!
//! - `merge`: collects rendered faces and merges coplanar neighbours
//! - `regions`: builds the UV region table over the surviving quads

pub mod merge;
pub mod regions;

use std::collections::BTreeSet;

use crate::core::OptimizeConfig;
use crate::model::Element;
use crate::spatial::OctreeStats;

pub use merge::{FaceRef, MergeOutcome, Quad, collect_quads, merge_quads, try_merge};
pub use regions::{UvRegion, assign_regions};

/// Counters for one optimized model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptimizeStats {
    pub elements: usize,
    pub faces_in: usize,
    pub faces_out: usize,
    pub merges: usize,
    pub regions_in: usize,
    pub regions_out: usize,
    pub index: Option<OctreeStats>,
}

impl OptimizeStats {
    /// Accumulate another model's counters; index shapes are not summed
    pub fn absorb(&mut self, other: &OptimizeStats) {
        self.elements += other.elements;
        self.faces_in += other.faces_in;
        self.faces_out += other.faces_out;
        self.merges += other.merges;
        self.regions_in += other.regions_in;
        self.regions_out += other.regions_out;
    }
}

/// Quads and UV regions of one model after optimization
#[derive(Clone, Debug)]
pub struct OptimizedModel {
    pub quads: Vec<Quad>,
    pub regions: Vec<UvRegion>,
    pub stats: OptimizeStats,
}

impl OptimizedModel {
    /// True when the merge pass changed the geometry
    pub fn is_changed(&self) -> bool {
        self.stats.merges > 0
    }

    pub fn merged_quads(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter().filter(|q| q.is_merged())
    }

    /// Source faces that were folded into a merged quad
    pub fn consumed_faces(&self) -> BTreeSet<FaceRef> {
        self.merged_quads()
            .flat_map(|q| q.sources.iter().copied())
            .collect()
    }
}

/// Run the merge pass and then the UV region pass over a model's elements
pub fn optimize_elements(elements: &[Element], config: &OptimizeConfig) -> OptimizedModel {
    let quads = collect_quads(elements);
    let faces_in = quads.len();

    let MergeOutcome { mut quads, merges, index } = merge_quads(quads, config);
    let regions = assign_regions(&mut quads, config);

    let stats = OptimizeStats {
        elements: elements.len(),
        faces_in,
        faces_out: quads.len(),
        merges,
        regions_in: faces_in,
        regions_out: regions.len(),
        index,
    };
    log::debug!(
        "Optimized {} elements: {} -> {} faces, {} UV regions",
        stats.elements, stats.faces_in, stats.faces_out, stats.regions_out
    );

    OptimizedModel { quads, regions, stats }
}
