//! Coplanar face merging.
//!
//! All rendered faces of a model go into one octree. Candidates are visited
//! in id order; each merges with the lowest-id live neighbour it is compatible
//! with, and the merged quad is appended to the tree so it gets its own turn.
//! When the cursor runs off the end no compatible pair is left.

use crate::core::OptimizeConfig;
use crate::math::Aabb;
use crate::model::{Element, Face, FaceCorners, FaceDirection, FaceTexture, UvRect, UvSpan};
use crate::spatial::{Bounded, Octree, OctreeLimits, OctreeStats};

/// A face of a source element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceRef {
    pub element: usize,
    pub direction: FaceDirection,
}

/// One rendered quad: an original face or the union of several
#[derive(Clone, Debug, PartialEq)]
pub struct Quad {
    pub face: Face,
    pub texture: FaceTexture,
    pub shade: bool,
    pub light_emission: Option<u8>,
    /// Source faces covered by this quad, sorted
    pub sources: Vec<FaceRef>,
    /// Index into the UV region table
    pub region: usize,
}

impl Quad {
    pub fn from_element_face(index: usize, element: &Element, face: &Face, texture: &FaceTexture) -> Self {
        Self {
            face: face.clone(),
            texture: texture.clone(),
            shade: element.shade(),
            light_emission: element.light_emission(),
            sources: vec![FaceRef { element: index, direction: face.direction }],
            region: 0,
        }
    }

    pub fn direction(&self) -> FaceDirection {
        self.face.direction
    }

    pub fn corners(&self) -> &FaceCorners {
        &self.face.corners
    }

    pub fn uv(&self) -> UvRect {
        self.texture.uv
    }

    /// True if this quad replaces more than one source face
    pub fn is_merged(&self) -> bool {
        self.sources.len() > 1
    }

    pub fn area(&self) -> f64 {
        self.face.area()
    }

    /// Same texture, tint, culling and lighting, with unrotated UVs
    fn same_surface(&self, other: &Quad) -> bool {
        self.texture.texture == other.texture.texture
            && self.texture.tint_index == other.texture.tint_index
            && self.texture.cullface == other.texture.cullface
            && self.texture.uv_rotation == 0
            && other.texture.uv_rotation == 0
            && self.shade == other.shade
            && self.light_emission == other.light_emission
    }
}

impl Bounded for Quad {
    fn bounds(&self) -> Aabb {
        self.face.bounds()
    }
}

/// Rendered faces of all elements, in element order then direction order
pub fn collect_quads(elements: &[Element]) -> Vec<Quad> {
    elements
        .iter()
        .enumerate()
        .flat_map(|(index, element)| {
            element
                .textured_faces()
                .map(move |(face, texture)| Quad::from_element_face(index, element, face, texture))
        })
        .collect()
}

/// Merge two quads if they face the same way under the same rotation, are
/// coplanar, share a full edge and continue one texture mapping.
pub fn try_merge(a: &Quad, b: &Quad, eps: f64) -> Option<Quad> {
    if a.direction() != b.direction() || !a.face.same_rotation(&b.face) || !a.same_surface(b) {
        return None;
    }
    if a.face.rect.area() <= eps || b.face.rect.area() <= eps {
        return None;
    }
    if !a.face.is_coplanar_with(&b.face, eps) {
        return None;
    }
    let rect = a.face.rect.shared_edge_union(&b.face.rect, eps)?;

    let direction = a.direction();
    let span_a = UvSpan::from_uv(direction, &a.texture.uv);
    let span_b = UvSpan::from_uv(direction, &b.texture.uv);
    if !span_a.continues(&a.face.rect, &span_b, &b.face.rect, eps) {
        return None;
    }
    let uv = span_a.union(&a.face.rect, &span_b, &b.face.rect).to_uv(direction);

    let mut sources = a.sources.clone();
    sources.extend_from_slice(&b.sources);
    sources.sort_unstable();

    Some(Quad {
        face: Face::from_rect(direction, rect, a.face.rotation),
        texture: FaceTexture { uv, ..a.texture.clone() },
        shade: a.shade,
        light_emission: a.light_emission,
        sources,
        region: 0,
    })
}

/// Result of the merge pass
#[derive(Clone, Debug)]
pub struct MergeOutcome {
    pub quads: Vec<Quad>,
    pub merges: usize,
    /// Shape of the index, `None` when the pass did not run
    pub index: Option<OctreeStats>,
}

/// Merge quads until no compatible pair remains.
///
/// With `process_mesh` disabled the input is returned unchanged.
pub fn merge_quads(quads: Vec<Quad>, config: &OptimizeConfig) -> MergeOutcome {
    if !config.process_mesh || quads.len() < 2 {
        return MergeOutcome { quads, merges: 0, index: None };
    }
    let Some(world) = Aabb::from_points(quads.iter().flat_map(|q| q.face.corners)) else {
        return MergeOutcome { quads, merges: 0, index: None };
    };
    merge_quads_within(quads, world.padded(1.0), config)
}

/// Merge pass over an index covering `world`.
///
/// Quads outside `world` are not indexed and come back unchanged after the
/// merged set.
pub(crate) fn merge_quads_within(quads: Vec<Quad>, world: Aabb, config: &OptimizeConfig) -> MergeOutcome {
    let mut tree = Octree::new(world, OctreeLimits::from(config));
    let mut alive = Vec::with_capacity(quads.len() * 2);
    let mut outside = Vec::new();
    for quad in quads {
        if !world.intersects(&quad.bounds()) {
            outside.push(quad);
        } else if tree.insert(quad).is_some() {
            alive.push(true);
        }
    }
    if !outside.is_empty() {
        log::warn!("{} quads outside the merge index bounds were left unmerged", outside.len());
    }

    let eps = config.epsilon;
    let mut merges = 0;
    let mut cursor = 0;
    while cursor < tree.len() {
        if alive[cursor] {
            let found = tree
                .query(&tree.bounds_of(cursor))
                .into_iter()
                .filter(|&id| id != cursor && alive[id])
                .find_map(|id| try_merge(tree.item(cursor), tree.item(id), eps).map(|quad| (id, quad)));

            // Inputs are retired only once their union is indexed
            if let Some((partner, merged)) = found.filter(|(_, m)| world.intersects(&m.bounds())) {
                log::trace!(
                    "Merged quads {} and {} ({:?}, {} sources)",
                    cursor, partner, merged.direction(), merged.sources.len()
                );
                if tree.insert(merged).is_some() {
                    alive[cursor] = false;
                    alive[partner] = false;
                    alive.push(true);
                    merges += 1;
                }
            }
        }
        cursor += 1;
    }

    if let Err(err) = tree.ensure_within_limits() {
        log::warn!("Merge index saturated: {}", err);
    }
    let index = tree.stats();

    let quads = tree
        .into_items()
        .into_iter()
        .zip(alive)
        .filter_map(|(quad, live)| live.then_some(quad))
        .chain(outside)
        .collect();

    MergeOutcome { quads, merges, index: Some(index) }
}
