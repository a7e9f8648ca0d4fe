//! Writing optimized quads back into model JSON.
//!
//! Untouched faces stay in their source element. Each merged quad becomes a
//! flat single-face element placed right after the first element it covers,
//! and an element whose faces were all merged away is dropped.

use std::collections::BTreeMap;

use serde_json::Map;

use crate::core::OptimizeConfig;
use crate::core::types::Result;
use crate::model::{BlockModel, ModelElement, ModelFace, ModelRotation};
use crate::optimize::{FaceRef, OptimizeStats, OptimizedModel, Quad, UvRegion, optimize_elements};

/// Flat model element carrying one merged quad
pub fn element_from_quad(quad: &Quad) -> ModelElement {
    let direction = quad.direction();
    let (from, to) = quad.face.rect.to_cuboid(direction);

    let face = ModelFace {
        uv: Some(quad.uv().to_array()),
        texture: quad.texture.texture.clone(),
        cullface: quad.texture.cullface,
        rotation: None,
        tintindex: quad.texture.tint_index,
        extra: Map::new(),
    };

    ModelElement {
        from: Some(from.to_array()),
        to: Some(to.to_array()),
        rotation: quad.face.rotation.as_ref().map(ModelRotation::from),
        shade: (!quad.shade).then_some(false),
        light_emission: quad.light_emission,
        faces: BTreeMap::from([(direction, face)]),
        extra: Map::new(),
    }
}

/// Replace the model's elements with the optimized geometry
pub fn apply_optimized(model: &mut BlockModel, optimized: &OptimizedModel) {
    let Some(elements) = model.elements.take() else {
        return;
    };
    let consumed = optimized.consumed_faces();

    let mut merged_after: BTreeMap<usize, Vec<&Quad>> = BTreeMap::new();
    for quad in optimized.merged_quads() {
        if let Some(first) = quad.sources.first() {
            merged_after.entry(first.element).or_default().push(quad);
        }
    }

    let mut rewritten = Vec::with_capacity(elements.len());
    for (index, mut element) in elements.into_iter().enumerate() {
        let had_faces = !element.faces.is_empty();
        element
            .faces
            .retain(|&direction, _| !consumed.contains(&FaceRef { element: index, direction }));
        if !had_faces || !element.faces.is_empty() {
            rewritten.push(element);
        }
        if let Some(quads) = merged_after.get(&index) {
            rewritten.extend(quads.iter().map(|q| element_from_quad(q)));
        }
    }
    model.elements = Some(rewritten);
}

/// Result of optimizing one model file
#[derive(Clone, Debug)]
pub struct ModelOutput {
    /// Rewritten JSON, `None` when the geometry is unchanged
    pub data: Option<Vec<u8>>,
    pub stats: OptimizeStats,
    /// UV region table of the optimized quads
    pub regions: Vec<UvRegion>,
}

/// Optimize one model file.
///
/// Returns `None` when the model has no elements. Models where nothing merged
/// keep `data` empty so the caller can keep the original bytes.
pub fn optimize_model_json(bytes: &[u8], config: &OptimizeConfig) -> Result<Option<ModelOutput>> {
    let mut model = BlockModel::from_slice(bytes)?;
    if !model.has_elements() {
        return Ok(None);
    }
    let elements = model.to_elements()?;
    let optimized = optimize_elements(&elements, config);

    let data = if optimized.is_changed() {
        apply_optimized(&mut model, &optimized);
        Some(model.to_vec()?)
    } else {
        None
    };
    Ok(Some(ModelOutput {
        data,
        stats: optimized.stats,
        regions: optimized.regions,
    }))
}
