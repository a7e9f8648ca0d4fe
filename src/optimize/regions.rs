//! UV region table.
//!
//! Each quad samples a rectangle of its texture. With `process_uv` on,
//! rectangles of the same texture that overlap or touch are folded into one
//! region, repeatedly, until the table is stable. Regions keep the order in
//! which their first quad appears.

use serde::Serialize;

use crate::core::OptimizeConfig;
use crate::core::types::DVec2;
use super::merge::Quad;

/// Rectangle of one texture sampled by one or more quads
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UvRegion {
    pub texture: String,
    pub min: DVec2,
    pub max: DVec2,
}

impl UvRegion {
    pub fn of_quad(quad: &Quad) -> Self {
        let uv = quad.uv();
        Self {
            texture: quad.texture.texture.clone(),
            min: uv.min(),
            max: uv.max(),
        }
    }

    /// Same texture and the rectangles overlap or share an edge
    pub fn touches(&self, other: &UvRegion, eps: f64) -> bool {
        self.texture == other.texture
            && self.min.x <= other.max.x + eps
            && other.min.x <= self.max.x + eps
            && self.min.y <= other.max.y + eps
            && other.min.y <= self.max.y + eps
    }

    pub fn union(&self, other: &UvRegion) -> UvRegion {
        UvRegion {
            texture: self.texture.clone(),
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        let uv = quad.uv();
        quad.texture.texture == self.texture
            && uv.min().cmpge(self.min).all()
            && uv.max().cmple(self.max).all()
    }

    pub fn area(&self) -> f64 {
        let size = self.max - self.min;
        size.x * size.y
    }
}

/// Build the region table and point every quad at its region
pub fn assign_regions(quads: &mut [Quad], config: &OptimizeConfig) -> Vec<UvRegion> {
    let mut slots: Vec<Option<UvRegion>> = quads.iter().map(|q| Some(UvRegion::of_quad(q))).collect();
    let mut owner: Vec<usize> = (0..quads.len()).collect();

    if config.process_uv {
        loop {
            let mut changed = false;
            for i in 0..slots.len() {
                for j in (i + 1)..slots.len() {
                    let merged = match (&slots[i], &slots[j]) {
                        (Some(a), Some(b)) if a.touches(b, config.epsilon) => a.union(b),
                        _ => continue,
                    };
                    slots[i] = Some(merged);
                    slots[j] = None;
                    owner.iter_mut().filter(|o| **o == j).for_each(|o| *o = i);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    let mut remap = vec![0; slots.len()];
    let mut regions = Vec::new();
    for (slot, region) in slots.into_iter().enumerate() {
        if let Some(region) = region {
            remap[slot] = regions.len();
            regions.push(region);
        }
    }
    for (quad, slot) in quads.iter_mut().zip(owner) {
        quad.region = remap[slot];
    }
    regions
}
