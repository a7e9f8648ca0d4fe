//! Texture UV rectangles and the linear mapping between a face's plane
//! extents and its UVs.

use crate::core::types::{DVec2, DVec4};
use super::direction::FaceDirection;
use super::face::FaceRect;

/// UV rectangle as written in model files: `[u1, v1, u2, v2]` in 0..16 texels.
///
/// `from` may be greater than `to` on either axis, which mirrors the texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    pub from: DVec2,
    pub to: DVec2,
}

impl UvRect {
    pub fn new(u1: f64, v1: f64, u2: f64, v2: f64) -> Self {
        Self {
            from: DVec2::new(u1, v1),
            to: DVec2::new(u2, v2),
        }
    }

    pub fn from_array(uv: [f64; 4]) -> Self {
        Self::new(uv[0], uv[1], uv[2], uv[3])
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.from.x, self.from.y, self.to.x, self.to.y]
    }

    pub fn as_vec4(&self) -> DVec4 {
        DVec4::from_array(self.to_array())
    }

    /// Lower corner of the normalized rectangle
    pub fn min(&self) -> DVec2 {
        self.from.min(self.to)
    }

    /// Upper corner of the normalized rectangle
    pub fn max(&self) -> DVec2 {
        self.from.max(self.to)
    }

    pub fn area(&self) -> f64 {
        let size = self.max() - self.min();
        size.x * size.y
    }
}

/// UV values at the low and high edges of a face rectangle.
///
/// Within a face, `u` varies linearly along the rectangle's `a` axis and `v`
/// along its `b` axis. Two faces can share one texture mapping only if their
/// spans lie on the same lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvSpan {
    pub u_lo: f64,
    pub u_hi: f64,
    pub v_lo: f64,
    pub v_hi: f64,
}

impl UvSpan {
    pub fn from_uv(direction: FaceDirection, uv: &UvRect) -> Self {
        let (u_grows, v_grows) = direction.uv_orientation();
        let (u_lo, u_hi) = if u_grows { (uv.from.x, uv.to.x) } else { (uv.to.x, uv.from.x) };
        let (v_lo, v_hi) = if v_grows { (uv.from.y, uv.to.y) } else { (uv.to.y, uv.from.y) };
        Self { u_lo, u_hi, v_lo, v_hi }
    }

    pub fn to_uv(&self, direction: FaceDirection) -> UvRect {
        let (u_grows, v_grows) = direction.uv_orientation();
        let (u1, u2) = if u_grows { (self.u_lo, self.u_hi) } else { (self.u_hi, self.u_lo) };
        let (v1, v2) = if v_grows { (self.v_lo, self.v_hi) } else { (self.v_hi, self.v_lo) };
        UvRect::new(u1, v1, u2, v2)
    }

    /// Check that `other` (mapped over `other_rect`) continues this span's
    /// mapping over `rect`.
    pub fn continues(&self, rect: &FaceRect, other: &UvSpan, other_rect: &FaceRect, eps: f64) -> bool {
        continues_line(
            (rect.min.x, rect.max.x, self.u_lo, self.u_hi),
            (other_rect.min.x, other_rect.max.x, other.u_lo, other.u_hi),
            eps,
        ) && continues_line(
            (rect.min.y, rect.max.y, self.v_lo, self.v_hi),
            (other_rect.min.y, other_rect.max.y, other.v_lo, other.v_hi),
            eps,
        )
    }

    /// Span covering the union of both rectangles.
    ///
    /// Edge values are taken from whichever input owns that edge, so no new
    /// UV coordinates are computed.
    pub fn union(&self, rect: &FaceRect, other: &UvSpan, other_rect: &FaceRect) -> UvSpan {
        UvSpan {
            u_lo: if rect.min.x <= other_rect.min.x { self.u_lo } else { other.u_lo },
            u_hi: if rect.max.x >= other_rect.max.x { self.u_hi } else { other.u_hi },
            v_lo: if rect.min.y <= other_rect.min.y { self.v_lo } else { other.v_lo },
            v_hi: if rect.max.y >= other_rect.max.y { self.v_hi } else { other.v_hi },
        }
    }
}

/// `(lo, hi, value_lo, value_hi)` of two segments; true when the second
/// segment's values lie on the first segment's line.
fn continues_line(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64), eps: f64) -> bool {
    let (lo, hi, val_lo, val_hi) = a;
    let extent = hi - lo;
    if extent.abs() <= eps {
        return false;
    }
    let slope = (val_hi - val_lo) / extent;
    let at = |x: f64| val_lo + slope * (x - lo);
    approx_eq(at(b.0), b.2, eps) && approx_eq(at(b.1), b.3, eps)
}

pub(crate) fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps * (1.0 + a.abs().max(b.abs()))
}
