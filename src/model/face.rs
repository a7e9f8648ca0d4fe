//! Oriented planar faces of an element

use crate::core::types::{DVec2, DVec3};
use crate::math::{Aabb, Axis, RotationAngle};
use crate::spatial::Bounded;
use super::direction::FaceDirection;
use super::element::{ElementRotation, cuboid_corners};
use super::uv::{UvRect, approx_eq};

/// Four world-space corners of a face
pub type FaceCorners = [DVec3; 4];

/// Rectangle of a face in its element's unrotated frame.
///
/// `plane` is the coordinate along the face normal axis; `min`/`max` are the
/// extents along the plane axes `(a, b)` given by [`FaceDirection::plane_axes`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceRect {
    pub plane: f64,
    pub min: DVec2,
    pub max: DVec2,
}

impl FaceRect {
    pub fn new(plane: f64, min: DVec2, max: DVec2) -> Self {
        Self { plane, min, max }
    }

    /// Rectangle of `direction`'s face on the cuboid `from..to`
    pub fn from_cuboid(direction: FaceDirection, from: DVec3, to: DVec3) -> Self {
        let (a, b, _) = direction.plane_axes();
        Self {
            plane: direction.plane_at(from, to),
            min: DVec2::new(from[a], from[b]),
            max: DVec2::new(to[a], to[b]),
        }
    }

    /// Flat cuboid whose `direction` face is this rectangle
    pub fn to_cuboid(&self, direction: FaceDirection) -> (DVec3, DVec3) {
        let (a, b, n) = direction.plane_axes();
        let mut from = DVec3::ZERO;
        let mut to = DVec3::ZERO;
        from[a] = self.min.x;
        from[b] = self.min.y;
        from[n] = self.plane;
        to[a] = self.max.x;
        to[b] = self.max.y;
        to[n] = self.plane;
        (from, to)
    }

    pub fn area(&self) -> f64 {
        let size = self.max - self.min;
        size.x * size.y
    }

    /// Union of two rectangles that lie in the same plane and share a full edge.
    pub fn shared_edge_union(&self, other: &FaceRect, eps: f64) -> Option<FaceRect> {
        if !approx_eq(self.plane, other.plane, eps) {
            return None;
        }
        let same_a = approx_eq(self.min.x, other.min.x, eps) && approx_eq(self.max.x, other.max.x, eps);
        let same_b = approx_eq(self.min.y, other.min.y, eps) && approx_eq(self.max.y, other.max.y, eps);
        let touch_a = approx_eq(self.max.x, other.min.x, eps) || approx_eq(other.max.x, self.min.x, eps);
        let touch_b = approx_eq(self.max.y, other.min.y, eps) || approx_eq(other.max.y, self.min.y, eps);

        if (same_a && touch_b) || (same_b && touch_a) {
            Some(FaceRect {
                plane: self.plane,
                min: self.min.min(other.min),
                max: self.max.max(other.max),
            })
        } else {
            None
        }
    }
}

/// One planar quad of an element.
///
/// Corners are already in world space; the rotation is carried only so the
/// optimizer can tell which faces share a rigid transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub direction: FaceDirection,
    pub corners: FaceCorners,
    pub rect: FaceRect,
    /// Owning element's rotation, `None` when unrotated or rotated by zero
    pub rotation: Option<ElementRotation>,
}

impl Face {
    /// Build the face for `rect`, transformed by `rotation`
    pub fn from_rect(direction: FaceDirection, rect: FaceRect, rotation: Option<ElementRotation>) -> Self {
        let rotation = rotation.filter(|r| !r.is_identity());
        let (from, to) = rect.to_cuboid(direction);
        let corners = cuboid_corners(from, to, rotation.as_ref());
        let [i0, i1, i2, i3] = direction.corner_indices();
        Self {
            direction,
            corners: [corners[i0], corners[i1], corners[i2], corners[i3]],
            rect,
            rotation,
        }
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation.is_some()
    }

    pub fn rotation_axis(&self) -> Option<Axis> {
        self.rotation.map(|r| r.axis)
    }

    pub fn rotation_angle(&self) -> RotationAngle {
        self.rotation.map_or(RotationAngle::Zero, |r| r.angle)
    }

    /// Check rotation state equality (axis, angle, origin and rescale)
    pub fn same_rotation(&self, other: &Face) -> bool {
        self.rotation == other.rotation
    }

    /// Outward unit normal in world space
    pub fn normal(&self) -> DVec3 {
        match &self.rotation {
            Some(r) => r.rotate_vector(self.direction.normal()).normalize(),
            None => self.direction.normal(),
        }
    }

    /// Surface area computed from the world corners
    pub fn area(&self) -> f64 {
        let [c0, c1, _, c3] = self.corners;
        (c1 - c0).cross(c3 - c0).length()
    }

    /// True if both faces face the same way and all corners lie on one plane
    pub fn is_coplanar_with(&self, other: &Face, eps: f64) -> bool {
        let normal = self.normal();
        if (normal - other.normal()).length() > eps {
            return false;
        }
        let d = normal.dot(self.corners[0]);
        self.corners
            .iter()
            .chain(other.corners.iter())
            .all(|c| approx_eq(normal.dot(*c), d, eps))
    }

    /// Default UV rectangle of this face on its unrotated rectangle
    pub fn default_uv(&self) -> UvRect {
        let (from, to) = self.rect.to_cuboid(self.direction);
        self.direction.default_uv(from, to)
    }
}

impl Bounded for Face {
    fn bounds(&self) -> Aabb {
        let [c0, c1, c2, c3] = self.corners;
        Aabb::new(c0.min(c1).min(c2).min(c3), c0.max(c1).max(c2).max(c3))
    }
}
