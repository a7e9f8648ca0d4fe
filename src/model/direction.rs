//! The six named face directions of a cuboid element

use serde::{Deserialize, Serialize};

use crate::core::types::DVec3;
use super::uv::UvRect;

/// Named face of a cuboid.
///
/// Declaration order is the stable processing order used by the optimizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceDirection {
    Up,
    #[serde(alias = "bottom")]
    Down,
    North,
    South,
    East,
    West,
}

impl FaceDirection {
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::Up,
        FaceDirection::Down,
        FaceDirection::North,
        FaceDirection::South,
        FaceDirection::East,
        FaceDirection::West,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Outward normal of the unrotated face
    pub fn normal(self) -> DVec3 {
        match self {
            FaceDirection::Up => DVec3::Y,
            FaceDirection::Down => DVec3::NEG_Y,
            FaceDirection::North => DVec3::NEG_Z,
            FaceDirection::South => DVec3::Z,
            FaceDirection::East => DVec3::X,
            FaceDirection::West => DVec3::NEG_X,
        }
    }

    /// Indices into the element's 8 corners, counter-clockwise seen from outside.
    ///
    /// Corner order: 0 `from`, 1 `(to.x,from.y,from.z)`, 2 `(from.x,to.y,from.z)`,
    /// 3 `(from.x,from.y,to.z)`, 4 `(to.x,to.y,from.z)`, 5 `(from.x,to.y,to.z)`,
    /// 6 `(to.x,from.y,to.z)`, 7 `to`.
    pub fn corner_indices(self) -> [usize; 4] {
        match self {
            FaceDirection::Up => [2, 5, 7, 4],
            FaceDirection::Down => [0, 1, 6, 3],
            FaceDirection::North => [0, 2, 4, 1],
            FaceDirection::South => [3, 6, 7, 5],
            FaceDirection::East => [1, 4, 7, 6],
            FaceDirection::West => [0, 3, 5, 2],
        }
    }

    /// Component indices `(a, b, normal)` of the face plane.
    ///
    /// `a` is the axis texture `u` runs along, `b` the axis `v` runs along.
    pub fn plane_axes(self) -> (usize, usize, usize) {
        match self {
            FaceDirection::Up | FaceDirection::Down => (0, 2, 1),
            FaceDirection::North | FaceDirection::South => (0, 1, 2),
            FaceDirection::East | FaceDirection::West => (2, 1, 0),
        }
    }

    /// Plane coordinate of this face for a cuboid spanning `from..to`
    pub fn plane_at(self, from: DVec3, to: DVec3) -> f64 {
        match self {
            FaceDirection::Up => to.y,
            FaceDirection::Down => from.y,
            FaceDirection::North => from.z,
            FaceDirection::South => to.z,
            FaceDirection::East => to.x,
            FaceDirection::West => from.x,
        }
    }

    /// Whether `u` grows with the `a` axis and `v` with the `b` axis
    pub fn uv_orientation(self) -> (bool, bool) {
        match self {
            FaceDirection::Up => (true, true),
            FaceDirection::Down => (true, false),
            FaceDirection::North => (false, false),
            FaceDirection::South => (true, false),
            FaceDirection::East => (false, false),
            FaceDirection::West => (true, false),
        }
    }

    /// UV rectangle a face gets when the model does not specify one
    pub fn default_uv(self, from: DVec3, to: DVec3) -> UvRect {
        let (a, b, _) = self.plane_axes();
        let (u_grows, v_grows) = self.uv_orientation();
        let span = |lo: f64, hi: f64, grows: bool| {
            if grows { (lo, hi) } else { (16.0 - hi, 16.0 - lo) }
        };
        let (u1, u2) = span(from[a], to[a], u_grows);
        let (v1, v2) = span(from[b], to[b], v_grows);
        UvRect::new(u1, v1, u2, v2)
    }

    pub fn opposite(self) -> Self {
        match self {
            FaceDirection::Up => FaceDirection::Down,
            FaceDirection::Down => FaceDirection::Up,
            FaceDirection::North => FaceDirection::South,
            FaceDirection::South => FaceDirection::North,
            FaceDirection::East => FaceDirection::West,
            FaceDirection::West => FaceDirection::East,
        }
    }
}
