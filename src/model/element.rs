//! Cuboid model elements: world corners and the six derived faces

use crate::core::error::Error;
use crate::core::types::{DVec3, Result};
use crate::math::{Aabb, Axis, RotationAngle, rotate_about};
use crate::spatial::Bounded;
use super::direction::FaceDirection;
use super::face::{Face, FaceRect};
use super::uv::UvRect;

/// Eight world-space corners of an element
pub type ElementCorners = [DVec3; 8];

/// Rigid rotation of an element about one principal axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementRotation {
    pub origin: DVec3,
    pub axis: Axis,
    pub angle: RotationAngle,
    /// Stretch the faces perpendicular to the axis by `1/cos(angle)`
    pub rescale: bool,
}

impl ElementRotation {
    pub fn new(origin: DVec3, axis: Axis, angle: RotationAngle) -> Self {
        Self { origin, axis, angle, rescale: false }
    }

    /// Build from a raw angle in degrees, rejecting angles outside the permitted set
    pub fn from_degrees(origin: DVec3, axis: Axis, degrees: f64) -> Result<Self> {
        Ok(Self::new(origin, axis, RotationAngle::try_from(degrees)?))
    }

    pub fn with_rescale(mut self, rescale: bool) -> Self {
        self.rescale = rescale;
        self
    }

    pub fn is_identity(&self) -> bool {
        self.angle.is_zero()
    }

    /// Rotate a direction vector (no origin, no rescale)
    pub fn rotate_vector(&self, v: DVec3) -> DVec3 {
        rotate_about(v, DVec3::ZERO, self.axis, self.angle)
    }

    /// Map an unrotated world position to its rotated world position
    pub fn transform(&self, point: DVec3) -> DVec3 {
        if self.is_identity() {
            return point;
        }
        let mut relative = rotate_about(point, self.origin, self.axis, self.angle);
        if self.rescale {
            let scale = 1.0 / self.angle.radians().cos();
            let keep = self.axis.index();
            for i in 0..3 {
                if i != keep {
                    relative[i] *= scale;
                }
            }
        }
        self.origin + relative
    }
}

/// Corners of the cuboid `from..to` in the fixed enumeration order, rotated if
/// a rotation is given.
pub fn cuboid_corners(from: DVec3, to: DVec3, rotation: Option<&ElementRotation>) -> ElementCorners {
    let corners = [
        from,
        DVec3::new(to.x, from.y, from.z),
        DVec3::new(from.x, to.y, from.z),
        DVec3::new(from.x, from.y, to.z),
        DVec3::new(to.x, to.y, from.z),
        DVec3::new(from.x, to.y, to.z),
        DVec3::new(to.x, from.y, to.z),
        to,
    ];
    match rotation {
        Some(r) => corners.map(|c| r.transform(c)),
        None => corners,
    }
}

/// Texture assignment of one rendered face
#[derive(Clone, Debug, PartialEq)]
pub struct FaceTexture {
    /// Texture reference, e.g. `#side` or `block/stone`
    pub texture: String,
    pub uv: UvRect,
    /// UV rotation in degrees: 0, 90, 180 or 270
    pub uv_rotation: u16,
    pub tint_index: Option<i32>,
    pub cullface: Option<FaceDirection>,
}

impl FaceTexture {
    pub fn new(texture: impl Into<String>, uv: UvRect) -> Self {
        Self {
            texture: texture.into(),
            uv,
            uv_rotation: 0,
            tint_index: None,
            cullface: None,
        }
    }

    /// Validate a UV rotation value from a model file
    pub fn check_uv_rotation(rotation: u16) -> Result<u16> {
        match rotation {
            0 | 90 | 180 | 270 => Ok(rotation),
            other => Err(Error::MalformedElement(format!("invalid face UV rotation {}", other))),
        }
    }
}

/// One cuboid of a block model.
///
/// Corners and faces are derived once at construction; the element is
/// immutable afterwards apart from attaching face textures.
#[derive(Clone, Debug)]
pub struct Element {
    from: DVec3,
    to: DVec3,
    rotation: Option<ElementRotation>,
    shade: bool,
    light_emission: Option<u8>,
    corners: ElementCorners,
    faces: [Face; 6],
    textures: [Option<FaceTexture>; 6],
}

impl Element {
    /// Build an element, validating that `from <= to` on every axis
    pub fn new(from: DVec3, to: DVec3, rotation: Option<ElementRotation>) -> Result<Self> {
        if !from.is_finite() || !to.is_finite() {
            return Err(Error::MalformedElement(format!(
                "non-finite bounds from={:?} to={:?}", from, to
            )));
        }
        if from.cmpgt(to).any() {
            return Err(Error::MalformedElement(format!(
                "from {:?} exceeds to {:?}", from.to_array(), to.to_array()
            )));
        }
        if let Some(r) = &rotation {
            if !r.origin.is_finite() {
                return Err(Error::MalformedElement("non-finite rotation origin".to_string()));
            }
        }

        let corners = cuboid_corners(from, to, rotation.as_ref());
        let carried = rotation.filter(|r| !r.is_identity());
        let faces = FaceDirection::ALL.map(|direction| {
            let [i0, i1, i2, i3] = direction.corner_indices();
            Face {
                direction,
                corners: [corners[i0], corners[i1], corners[i2], corners[i3]],
                rect: FaceRect::from_cuboid(direction, from, to),
                rotation: carried,
            }
        });

        Ok(Self {
            from,
            to,
            rotation,
            shade: true,
            light_emission: None,
            corners,
            faces,
            textures: Default::default(),
        })
    }

    pub fn with_shade(mut self, shade: bool) -> Self {
        self.shade = shade;
        self
    }

    pub fn with_light_emission(mut self, light_emission: Option<u8>) -> Self {
        self.light_emission = light_emission;
        self
    }

    /// Attach a texture to one face, marking it as rendered
    pub fn with_texture(mut self, direction: FaceDirection, texture: FaceTexture) -> Self {
        self.textures[direction.index()] = Some(texture);
        self
    }

    /// Attach default-UV textures to all six faces
    pub fn with_all_textures(mut self, texture: &str) -> Self {
        for direction in FaceDirection::ALL {
            let uv = direction.default_uv(self.from, self.to);
            self.textures[direction.index()] = Some(FaceTexture::new(texture, uv));
        }
        self
    }

    pub fn from(&self) -> DVec3 {
        self.from
    }

    pub fn to(&self) -> DVec3 {
        self.to
    }

    pub fn rotation(&self) -> Option<&ElementRotation> {
        self.rotation.as_ref()
    }

    /// True if the element has a rotation with a non-zero angle
    pub fn is_rotated(&self) -> bool {
        self.rotation.is_some_and(|r| !r.is_identity())
    }

    pub fn shade(&self) -> bool {
        self.shade
    }

    pub fn light_emission(&self) -> Option<u8> {
        self.light_emission
    }

    pub fn corners(&self) -> &ElementCorners {
        &self.corners
    }

    pub fn face(&self, direction: FaceDirection) -> &Face {
        &self.faces[direction.index()]
    }

    pub fn faces(&self) -> &[Face; 6] {
        &self.faces
    }

    pub fn texture(&self, direction: FaceDirection) -> Option<&FaceTexture> {
        self.textures[direction.index()].as_ref()
    }

    /// Faces that carry a texture, in direction order
    pub fn textured_faces(&self) -> impl Iterator<Item = (&Face, &FaceTexture)> {
        self.faces
            .iter()
            .zip(self.textures.iter())
            .filter_map(|(face, texture)| texture.as_ref().map(|t| (face, t)))
    }
}

impl Bounded for Element {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.corners).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn cube() -> Element {
        Element::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(5.0, 7.0, 11.0), None).unwrap()
    }

    #[test]
    fn test_unrotated_corners_enumeration() {
        let (f, t) = (DVec3::new(1.0, 2.0, 3.0), DVec3::new(5.0, 7.0, 11.0));
        let expected = [
            f,
            DVec3::new(t.x, f.y, f.z),
            DVec3::new(f.x, t.y, f.z),
            DVec3::new(f.x, f.y, t.z),
            DVec3::new(t.x, t.y, f.z),
            DVec3::new(f.x, t.y, t.z),
            DVec3::new(t.x, f.y, t.z),
            t,
        ];
        assert_eq!(*cube().corners(), expected);
    }

    #[test]
    fn test_zero_angle_matches_unrotated() {
        let rotation = ElementRotation::new(DVec3::new(8.0, 8.0, 8.0), Axis::X, RotationAngle::Zero);
        let rotated = Element::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(5.0, 7.0, 11.0), Some(rotation)).unwrap();
        assert_eq!(rotated.corners(), cube().corners());
        assert!(!rotated.is_rotated());
        assert!(rotated.faces().iter().all(|f| !f.is_rotated()));
    }

    #[test]
    fn test_rotation_preserves_distance_to_origin() {
        let origin = DVec3::new(8.0, 8.0, 8.0);
        let (from, to) = (DVec3::new(0.0, 0.0, 0.0), DVec3::new(16.0, 4.0, 10.0));
        let plain = cuboid_corners(from, to, None);
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            for angle in RotationAngle::ALL {
                let rotation = ElementRotation::new(origin, axis, angle);
                let element = Element::new(from, to, Some(rotation)).unwrap();
                for (before, after) in plain.iter().zip(element.corners()) {
                    assert!(((*before - origin).length() - (*after - origin).length()).abs() < EPS);
                }
            }
        }
    }

    #[test]
    fn test_rotation_about_y_keeps_y() {
        let rotation = ElementRotation::new(DVec3::new(8.0, 8.0, 8.0), Axis::Y, RotationAngle::Pos45);
        let (from, to) = (DVec3::new(2.0, 0.0, 4.0), DVec3::new(14.0, 9.0, 12.0));
        let element = Element::new(from, to, Some(rotation)).unwrap();
        let plain = cuboid_corners(from, to, None);
        for (before, after) in plain.iter().zip(element.corners()) {
            assert_eq!(before.y, after.y);
        }
        assert!(element.is_rotated());
        assert_eq!(element.face(FaceDirection::Up).rotation_axis(), Some(Axis::Y));
        assert_eq!(element.face(FaceDirection::Up).rotation_angle(), RotationAngle::Pos45);
    }

    #[test]
    fn test_rotated_origin_corner_stays_put() {
        let origin = DVec3::new(0.0, 0.0, 0.0);
        let rotation = ElementRotation::new(origin, Axis::Z, RotationAngle::Neg22_5);
        let element = Element::new(origin, DVec3::splat(4.0), Some(rotation)).unwrap();
        assert!((element.corners()[0] - origin).length() < EPS);
    }

    #[test]
    fn test_rescale_stretches_perpendicular_axes() {
        let origin = DVec3::new(8.0, 8.0, 8.0);
        let rotation = ElementRotation::new(origin, Axis::Y, RotationAngle::Pos45).with_rescale(true);
        let element = Element::new(DVec3::new(0.0, 0.0, 8.0), DVec3::new(16.0, 16.0, 8.0), Some(rotation)).unwrap();
        // The flat 16-wide panel is stretched to span the block diagonal
        let width = (element.corners()[1] - element.corners()[0]).length();
        assert!((width - 16.0 * 2f64.sqrt()).abs() < 1e-9);
        assert_eq!(element.corners()[2].y, 16.0);
    }

    #[test]
    fn test_faces_drawn_from_corners() {
        for rotation in [None, Some(ElementRotation::new(DVec3::splat(8.0), Axis::X, RotationAngle::Pos22_5))] {
            let element = Element::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(5.0, 7.0, 11.0), rotation).unwrap();
            let corners = element.corners();
            let mut used = [false; 8];
            for face in element.faces() {
                for c in &face.corners {
                    let idx = corners.iter().position(|k| k == c).expect("face corner not an element corner");
                    used[idx] = true;
                }
                let unique: std::collections::HashSet<usize> = face.direction.corner_indices().into_iter().collect();
                assert_eq!(unique.len(), 4);
            }
            assert!(used.iter().all(|u| *u));
        }
    }

    #[test]
    fn test_faces_planar_with_outward_normal() {
        let element = cube();
        let center = element.bounds().center();
        for face in element.faces() {
            let [c0, c1, c2, c3] = face.corners;
            let n = (c1 - c0).cross(c2 - c0).normalize();
            assert!((n - face.direction.normal()).length() < EPS);
            assert!(n.dot(c3 - c0).abs() < EPS);
            assert!(n.dot(c0 - center) > 0.0);
        }
    }

    #[test]
    fn test_shared_edges_opposite_winding() {
        let element = cube();
        let edges = |face: &Face| -> Vec<(DVec3, DVec3)> {
            (0..4).map(|i| (face.corners[i], face.corners[(i + 1) % 4])).collect()
        };
        let faces = element.faces();
        for a in faces.iter() {
            for b in faces.iter() {
                if a.direction == b.direction || a.direction == b.direction.opposite() {
                    continue;
                }
                let shared: Vec<_> = edges(a)
                    .into_iter()
                    .filter(|(p, q)| edges(b).iter().any(|(r, s)| (p == r && q == s) || (p == s && q == r)))
                    .collect();
                assert_eq!(shared.len(), 1, "{:?}/{:?}", a.direction, b.direction);
                let (p, q) = shared[0];
                assert!(edges(b).contains(&(q, p)), "{:?}/{:?} share an edge in the same direction", a.direction, b.direction);
            }
        }
    }

    #[test]
    fn test_malformed_bounds() {
        let err = Element::new(DVec3::new(4.0, 0.0, 0.0), DVec3::new(2.0, 16.0, 16.0), None).unwrap_err();
        assert!(matches!(err, Error::MalformedElement(_)));
        let err = Element::new(DVec3::new(f64::NAN, 0.0, 0.0), DVec3::ONE, None).unwrap_err();
        assert!(matches!(err, Error::MalformedElement(_)));
        // Flat elements are allowed
        assert!(Element::new(DVec3::new(0.0, 8.0, 0.0), DVec3::new(16.0, 8.0, 16.0), None).is_ok());
    }

    #[test]
    fn test_invalid_angle() {
        let err = ElementRotation::from_degrees(DVec3::splat(8.0), Axis::X, 30.0).unwrap_err();
        assert!(matches!(err, Error::InvalidAngle(a) if a == 30.0));
    }

    #[test]
    fn test_textured_faces() {
        let element = cube().with_texture(
            FaceDirection::North,
            FaceTexture::new("#side", UvRect::new(0.0, 0.0, 16.0, 16.0)),
        );
        let textured: Vec<_> = element.textured_faces().map(|(f, _)| f.direction).collect();
        assert_eq!(textured, vec![FaceDirection::North]);
        assert_eq!(cube().with_all_textures("#all").textured_faces().count(), 6);
    }

    #[test]
    fn test_uv_rotation_validation() {
        assert_eq!(FaceTexture::check_uv_rotation(270).unwrap(), 270);
        assert!(FaceTexture::check_uv_rotation(45).is_err());
    }
}
