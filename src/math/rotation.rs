//! Single-axis rigid rotation used by model elements.
//!
//! Elements may only rotate about one principal axis by one of five fixed
//! angles. The transform here is the raw origin-relative rotation; callers
//! that want world-space positions add the origin back.

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::DVec3;

/// Principal rotation axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index (x=0, y=1, z=2)
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the axis
    pub fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
        }
    }
}

/// One of the permitted element rotation angles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum RotationAngle {
    Neg45,
    Neg22_5,
    Zero,
    Pos22_5,
    Pos45,
}

impl RotationAngle {
    pub const ALL: [RotationAngle; 5] = [
        RotationAngle::Neg45,
        RotationAngle::Neg22_5,
        RotationAngle::Zero,
        RotationAngle::Pos22_5,
        RotationAngle::Pos45,
    ];

    /// Angle in degrees
    pub fn degrees(self) -> f64 {
        match self {
            RotationAngle::Neg45 => -45.0,
            RotationAngle::Neg22_5 => -22.5,
            RotationAngle::Zero => 0.0,
            RotationAngle::Pos22_5 => 22.5,
            RotationAngle::Pos45 => 45.0,
        }
    }

    /// Angle in radians
    pub fn radians(self) -> f64 {
        self.degrees().to_radians()
    }

    pub fn is_zero(self) -> bool {
        self == RotationAngle::Zero
    }

    /// The inverse rotation; the permitted set is closed under negation.
    pub fn negated(self) -> Self {
        match self {
            RotationAngle::Neg45 => RotationAngle::Pos45,
            RotationAngle::Neg22_5 => RotationAngle::Pos22_5,
            RotationAngle::Zero => RotationAngle::Zero,
            RotationAngle::Pos22_5 => RotationAngle::Neg22_5,
            RotationAngle::Pos45 => RotationAngle::Neg45,
        }
    }
}

impl TryFrom<f64> for RotationAngle {
    type Error = Error;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        RotationAngle::ALL
            .into_iter()
            .find(|a| a.degrees() == degrees)
            .ok_or(Error::InvalidAngle(degrees))
    }
}

impl From<RotationAngle> for f64 {
    fn from(angle: RotationAngle) -> f64 {
        angle.degrees()
    }
}

/// Rotate `point` about the line through `origin` along `axis`.
///
/// The result is relative to `origin`. Angle zero returns `point - origin`
/// unchanged; the coordinate along `axis` is never modified.
pub fn rotate_about(point: DVec3, origin: DVec3, axis: Axis, angle: RotationAngle) -> DVec3 {
    let p = point - origin;
    if angle.is_zero() {
        return p;
    }
    let (sin, cos) = angle.radians().sin_cos();
    match axis {
        Axis::X => DVec3::new(
            p.x,
            p.y * cos - p.z * sin,
            p.y * sin + p.z * cos,
        ),
        Axis::Y => DVec3::new(
            p.x * cos + p.z * sin,
            p.y,
            -p.x * sin + p.z * cos,
        ),
        Axis::Z => DVec3::new(
            p.x * cos - p.y * sin,
            p.x * sin + p.y * cos,
            p.z,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_angle_parsing() {
        for angle in RotationAngle::ALL {
            assert_eq!(RotationAngle::try_from(angle.degrees()).unwrap(), angle);
        }
        assert!(matches!(RotationAngle::try_from(30.0), Err(Error::InvalidAngle(a)) if a == 30.0));
        assert!(RotationAngle::try_from(90.0).is_err());
        assert!(RotationAngle::try_from(f64::NAN).is_err());
    }

    #[test]
    fn test_angle_serde() {
        let angle: RotationAngle = serde_json::from_str("-22.5").unwrap();
        assert_eq!(angle, RotationAngle::Neg22_5);
        assert_eq!(serde_json::to_string(&RotationAngle::Pos45).unwrap(), "45.0");
        assert!(serde_json::from_str::<RotationAngle>("10").is_err());
    }

    #[test]
    fn test_negated_roundtrip() {
        for angle in RotationAngle::ALL {
            assert_eq!(angle.negated().degrees(), -angle.degrees());
            assert_eq!(angle.negated().negated(), angle);
        }
    }

    #[test]
    fn test_zero_angle_is_relative_identity() {
        let origin = DVec3::new(8.0, 8.0, 8.0);
        let p = DVec3::new(3.0, 12.5, -1.0);
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            assert_eq!(rotate_about(p, origin, axis, RotationAngle::Zero), p - origin);
        }
    }

    #[test]
    fn test_axis_component_unchanged() {
        let origin = DVec3::new(8.0, 4.0, 2.0);
        let p = DVec3::new(1.0, 2.0, 3.0);
        for angle in RotationAngle::ALL {
            let rel = p - origin;
            assert_eq!(rotate_about(p, origin, Axis::X, angle).x, rel.x);
            assert_eq!(rotate_about(p, origin, Axis::Y, angle).y, rel.y);
            assert_eq!(rotate_about(p, origin, Axis::Z, angle).z, rel.z);
        }
    }

    #[test]
    fn test_norm_preserving() {
        let origin = DVec3::new(8.0, 8.0, 8.0);
        let points = [
            DVec3::ZERO,
            DVec3::new(16.0, 0.0, 16.0),
            DVec3::new(4.5, 11.0, 2.25),
        ];
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            for angle in RotationAngle::ALL {
                for p in points {
                    let before = (p - origin).length();
                    let after = rotate_about(p, origin, axis, angle).length();
                    assert!((before - after).abs() < EPS);
                }
            }
        }
    }

    #[test]
    fn test_quarter_turn_direction() {
        // +45 about z takes +x towards +y
        let r = rotate_about(DVec3::X, DVec3::ZERO, Axis::Z, RotationAngle::Pos45);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!((r - DVec3::new(s, s, 0.0)).length() < EPS);

        // +45 about y takes +x towards -z
        let r = rotate_about(DVec3::X, DVec3::ZERO, Axis::Y, RotationAngle::Pos45);
        assert!((r - DVec3::new(s, 0.0, -s)).length() < EPS);
    }
}
