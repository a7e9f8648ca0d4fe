//! Mathematical utilities: bounding boxes and element rotation

pub mod aabb;
pub mod rotation;

pub use aabb::Aabb;
pub use rotation::{Axis, RotationAngle, rotate_about};
