//! Block model data: elements, their faces and the JSON documents they come from

pub mod direction;
pub mod element;
pub mod face;
pub mod json;
pub mod uv;

pub use direction::FaceDirection;
pub use element::{Element, ElementCorners, ElementRotation, FaceTexture, cuboid_corners};
pub use face::{Face, FaceCorners, FaceRect};
pub use json::{BlockModel, ModelElement, ModelFace, ModelRotation};
pub use uv::{UvRect, UvSpan};
