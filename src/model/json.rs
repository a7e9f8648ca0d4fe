//! Block model JSON documents.
//!
//! Only the parts the optimizer touches are typed; every other key is kept
//! in a flattened map so untouched data survives a rewrite.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::Error;
use crate::core::types::{DVec3, Result};
use crate::math::Axis;
use super::direction::FaceDirection;
use super::element::{Element, ElementRotation, FaceTexture};
use super::uv::UvRect;

/// A block or item model file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ModelElement>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl BlockModel {
    /// Parse a model file, tolerating a UTF-8 byte order mark
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn has_elements(&self) -> bool {
        self.elements.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Build geometry for every element, failing on the first malformed one
    pub fn to_elements(&self) -> Result<Vec<Element>> {
        self.elements
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, element)| {
                element.to_element().map_err(|err| match err {
                    Error::MalformedElement(msg) => Error::MalformedElement(format!("element {}: {}", i, msg)),
                    other => other,
                })
            })
            .collect()
    }
}

/// One entry of a model's `elements` array
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<ModelRotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shade: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_emission: Option<u8>,
    #[serde(default)]
    pub faces: BTreeMap<FaceDirection, ModelFace>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelElement {
    pub fn to_element(&self) -> Result<Element> {
        let from = self.from
            .map(DVec3::from_array)
            .ok_or_else(|| Error::MalformedElement("missing `from`".to_string()))?;
        let to = self.to
            .map(DVec3::from_array)
            .ok_or_else(|| Error::MalformedElement("missing `to`".to_string()))?;
        let rotation = self.rotation.as_ref().map(ModelRotation::to_rotation).transpose()?;

        let mut element = Element::new(from, to, rotation)?
            .with_shade(self.shade.unwrap_or(true))
            .with_light_emission(self.light_emission);

        for (&direction, face) in &self.faces {
            if face.texture.is_empty() {
                return Err(Error::MalformedElement(format!("{:?} face has no texture", direction)));
            }
            let texture = FaceTexture {
                texture: face.texture.clone(),
                uv: face.uv
                    .map(UvRect::from_array)
                    .unwrap_or_else(|| direction.default_uv(from, to)),
                uv_rotation: FaceTexture::check_uv_rotation(face.rotation.unwrap_or(0))?,
                tint_index: face.tintindex,
                cullface: face.cullface,
            };
            element = element.with_texture(direction, texture);
        }
        Ok(element)
    }
}

fn default_origin() -> [f64; 3] {
    [8.0, 8.0, 8.0]
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Element `rotation` object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelRotation {
    #[serde(default = "default_origin")]
    pub origin: [f64; 3],
    pub axis: Axis,
    pub angle: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub rescale: bool,
}

impl ModelRotation {
    pub fn to_rotation(&self) -> Result<ElementRotation> {
        Ok(ElementRotation::from_degrees(DVec3::from_array(self.origin), self.axis, self.angle)?
            .with_rescale(self.rescale))
    }
}

impl From<&ElementRotation> for ModelRotation {
    fn from(rotation: &ElementRotation) -> Self {
        Self {
            origin: rotation.origin.to_array(),
            axis: rotation.axis,
            angle: rotation.angle.degrees(),
            rescale: rotation.rescale,
        }
    }
}

/// One entry of an element's `faces` object
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<[f64; 4]>,
    #[serde(default)]
    pub texture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cullface: Option<FaceDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tintindex: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::RotationAngle;

    const SLAB: &str = r##"{
        "parent": "block/block",
        "textures": { "side": "block/stone", "particle": "#side" },
        "elements": [
            {
                "name": "slab",
                "from": [0, 0, 0],
                "to": [16, 8, 16],
                "faces": {
                    "up": { "uv": [0, 0, 16, 16], "texture": "#side" },
                    "bottom": { "texture": "#side", "cullface": "down" },
                    "north": { "texture": "#side", "tintindex": 0, "rotation": 90 }
                }
            },
            {
                "from": [4, 8, 4],
                "to": [12, 12, 12],
                "rotation": { "origin": [8, 8, 8], "axis": "y", "angle": 22.5, "rescale": true },
                "shade": false,
                "faces": { "up": { "texture": "#side" } }
            }
        ]
    }"##;

    #[test]
    fn test_parse_model() {
        let model = BlockModel::from_slice(SLAB.as_bytes()).unwrap();
        assert!(model.has_elements());
        assert_eq!(model.rest["parent"], "block/block");

        let elements = model.to_elements().unwrap();
        assert_eq!(elements.len(), 2);

        let slab = &elements[0];
        assert_eq!(slab.to(), DVec3::new(16.0, 8.0, 16.0));
        let down = slab.texture(FaceDirection::Down).unwrap();
        assert_eq!(down.cullface, Some(FaceDirection::Down));
        // Missing UVs default to the face's position in the block
        assert_eq!(down.uv.to_array(), [0.0, 0.0, 16.0, 16.0]);
        let north = slab.texture(FaceDirection::North).unwrap();
        assert_eq!(north.uv_rotation, 90);
        assert_eq!(north.tint_index, Some(0));
        assert!(slab.texture(FaceDirection::East).is_none());

        let rotated = &elements[1];
        assert!(rotated.is_rotated());
        assert!(!rotated.shade());
        let rotation = rotated.rotation().unwrap();
        assert_eq!(rotation.angle, RotationAngle::Pos22_5);
        assert!(rotation.rescale);
    }

    #[test]
    fn test_roundtrip_keeps_unknown_keys() {
        let model = BlockModel::from_slice(SLAB.as_bytes()).unwrap();
        let bytes = model.to_vec().unwrap();
        let again = BlockModel::from_slice(&bytes).unwrap();
        assert_eq!(again, model);
        let elements = again.elements.unwrap();
        assert_eq!(elements[0].extra["name"], "slab");
    }

    #[test]
    fn test_model_without_elements() {
        let model = BlockModel::from_slice(br#"{ "parent": "block/cube_all" }"#).unwrap();
        assert!(!model.has_elements());
        assert!(model.to_elements().unwrap().is_empty());
        let text = String::from_utf8(model.to_vec().unwrap()).unwrap();
        assert!(!text.contains("elements"));
    }

    #[test]
    fn test_bom_is_ignored() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(br#"{ "elements": [] }"#);
        assert!(BlockModel::from_slice(&bytes).is_ok());
    }

    #[test]
    fn test_invalid_angle_rejected() {
        let json = r#"{ "elements": [ { "from": [0,0,0], "to": [1,1,1],
            "rotation": { "origin": [0,0,0], "axis": "x", "angle": 30 } } ] }"#;
        let model = BlockModel::from_slice(json.as_bytes()).unwrap();
        assert!(matches!(model.to_elements(), Err(Error::InvalidAngle(_))));
    }

    #[test]
    fn test_malformed_elements() {
        let missing = r#"{ "elements": [ { "to": [1,1,1] } ] }"#;
        let model = BlockModel::from_slice(missing.as_bytes()).unwrap();
        assert!(matches!(model.to_elements(), Err(Error::MalformedElement(msg)) if msg.contains("from")));

        let inverted = r#"{ "elements": [ { "from": [0,0,0], "to": [1,1,1] },
            { "from": [0,5,0], "to": [1,1,1] } ] }"#;
        let model = BlockModel::from_slice(inverted.as_bytes()).unwrap();
        assert!(matches!(model.to_elements(), Err(Error::MalformedElement(msg)) if msg.starts_with("element 1")));

        let untextured = r#"{ "elements": [ { "from": [0,0,0], "to": [1,1,1], "faces": { "up": {} } } ] }"#;
        let model = BlockModel::from_slice(untextured.as_bytes()).unwrap();
        assert!(matches!(model.to_elements(), Err(Error::MalformedElement(_))));
    }

    #[test]
    fn test_rotation_conversion() {
        let rotation = ElementRotation::new(DVec3::new(8.0, 0.0, 8.0), Axis::Z, RotationAngle::Neg45);
        let json = ModelRotation::from(&rotation);
        assert_eq!(json.angle, -45.0);
        assert_eq!(json.to_rotation().unwrap(), rotation);
    }
}
