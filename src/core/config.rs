//! Run configuration: the persisted `config.json` and the optimizer settings
//! derived from it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Error;
use super::types::Result;

/// Persisted run configuration (`config.json`, camelCase keys)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Resource pack archive to optimize
    pub input_java_pack: Option<PathBuf>,
    /// Merge coplanar faces into larger quads
    pub process_mesh: bool,
    /// Merge UV regions that overlap on the same texture
    pub process_uv: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_java_pack: None,
            process_mesh: true,
            process_uv: true,
        }
    }
}

impl Config {
    /// Default file name, resolved against the working directory
    pub const FILE_NAME: &'static str = "config.json";

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::missing_file(path));
        }
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Load the config file if present, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            log::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write the config as 4-space indented JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        fs::write(path, buf)?;
        Ok(())
    }

    /// Optimizer settings for this run
    pub fn optimize_config(&self) -> OptimizeConfig {
        OptimizeConfig {
            process_mesh: self.process_mesh,
            process_uv: self.process_uv,
            ..Default::default()
        }
    }

    /// Pick the input archive: the configured one, or the only `.zip` in `dir`.
    pub fn resolve_input(&self, dir: &Path) -> Result<PathBuf> {
        if let Some(path) = &self.input_java_pack {
            let path = if path.is_absolute() { path.clone() } else { dir.join(path) };
            if !path.is_file() {
                return Err(Error::missing_file(&path));
            }
            return Ok(path);
        }

        let mut zips: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "zip"))
            .collect();
        zips.sort();

        match zips.len() {
            0 => Err(Error::Config(format!(
                "no zip files found in {}; provide a pack to optimize",
                dir.display()
            ))),
            1 => Ok(zips.remove(0)),
            _ => {
                let names: Vec<String> = zips
                    .iter()
                    .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                    .collect();
                Err(Error::Config(format!(
                    "multiple zip files found ({}); set inputJavaPack or pass the pack path",
                    names.join(", ")
                )))
            }
        }
    }
}

/// Settings consumed by the optimization passes.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizeConfig {
    /// Merge coplanar adjacent faces
    pub process_mesh: bool,
    /// Union UV regions on the same texture
    pub process_uv: bool,
    /// Leaf item count above which an octree node subdivides
    pub min_elements_per_region: usize,
    /// Deepest octree level that may still be created (root is depth 0)
    pub max_depth: u8,
    /// Smallest child edge length a split may produce
    pub min_region_size: f64,
    /// Tolerance for coordinate and UV comparisons
    pub epsilon: f64,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            process_mesh: true,
            process_uv: true,
            min_elements_per_region: 8,
            max_depth: 6,
            min_region_size: 0.25,
            epsilon: 1e-6,
        }
    }
}
