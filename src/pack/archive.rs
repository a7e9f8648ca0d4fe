//! Resource pack archives.
//!
//! A run reads every entry of the input zip, optimizes the block and item
//! models in parallel and only then writes the output archive. Any model that
//! fails to parse aborts the run before anything is written.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use rayon::prelude::*;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::OptimizeConfig;
use crate::core::types::Result;
use crate::optimize::{OptimizeStats, UvRegion};
use super::rewrite::optimize_model_json;

/// True for model JSON files: `assets/<namespace>/models/**.json`
pub fn is_model_path(name: &str) -> bool {
    name.starts_with("assets/") && name.contains("/models/") && name.ends_with(".json")
}

/// One archive entry held in memory
#[derive(Clone, Debug)]
pub struct PackEntry {
    pub name: String,
    pub is_dir: bool,
    pub data: Vec<u8>,
}

impl PackEntry {
    pub fn is_model(&self) -> bool {
        !self.is_dir && is_model_path(&self.name)
    }
}

/// Summary of one pack run
#[derive(Clone, Debug, Default)]
pub struct PackReport {
    pub entries: usize,
    pub models: usize,
    /// Models whose geometry changed and were rewritten
    pub rewritten: usize,
    pub stats: OptimizeStats,
    /// UV region table of every model with elements, keyed by archive path
    pub uv_regions: BTreeMap<String, Vec<UvRegion>>,
}

impl PackReport {
    /// Region tables as pretty JSON, for the texture repacker
    pub fn regions_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.uv_regions)?)
    }

    pub fn write_regions(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.regions_json()?)?;
        Ok(())
    }
}

/// Read every entry of a zip archive in archive order
pub fn read_entries(bytes: &[u8]) -> Result<Vec<PackEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        entries.push(PackEntry {
            name: file.name().to_string(),
            is_dir: file.is_dir(),
            data,
        });
    }
    Ok(entries)
}

/// Write entries to a new deflated zip archive
pub fn write_entries(entries: &[PackEntry]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        if entry.is_dir {
            zip.add_directory(entry.name.as_str(), options)?;
        } else {
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Optimize every model in an in-memory pack and return the new archive
pub fn optimize_pack_bytes(bytes: &[u8], config: &OptimizeConfig) -> Result<(Vec<u8>, PackReport)> {
    let mut entries = read_entries(bytes)?;
    let models = entries.iter().filter(|e| e.is_model()).count();
    log::info!("Optimizing {} models ({} archive entries)...", models, entries.len());

    let results = entries
        .par_iter()
        .map(|entry| {
            if !entry.is_model() {
                return Ok(None);
            }
            optimize_model_json(&entry.data, config).map_err(|err| err.in_model(entry.name.as_str()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut report = PackReport {
        entries: entries.len(),
        models,
        ..Default::default()
    };
    for (entry, result) in entries.iter_mut().zip(results) {
        let Some(output) = result else {
            continue;
        };
        log::debug!(
            "{}: {} -> {} faces, {} UV regions",
            entry.name, output.stats.faces_in, output.stats.faces_out, output.regions.len()
        );
        report.stats.absorb(&output.stats);
        report.uv_regions.insert(entry.name.clone(), output.regions);
        if let Some(data) = output.data {
            entry.data = data;
            report.rewritten += 1;
        }
    }

    Ok((write_entries(&entries)?, report))
}

/// Optimize the pack at `input` and write the result to `output`
pub fn optimize_pack(input: &Path, output: &Path, config: &OptimizeConfig) -> Result<PackReport> {
    let start = std::time::Instant::now();
    let bytes = fs::read(input)?;
    let (optimized, report) = optimize_pack_bytes(&bytes, config)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, &optimized)?;

    log::info!(
        "Rewrote {}/{} models: {} -> {} faces, {} merges in {:.2}s ({} -> {} bytes)",
        report.rewritten, report.models, report.stats.faces_in, report.stats.faces_out,
        report.stats.merges, start.elapsed().as_secs_f64(), bytes.len(), optimized.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use serde_json::{Value, json};

    const MODEL: &str = "assets/demo/models/block/planks.json";

    fn halves_model() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "textures": { "top": "block/oak_planks" },
            "elements": [
                { "from": [0, 0, 0], "to": [8, 16, 16],
                  "faces": { "up": { "uv": [0, 0, 8, 16], "texture": "#top" } } },
                { "from": [8, 0, 0], "to": [16, 16, 16],
                  "faces": { "up": { "uv": [8, 0, 16, 16], "texture": "#top" } } }
            ]
        }))
        .unwrap()
    }

    fn pack(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut all = vec![PackEntry { name: "assets/".to_string(), is_dir: true, data: Vec::new() }];
        all.extend(entries.iter().map(|(name, data)| PackEntry {
            name: name.to_string(),
            is_dir: false,
            data: data.to_vec(),
        }));
        write_entries(&all).unwrap()
    }

    #[test]
    fn test_is_model_path() {
        assert!(is_model_path("assets/minecraft/models/block/stone.json"));
        assert!(is_model_path("assets/demo/models/item/deep/thing.json"));
        assert!(!is_model_path("assets/minecraft/blockstates/stone.json"));
        assert!(!is_model_path("assets/minecraft/models/block/stone.png"));
        assert!(!is_model_path("data/minecraft/models/x.json"));
        assert!(!is_model_path("pack.mcmeta"));
    }

    #[test]
    fn test_pack_rewrite_keeps_other_entries() {
        let model = halves_model();
        let input = pack(&[
            ("pack.mcmeta", br#"{"pack":{"pack_format":15}}"#),
            (MODEL, &model),
            ("assets/demo/textures/block/planks.png", &[0x89, 0x50, 0x4E, 0x47]),
        ]);
        let (output, report) = optimize_pack_bytes(&input, &OptimizeConfig::default()).unwrap();
        assert_eq!(report.entries, 4);
        assert_eq!(report.models, 1);
        assert_eq!(report.rewritten, 1);
        assert_eq!(report.stats.merges, 1);

        let entries = read_entries(&output).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["assets/", "pack.mcmeta", MODEL, "assets/demo/textures/block/planks.png"]);
        assert!(entries[0].is_dir);
        assert_eq!(entries[1].data, br#"{"pack":{"pack_format":15}}"#);
        assert_eq!(entries[3].data, [0x89, 0x50, 0x4E, 0x47]);

        let value: Value = serde_json::from_slice(&entries[2].data).unwrap();
        assert_eq!(value["elements"].as_array().unwrap().len(), 1);
        assert_eq!(value["elements"][0]["faces"]["up"]["uv"], json!([0.0, 0.0, 16.0, 16.0]));
    }

    #[test]
    fn test_uv_regions_follow_process_uv() {
        // Two halves sampling the same texels cannot merge but share a region
        let tiled = serde_json::to_vec(&json!({
            "elements": [
                { "from": [0, 0, 0], "to": [8, 16, 16],
                  "faces": { "up": { "uv": [0, 0, 8, 16], "texture": "#top" } } },
                { "from": [8, 0, 0], "to": [16, 16, 16],
                  "faces": { "up": { "uv": [0, 0, 8, 16], "texture": "#top" } } }
            ]
        }))
        .unwrap();
        let input = pack(&[(MODEL, &tiled)]);

        let (with_uv, merged) = optimize_pack_bytes(&input, &OptimizeConfig::default()).unwrap();
        let config = OptimizeConfig { process_uv: false, ..OptimizeConfig::default() };
        let (without_uv, separate) = optimize_pack_bytes(&input, &config).unwrap();

        assert_eq!(merged.uv_regions[MODEL].len(), 1);
        assert_eq!(separate.uv_regions[MODEL].len(), 2);
        assert_eq!(merged.stats.regions_out, 1);
        assert_eq!(separate.stats.regions_out, 2);
        assert_ne!(merged.regions_json().unwrap(), separate.regions_json().unwrap());

        // Geometry is untouched either way
        assert_eq!(merged.rewritten, 0);
        assert_eq!(read_entries(&with_uv).unwrap()[1].data, tiled);
        assert_eq!(read_entries(&without_uv).unwrap()[1].data, tiled);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/regions.json");
        merged.write_regions(&path).unwrap();
        let value: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value[MODEL][0]["texture"], "#top");
        assert_eq!(value[MODEL][0]["max"], json!([8.0, 16.0]));
    }

    #[test]
    fn test_unchanged_models_keep_original_bytes() {
        let model = br#"{ "parent": "block/cube_all" }"#;
        let input = pack(&[(MODEL, model)]);
        let (output, report) = optimize_pack_bytes(&input, &OptimizeConfig::default()).unwrap();
        assert_eq!(report.rewritten, 0);
        assert!(report.uv_regions.is_empty());
        assert_eq!(read_entries(&output).unwrap()[1].data, model);
    }

    #[test]
    fn test_bad_model_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("in.zip");
        let output_path = dir.path().join("out/packed.zip");
        let model = halves_model();
        let input = pack(&[
            (MODEL, &model),
            ("assets/demo/models/block/broken.json", br#"{"elements": [{"from": [0, 0, 0]}]}"#),
        ]);
        fs::write(&input_path, input).unwrap();

        let err = optimize_pack(&input_path, &output_path, &OptimizeConfig::default()).unwrap_err();
        match err {
            Error::Model { path, source } => {
                assert_eq!(path, "assets/demo/models/block/broken.json");
                assert!(matches!(*source, Error::MalformedElement(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output_path.exists());
    }

    #[test]
    fn test_optimize_pack_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("in.zip");
        let output_path = dir.path().join("target/out.zip");
        let model = halves_model();
        fs::write(&input_path, pack(&[(MODEL, &model)])).unwrap();

        let report = optimize_pack(&input_path, &output_path, &OptimizeConfig::default()).unwrap();
        assert_eq!(report.rewritten, 1);
        let entries = read_entries(&fs::read(&output_path).unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            optimize_pack_bytes(b"definitely not a zip", &OptimizeConfig::default()),
            Err(Error::Zip(_))
        ));
    }
}
