/// Pipeline configuration.
///
/// The AOI, time window, and polarization were literal constants in the
/// original analysis template; here they are required inputs read from a
/// TOML file at a fixed path. There is deliberately no CLI flag parsing
/// and no environment-variable lookup — one file describes one run.

use std::path::PathBuf;

use serde::Deserialize;

use crate::datasets::{self, Dataset};
use crate::model::{Aoi, Polarization, TimeWindow};

/// Where the binary looks for its configuration.
pub const DEFAULT_CONFIG_PATH: &str = "./sarcomp.toml";

// ---------------------------------------------------------------------------
// Raw file schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ConfigFile {
    aoi: AoiSection,
    window: WindowSection,
    collection: CollectionSection,
    output: OutputSection,
}

#[derive(Debug, Deserialize)]
struct AoiSection {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

#[derive(Debug, Deserialize)]
struct WindowSection {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
struct CollectionSection {
    /// Catalog key of the image collection (must be in the dataset registry).
    dataset: String,
    /// STAC API root, e.g. "https://catalog.example.org/api/v1".
    endpoint: String,
    polarization: String,
}

#[derive(Debug, Deserialize)]
struct OutputSection {
    /// Directory receiving the rendered layers and map manifest.
    dir: String,
    /// Append-only JSONL evidence log path.
    evidence_log: String,
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// One validated pipeline run description.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub aoi: Aoi,
    pub window: TimeWindow,
    pub polarization: Polarization,
    pub dataset: &'static Dataset,
    pub endpoint: String,
    pub output_dir: PathBuf,
    pub evidence_log: PathBuf,
}

/// Read and validate a configuration file.
pub fn load_config(path: &str) -> Result<PipelineConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config file {}: {}", path, e))?;
    parse_config(&text)
}

/// Parse and validate configuration TOML. Split from `load_config` so the
/// validation rules are testable without touching the filesystem.
pub fn parse_config(text: &str) -> Result<PipelineConfig, String> {
    let file: ConfigFile =
        toml::from_str(text).map_err(|e| format!("invalid config TOML: {}", e))?;

    let aoi = Aoi::new(file.aoi.west, file.aoi.south, file.aoi.east, file.aoi.north)?;
    let window = TimeWindow::new(&file.window.start, &file.window.end)?;
    let polarization: Polarization = file.collection.polarization.parse()?;

    let dataset = datasets::find_dataset(&file.collection.dataset).ok_or_else(|| {
        format!(
            "unknown dataset '{}' (registered: {})",
            file.collection.dataset,
            datasets::all_catalog_keys().join(", ")
        )
    })?;

    if !dataset.channels.contains(&polarization) {
        return Err(format!(
            "dataset '{}' does not distribute a {} channel",
            dataset.catalog_key, polarization
        ));
    }

    if file.collection.endpoint.trim().is_empty() {
        return Err("collection.endpoint must not be empty".to_string());
    }

    Ok(PipelineConfig {
        aoi,
        window,
        polarization,
        dataset,
        endpoint: file.collection.endpoint.trim_end_matches('/').to_string(),
        output_dir: PathBuf::from(file.output.dir),
        evidence_log: PathBuf::from(file.output.evidence_log),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
