/// Contributing-scene reporting.
///
/// Two outputs: the console listing of scene identifiers per season
/// (truncated to the first 20, in catalog order), and an append-only JSONL
/// evidence log recording which scenes fed each composite run. The
/// evidence record carries a SHA-256 digest of the complete per-season ID
/// list so a truncated console listing can still be matched against a
/// full run later.

use std::error::Error;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::PipelineConfig;
use crate::model::Scene;
use crate::seasons::Season;

/// How many scene identifiers are shown per season.
pub const MAX_REPORTED_IDS: usize = 20;

// ---------------------------------------------------------------------------
// ID listings
// ---------------------------------------------------------------------------

/// Scene identifiers of a partition, in catalog order, truncated for the
/// console listing.
pub fn contributing_ids(partition: &[&Scene]) -> Vec<String> {
    partition
        .iter()
        .take(MAX_REPORTED_IDS)
        .map(|s| s.meta.id.clone())
        .collect()
}

/// All scene identifiers of a partition, untruncated (for the evidence log).
pub fn all_ids(partition: &[&Scene]) -> Vec<String> {
    partition.iter().map(|s| s.meta.id.clone()).collect()
}

/// The console line for one season, e.g. `Wet IDs: ["A", "B"]`.
pub fn format_season_ids(season: Season, ids: &[String]) -> String {
    format!("{} IDs: {:?}", season.label(), ids)
}

/// Print the labeled listing for one season.
pub fn print_season_ids(season: Season, partition: &[&Scene]) {
    println!("{}", format_season_ids(season, &contributing_ids(partition)));
}

// ---------------------------------------------------------------------------
// Evidence log
// ---------------------------------------------------------------------------

/// One evidence record, one JSONL line per pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceRecord {
    pub timestamp: String,
    pub dataset: String,
    pub endpoint: String,
    pub bbox: [f64; 4],
    pub window: String,
    pub polarization: String,
    pub wet_scene_count: usize,
    pub dry_scene_count: usize,
    pub wet_ids: Vec<String>,
    pub dry_ids: Vec<String>,
    pub wet_ids_sha256: String,
    pub dry_ids_sha256: String,
}

impl EvidenceRecord {
    /// Build a record for one run. The timestamp is injected so tests stay
    /// deterministic.
    pub fn new(
        config: &PipelineConfig,
        wet: &[&Scene],
        dry: &[&Scene],
        timestamp: DateTime<Utc>,
    ) -> Self {
        let wet_all = all_ids(wet);
        let dry_all = all_ids(dry);
        Self {
            timestamp: timestamp.to_rfc3339(),
            dataset: config.dataset.catalog_key.to_string(),
            endpoint: config.endpoint.clone(),
            bbox: config.aoi.bbox(),
            window: config.window.stac_interval(),
            polarization: config.polarization.to_string(),
            wet_scene_count: wet_all.len(),
            dry_scene_count: dry_all.len(),
            wet_ids_sha256: sha256_hex(&wet_all.join("\n")),
            dry_ids_sha256: sha256_hex(&dry_all.join("\n")),
            wet_ids: wet_all.into_iter().take(MAX_REPORTED_IDS).collect(),
            dry_ids: dry_all.into_iter().take(MAX_REPORTED_IDS).collect(),
        }
    }
}

/// Hex SHA-256 of a string.
pub fn sha256_hex(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Append one record to the JSONL evidence log, creating parent
/// directories on first use.
pub fn log_evidence(path: &Path, record: &EvidenceRecord) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    use std::io::Write;
    writeln!(file, "{}", serde_json::to_string(record)?)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
