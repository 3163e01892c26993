//! Catalog Verification Module
//!
//! Framework for testing the configured catalog endpoint against the live
//! API to determine whether the registered datasets are accessible and
//! returning scenes for a given AOI and window.
//!
//! Use this before pointing a new configuration at a catalog to validate
//! the endpoint, and from the ignored integration tests.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::ingest::catalog;
use crate::model::CatalogError;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub endpoint: String,
    pub results: Vec<DatasetVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetVerification {
    pub catalog_key: String,
    pub title: String,
    pub status: VerificationStatus,
    pub scene_count: usize,
    pub channels_seen: Vec<String>,
    pub channels_expected: Vec<String>,
    pub channels_missing: Vec<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Dataset Verification
// ============================================================================

/// Check one dataset against the live catalog: does a search over the
/// configured AOI/window return scenes, and do those scenes carry the
/// channels the registry promises?
pub fn verify_dataset(client: &reqwest::blocking::Client, config: &PipelineConfig) -> DatasetVerification {
    let dataset = config.dataset;
    let mut result = DatasetVerification {
        catalog_key: dataset.catalog_key.to_string(),
        title: dataset.title.to_string(),
        status: VerificationStatus::Failed,
        scene_count: 0,
        channels_seen: Vec::new(),
        channels_expected: dataset
            .channels
            .iter()
            .map(|p| p.band_name().to_string())
            .collect(),
        channels_missing: Vec::new(),
        error_message: None,
    };

    match catalog::fetch_collection(
        client,
        &config.endpoint,
        dataset.catalog_key,
        &config.aoi,
        &config.window,
    ) {
        Ok(scenes) => {
            result.scene_count = scenes.len();

            for scene in &scenes {
                for (name, _) in &scene.assets {
                    if !result.channels_seen.contains(name) {
                        result.channels_seen.push(name.clone());
                    }
                }
            }

            for expected in &result.channels_expected {
                if !result.channels_seen.contains(expected) {
                    result.channels_missing.push(expected.clone());
                }
            }

            result.status = if result.channels_missing.is_empty() {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(CatalogError::EmptyCollection { .. }) => {
            result.error_message =
                Some("search succeeded but returned no scenes for this AOI/window".to_string());
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_full_verification(config: &PipelineConfig) -> Result<VerificationReport, Box<dyn Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut report = VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        endpoint: config.endpoint.clone(),
        results: Vec::new(),
        summary: VerificationSummary {
            total: 0,
            working: 0,
            failed: 0,
        },
    };

    println!("Verifying catalog {} ...", config.endpoint);
    report.summary.total = 1;

    print!("  {} ... ", config.dataset.catalog_key);
    let result = verify_dataset(&client, config);

    match result.status {
        VerificationStatus::Success => {
            println!("OK ({} scenes)", result.scene_count);
            report.summary.working += 1;
        }
        VerificationStatus::PartialSuccess => {
            println!("Partial (missing channels: {:?})", result.channels_missing);
            report.summary.working += 1;
        }
        VerificationStatus::Failed => {
            println!("FAILED: {}", result.error_message.as_deref().unwrap_or("Unknown"));
            report.summary.failed += 1;
        }
    }

    report.results.push(result);
    Ok(report)
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n===========================================================");
    println!("VERIFICATION SUMMARY — {}", report.endpoint);
    println!("===========================================================");
    println!(
        "Datasets: {}/{} working  ({} failed)",
        report.summary.working, report.summary.total, report.summary.failed
    );
    for result in &report.results {
        println!(
            "  {} — {:?}, {} scenes",
            result.catalog_key, result.status, result.scene_count
        );
    }
    println!("===========================================================");
}

// ============================================================================
// Tests
// ============================================================================
