/// Dataset registry for the seasonal SAR composite pipeline.
///
/// Defines the canonical list of SAR image collections this pipeline knows
/// how to calibrate, along with their catalog keys and calibration
/// constants. This is the single source of truth for dataset constants —
/// all other modules should reference datasets from here rather than
/// hardcoding catalog keys or calibration offsets.

use crate::model::Polarization;

// ---------------------------------------------------------------------------
// Dataset metadata
// ---------------------------------------------------------------------------

/// Metadata for a single SAR image collection.
#[derive(Debug)]
pub struct Dataset {
    /// Catalog key of the image collection.
    pub catalog_key: &'static str,
    /// Human-readable dataset title.
    pub title: &'static str,
    /// Calibration offset `k` in `gamma0 = 10*log10(DN^2) - k`, per the
    /// provider's calibration documentation.
    pub calibration_offset: f64,
    /// Polarization channels this dataset distributes.
    pub channels: &'static [Polarization],
    /// Native pixel spacing in meters.
    pub pixel_spacing_m: f64,
}

/// All SAR collections supported for compositing.
///
/// Sources:
///   - Catalog keys: the hosting platform's public dataset catalog
///   - Calibration offsets: JAXA PALSAR-2 product description (gamma0
///     conversion for 16-bit DN products)
pub static DATASET_REGISTRY: &[Dataset] = &[
    Dataset {
        catalog_key: "JAXA/ALOS/PALSAR-2/Level2_2/ScanSAR",
        title: "ALOS-2 PALSAR-2 ScanSAR Level 2.2",
        calibration_offset: 83.0,
        channels: &[Polarization::HH, Polarization::HV],
        pixel_spacing_m: 25.0,
    },
];

/// Looks up a dataset by catalog key. Returns `None` if not found.
pub fn find_dataset(catalog_key: &str) -> Option<&'static Dataset> {
    DATASET_REGISTRY.iter().find(|d| d.catalog_key == catalog_key)
}

/// Returns catalog keys for all registered datasets.
pub fn all_catalog_keys() -> Vec<&'static str> {
    DATASET_REGISTRY.iter().map(|d| d.catalog_key).collect()
}

/// Checks whether a dataset distributes a given polarization channel.
pub fn dataset_has_channel(catalog_key: &str, pol: Polarization) -> bool {
    find_dataset(catalog_key)
        .map(|d| d.channels.contains(&pol))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
