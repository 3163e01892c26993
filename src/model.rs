/// Core data types for the seasonal SAR composite pipeline.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond trivial accessors, no I/O, and no pipeline
/// state — only types.

use chrono::{DateTime, Utc};
use ndarray::Array2;

// ---------------------------------------------------------------------------
// Band naming
// ---------------------------------------------------------------------------

/// Suffix appended to a polarization channel name for its calibrated band,
/// e.g. `HH` → `HH_db`.
pub const DB_BAND_SUFFIX: &str = "_db";

/// Band name of the wet-season median composite.
pub const BAND_WET: &str = "wet_db";

/// Band name of the dry-season median composite.
pub const BAND_DRY: &str = "dry_db";

/// Band name of the wet-minus-dry delta raster.
pub const BAND_DELTA: &str = "delta_db";

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Rectangular area of interest in WGS84 degrees.
///
/// Invariant (enforced by `Aoi::new`): `west < east` and `south < north`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aoi {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Aoi {
    /// Construct an AOI, rejecting degenerate or inverted rectangles.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, String> {
        if !(west < east) {
            return Err(format!("AOI west ({west}) must be < east ({east})"));
        }
        if !(south < north) {
            return Err(format!("AOI south ({south}) must be < north ({north})"));
        }
        Ok(Self { west, south, east, north })
    }

    /// Center point as (longitude, latitude).
    pub fn center(&self) -> (f64, f64) {
        ((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }

    /// Bounding box in STAC order: `[west, south, east, north]`.
    pub fn bbox(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

/// Half-open calendar date window `[start, end)` bounding which scenes are
/// considered. Dates are ISO 8601 calendar dates ("2015-01-01").
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    /// Construct a window, rejecting `start >= end` (lexicographic order is
    /// chronological order for ISO 8601 calendar dates).
    pub fn new(start: &str, end: &str) -> Result<Self, String> {
        if start >= end {
            return Err(format!("time window start ({start}) must be before end ({end})"));
        }
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    /// STAC datetime interval string, e.g. `"2015-01-01/2025-01-01"`.
    pub fn stac_interval(&self) -> String {
        format!("{}/{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Polarization
// ---------------------------------------------------------------------------

/// ScanSAR L2.2 polarization channels. Selects which raw DN band is read
/// for calibration; it has no effect on month tagging or partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarization {
    HH,
    HV,
}

impl Polarization {
    /// Channel name as it appears in scene assets ("HH", "HV").
    pub fn band_name(&self) -> &'static str {
        match self {
            Polarization::HH => "HH",
            Polarization::HV => "HV",
        }
    }

    /// Calibrated band name for this channel ("HH_db", "HV_db").
    pub fn db_band_name(&self) -> String {
        format!("{}{}", self.band_name(), DB_BAND_SUFFIX)
    }
}

impl std::fmt::Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.band_name())
    }
}

impl std::str::FromStr for Polarization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HH" => Ok(Polarization::HH),
            "HV" => Ok(Polarization::HV),
            other => Err(format!("unknown polarization '{other}' (expected HH or HV)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Scene types
// ---------------------------------------------------------------------------

/// Metadata for one scene of the remote image collection.
///
/// Produced by `ingest::catalog::parse_search_response` from one STAC item,
/// with the calendar month derived from the scene's own acquisition
/// timestamp (never wall-clock time).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMeta {
    /// Unique scene identifier as assigned by the catalog.
    pub id: String,
    /// Acquisition timestamp.
    pub acquired: DateTime<Utc>,
    /// Calendar month 1-12 of `acquired`.
    pub month: u32,
    /// Asset href per channel name ("HH" → url). Channels the scene does
    /// not carry are simply absent.
    pub assets: Vec<(String, String)>,
}

impl SceneMeta {
    /// Asset href for a polarization channel, if the scene carries it.
    pub fn asset_href(&self, pol: Polarization) -> Option<&str> {
        self.assets
            .iter()
            .find(|(name, _)| name == pol.band_name())
            .map(|(_, href)| href.as_str())
    }
}

/// One scene with its fetched digital-number grid, cropped to the AOI.
///
/// `dn` uses NaN for cells with no data (outside the scene footprint or
/// missing in the asset). All scenes of one pipeline run share the same
/// grid dimensions.
#[derive(Debug, Clone)]
pub struct Scene {
    pub meta: SceneMeta,
    pub dn: Array2<f32>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when querying the catalog or fetching scene assets.
///
/// Every variant is fatal to the pipeline run; there is no retry or
/// recovery path (the failure semantics of the hosted-engine original).
#[derive(Debug, PartialEq)]
pub enum CatalogError {
    /// Non-2xx HTTP response from the catalog or asset host.
    HttpError(u16),
    /// The response body could not be deserialized or decoded.
    ParseError(String),
    /// The search returned no scenes for the AOI and time window.
    EmptyCollection { collection: String },
    /// A scene does not carry an asset for the requested channel.
    MissingAsset { scene_id: String, channel: String },
    /// Scene grids in one run must share dimensions.
    GridShapeMismatch {
        scene_id: String,
        expected: (usize, usize),
        got: (usize, usize),
    },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::HttpError(code) => write!(f, "HTTP error: {}", code),
            CatalogError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            CatalogError::EmptyCollection { collection } => {
                write!(f, "No scenes found in collection: {}", collection)
            }
            CatalogError::MissingAsset { scene_id, channel } => {
                write!(f, "Scene {} has no {} asset", scene_id, channel)
            }
            CatalogError::GridShapeMismatch { scene_id, expected, got } => {
                write!(
                    f,
                    "Scene {} grid is {}x{}, expected {}x{}",
                    scene_id, got.0, got.1, expected.0, expected.1
                )
            }
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_aoi_rejects_inverted_extents() {
        assert!(Aoi::new(-54.0, -3.0, -57.0, -1.0).is_err(), "west >= east must be rejected");
        assert!(Aoi::new(-57.0, -1.0, -54.0, -3.0).is_err(), "south >= north must be rejected");
        assert!(Aoi::new(-57.0, -3.0, -57.0, -1.0).is_err(), "zero-width AOI must be rejected");
    }

    #[test]
    fn test_aoi_center_and_bbox() {
        let aoi = Aoi::new(-57.0, -3.0, -54.0, -1.0).unwrap();
        assert_eq!(aoi.center(), (-55.5, -2.0));
        assert_eq!(aoi.bbox(), [-57.0, -3.0, -54.0, -1.0]);
    }

    #[test]
    fn test_time_window_rejects_reversed_dates() {
        assert!(TimeWindow::new("2025-01-01", "2015-01-01").is_err());
        assert!(TimeWindow::new("2015-01-01", "2015-01-01").is_err());
        let w = TimeWindow::new("2015-01-01", "2025-01-01").unwrap();
        assert_eq!(w.stac_interval(), "2015-01-01/2025-01-01");
    }

    #[test]
    fn test_polarization_parse_and_band_names() {
        assert_eq!("HH".parse::<Polarization>().unwrap(), Polarization::HH);
        assert_eq!("hv".parse::<Polarization>().unwrap(), Polarization::HV);
        assert!("VV".parse::<Polarization>().is_err());
        assert_eq!(Polarization::HH.db_band_name(), "HH_db");
        assert_eq!(Polarization::HV.db_band_name(), "HV_db");
    }

    #[test]
    fn test_scene_meta_asset_lookup() {
        let meta = SceneMeta {
            id: "ALOS2-scene-1".to_string(),
            acquired: Utc.with_ymd_and_hms(2020, 1, 15, 2, 30, 0).unwrap(),
            month: 1,
            assets: vec![("HH".to_string(), "https://example.org/hh.tif".to_string())],
        };
        assert_eq!(meta.asset_href(Polarization::HH), Some("https://example.org/hh.tif"));
        assert_eq!(meta.asset_href(Polarization::HV), None);
    }
}
