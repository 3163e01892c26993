/// Map layer rendering.
///
/// The original analysis pushed its three rasters onto a hosted interactive
/// map with fixed display ranges. The batch restatement renders each
/// composite to an 8-bit grayscale PNG (no-data transparent) and writes a
/// `map.json` manifest carrying the same contract the script passed to the
/// map widget: layer names, display ranges, AOI center, and zoom level.
///
/// Display scaling clamps to the configured range — this is presentation
/// only and never feeds back into the composites, where -inf and out-of-
/// range values survive untouched.

use std::error::Error;
use std::path::{Path, PathBuf};

use image::{GrayAlphaImage, LumaA};
use serde::Serialize;

use crate::composite::Composite;
use crate::model::Aoi;

/// Zoom level used when centering the map on the AOI.
pub const MAP_ZOOM: u8 = 8;

/// Display range for the wet and dry composites, in dB.
pub const VIS_DB: VisParams = VisParams { min: -20.0, max: 5.0 };

/// Display range for the delta layer, in dB.
pub const VIS_DELTA: VisParams = VisParams { min: -5.0, max: 5.0 };

// ---------------------------------------------------------------------------
// Display scaling
// ---------------------------------------------------------------------------

/// Fixed min/max display stretch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisParams {
    pub min: f64,
    pub max: f64,
}

impl VisParams {
    /// Map a dB value to an 8-bit display value. Values outside the range
    /// clamp to the endpoints; no-data (NaN) has no display value.
    pub fn scale(&self, v: f32) -> Option<u8> {
        if v.is_nan() {
            return None;
        }
        let t = ((v as f64 - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        Some((t * 255.0).round() as u8)
    }
}

/// Render one composite as grayscale-with-alpha, no-data transparent.
pub fn render_layer(composite: &Composite, vis: &VisParams) -> GrayAlphaImage {
    let (rows, cols) = composite.grid.dim();
    let mut img = GrayAlphaImage::new(cols as u32, rows as u32);
    for ((row, col), &v) in composite.grid.indexed_iter() {
        let px = match vis.scale(v) {
            Some(gray) => LumaA([gray, 255]),
            None => LumaA([0, 0]),
        };
        img.put_pixel(col as u32, row as u32, px);
    }
    img
}

/// Render a composite and write it as `<band>.png` under `dir`.
pub fn write_layer(
    composite: &Composite,
    vis: &VisParams,
    dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.png", composite.band));
    render_layer(composite, vis).save(&path)?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Map manifest
// ---------------------------------------------------------------------------

/// One rendered layer as listed in the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct LayerEntry {
    pub name: String,
    pub file: String,
    pub vis: VisParams,
}

/// The map-view contract: center, zoom, and layer list.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    /// (longitude, latitude) the map is centered on.
    pub center: (f64, f64),
    pub zoom: u8,
    pub layers: Vec<LayerEntry>,
}

impl MapView {
    /// A view centered on the AOI at the fixed zoom level.
    pub fn centered_on(aoi: &Aoi) -> Self {
        Self {
            center: aoi.center(),
            zoom: MAP_ZOOM,
            layers: Vec::new(),
        }
    }

    /// Record a rendered layer.
    pub fn add_layer(&mut self, name: &str, file: &Path, vis: VisParams) {
        self.layers.push(LayerEntry {
            name: name.to_string(),
            file: file
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default(),
            vis,
        });
    }

    /// Write the manifest as `map.json` under `dir`.
    pub fn write_manifest(&self, dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("map.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
