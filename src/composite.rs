/// Per-pixel median compositing and the wet-minus-dry delta.
///
/// The reducer works on calibrated dB grids of uniform dimensions. At each
/// pixel it takes the median of the non-NaN contributors: NaN means "no
/// data" and is skipped, while -inf (a DN of zero) is an ordinary ordered
/// value that participates. A pixel with zero contributors is NaN in the
/// composite; the pipeline does not special-case low scene counts.

use ndarray::Array2;

use crate::model::CatalogError;

// ---------------------------------------------------------------------------
// Composite raster
// ---------------------------------------------------------------------------

/// A named single-band raster produced by a reduction or subtraction.
#[derive(Debug, Clone)]
pub struct Composite {
    /// Band name (`wet_db`, `dry_db`, `delta_db`).
    pub band: String,
    pub grid: Array2<f32>,
}

impl Composite {
    /// Fraction of pixels that carry data (not NaN).
    pub fn coverage(&self) -> f64 {
        if self.grid.is_empty() {
            return 0.0;
        }
        let valid = self.grid.iter().filter(|v| !v.is_nan()).count();
        valid as f64 / self.grid.len() as f64
    }
}

// ---------------------------------------------------------------------------
// Median reduction
// ---------------------------------------------------------------------------

/// Median of the non-NaN values in `values`. Empty input (or all-NaN)
/// yields NaN. Even counts average the two middle values.
fn nan_median(values: &mut Vec<f32>) -> f32 {
    values.retain(|v| !v.is_nan());
    if values.is_empty() {
        return f32::NAN;
    }
    // No NaN left, so partial_cmp cannot fail; -inf sorts first.
    values.sort_by(|a, b| a.partial_cmp(b).expect("NaN filtered before sort"));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Reduce a stack of calibrated grids to their per-pixel median.
///
/// All grids must share dimensions; `scene_ids` is consulted only for the
/// shape-mismatch error message. An empty stack produces an all-NaN grid
/// of `shape` (median over zero scenes is "no data" everywhere).
pub fn median_composite(
    band: &str,
    grids: &[&Array2<f32>],
    scene_ids: &[&str],
    shape: (usize, usize),
) -> Result<Composite, CatalogError> {
    for (i, grid) in grids.iter().enumerate() {
        if grid.dim() != shape {
            return Err(CatalogError::GridShapeMismatch {
                scene_id: scene_ids.get(i).unwrap_or(&"?").to_string(),
                expected: shape,
                got: grid.dim(),
            });
        }
    }

    let mut out = Array2::from_elem(shape, f32::NAN);
    let mut stack: Vec<f32> = Vec::with_capacity(grids.len());
    for ((row, col), cell) in out.indexed_iter_mut() {
        stack.clear();
        stack.extend(grids.iter().map(|g| g[[row, col]]));
        *cell = nan_median(&mut stack);
    }

    Ok(Composite {
        band: band.to_string(),
        grid: out,
    })
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// Pixelwise `wet - dry`, band-named `band`. NaN in either operand
/// propagates to NaN in the result.
pub fn delta(band: &str, wet: &Composite, dry: &Composite) -> Result<Composite, CatalogError> {
    if wet.grid.dim() != dry.grid.dim() {
        return Err(CatalogError::GridShapeMismatch {
            scene_id: dry.band.clone(),
            expected: wet.grid.dim(),
            got: dry.grid.dim(),
        });
    }
    Ok(Composite {
        band: band.to_string(),
        grid: &wet.grid - &dry.grid,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
