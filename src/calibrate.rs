/// DN to gamma0 (dB) calibration.
///
/// ScanSAR L2.2 products distribute raw 16-bit digital numbers; calibrated
/// backscatter is `gamma0 = 10*log10(DN^2) - k` with the offset `k` taken
/// from the dataset registry (83.0 for PALSAR-2). The conversion is a pure
/// function of the DN value and never inspects acquisition metadata.
///
/// DN = 0 calibrates to -inf dB and propagates as such — the reference
/// calibration does not clamp it, and neither does this module. NaN input
/// (no data) stays NaN.

use ndarray::Array2;

use crate::model::Polarization;

// ---------------------------------------------------------------------------
// Scalar calibration
// ---------------------------------------------------------------------------

/// Calibrate a single digital-number value to gamma0 in dB.
pub fn gamma0_db(dn: f32, offset: f64) -> f32 {
    if dn.is_nan() {
        return f32::NAN;
    }
    // 10*log10(dn^2) == 20*log10(|dn|); written as the reference formula.
    let dn = dn as f64;
    (10.0 * (dn * dn).log10() - offset) as f32
}

// ---------------------------------------------------------------------------
// Grid calibration
// ---------------------------------------------------------------------------

/// A calibrated backscatter grid with its band name (`HH_db` / `HV_db`).
#[derive(Debug, Clone)]
pub struct CalibratedBand {
    pub band: String,
    pub db: Array2<f32>,
}

/// Calibrate a DN grid for one polarization channel.
///
/// The polarization only names the output band; which DN grid is passed in
/// is the caller's (the ingest step's) responsibility.
pub fn calibrate_grid(dn: &Array2<f32>, pol: Polarization, offset: f64) -> CalibratedBand {
    CalibratedBand {
        band: pol.db_band_name(),
        db: dn.mapv(|v| gamma0_db(v, offset)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
