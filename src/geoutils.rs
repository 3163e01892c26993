/// Geographic helpers for AOI construction.

use crate::model::Aoi;

/// Meters per degree of latitude (spherical approximation).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Rough AOI from a center point and half-size in meters (WGS84 degrees).
/// Good enough for ~100 km AOIs; the longitude half-width inflates with
/// latitude by 1/cos(lat).
pub fn bbox_from_center(lat: f64, lon: f64, half_size_m: f64) -> Result<Aoi, String> {
    let dlat = half_size_m / METERS_PER_DEGREE;
    let dlon = half_size_m / (METERS_PER_DEGREE * lat.to_radians().cos());
    Aoi::new(lon - dlon, lat - dlat, lon + dlon, lat + dlat)
}
