/// Scene DN asset fetch and decode.
///
/// L2.2 ScanSAR tiles are distributed as single-band GeoTIFFs of 16-bit
/// digital numbers on a fixed north-up grid. This module downloads the
/// asset for the configured polarization, decodes it, and crops it to the
/// AOI window. Cells of the AOI window not covered by the scene footprint
/// are NaN (no data).
///
/// All scenes of one collection tile onto the same grid, so the AOI window
/// has the same dimensions for every scene; the compositor verifies that
/// invariant and fails the run on a mismatch.

use std::io::Cursor;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::model::{Aoi, CatalogError, Polarization, SceneMeta};

// ============================================================================
// Geotransform
// ============================================================================

/// North-up affine georeferencing of a decoded grid.
/// World x = origin_x + col * pixel_width; world y = origin_y + row * pixel_height
/// with pixel_height negative (row 0 is the northern edge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

// ============================================================================
// Fetch
// ============================================================================

/// Download and decode the DN grid of one scene for one channel, cropped
/// to the AOI. Assets without georeferencing tags are used whole.
pub fn fetch_scene_grid(
    client: &reqwest::blocking::Client,
    meta: &SceneMeta,
    pol: Polarization,
    aoi: &Aoi,
) -> Result<Array2<f32>, CatalogError> {
    let href = meta.asset_href(pol).ok_or_else(|| CatalogError::MissingAsset {
        scene_id: meta.id.clone(),
        channel: pol.band_name().to_string(),
    })?;

    let response = client
        .get(href)
        .send()
        .map_err(|e| CatalogError::ParseError(format!("asset request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(CatalogError::HttpError(response.status().as_u16()));
    }

    let bytes = response
        .bytes()
        .map_err(|e| CatalogError::ParseError(format!("asset read failed: {}", e)))?;

    let (grid, transform) = decode_dn_geotiff(&bytes)?;
    match transform {
        Some(gt) => Ok(crop_to_aoi(&grid, &gt, aoi)),
        None => Ok(grid),
    }
}

// ============================================================================
// Decode
// ============================================================================

/// Decode a single-band DN GeoTIFF from an in-memory buffer.
///
/// Integer sample formats are widened to f32; the raw DN values are kept
/// exactly (calibration happens later and DN = 0 must stay 0 here).
pub fn decode_dn_geotiff(data: &[u8]) -> Result<(Array2<f32>, Option<GeoTransform>), CatalogError> {
    let mut decoder = Decoder::new(Cursor::new(data))
        .map_err(|e| CatalogError::ParseError(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| CatalogError::ParseError(format!("cannot read TIFF dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| CatalogError::ParseError(format!("cannot read TIFF data: {}", e)))?;

    let data: Vec<f32> = match result {
        DecodingResult::U8(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::U16(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::U32(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::I8(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::I16(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::I32(buf) => buf.iter().map(|&v| v as f32).collect(),
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.iter().map(|&v| v as f32).collect(),
        _ => {
            return Err(CatalogError::ParseError(
                "unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(CatalogError::ParseError(format!(
            "TIFF data length {} does not match {}x{}",
            data.len(),
            rows,
            cols
        )));
    }

    let grid = Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| CatalogError::ParseError(e.to_string()))?;

    Ok((grid, read_geotransform(&mut decoder)))
}

/// Attempt to read the geotransform from GeoTIFF tags
/// (ModelPixelScaleTag = 33550, ModelTiepointTag = 33922).
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];

    Some(GeoTransform {
        origin_x,
        origin_y,
        pixel_width: scale[0],
        pixel_height: -scale[1], // negative for north-up
    })
}

// ============================================================================
// AOI crop
// ============================================================================

/// Cut the AOI window out of a georeferenced grid.
///
/// The output covers exactly the AOI rectangle at the grid's resolution;
/// window cells outside the source grid are NaN. Because every scene of a
/// collection shares the same tiling grid, the window dimensions are
/// identical across scenes of one run.
pub fn crop_to_aoi(grid: &Array2<f32>, gt: &GeoTransform, aoi: &Aoi) -> Array2<f32> {
    let px_w = gt.pixel_width;
    let px_h = gt.pixel_height; // negative

    // AOI window in pixel space. Row 0 is the grid's northern edge.
    let col0 = ((aoi.west - gt.origin_x) / px_w).floor() as i64;
    let row0 = ((aoi.north - gt.origin_y) / px_h).floor() as i64;
    let out_cols = ((aoi.east - aoi.west) / px_w).round().max(1.0) as usize;
    let out_rows = ((aoi.south - aoi.north) / px_h).round().max(1.0) as usize;

    let (rows, cols) = grid.dim();
    let mut out = Array2::from_elem((out_rows, out_cols), f32::NAN);

    for out_r in 0..out_rows {
        let src_r = row0 + out_r as i64;
        if src_r < 0 || src_r >= rows as i64 {
            continue;
        }
        for out_c in 0..out_cols {
            let src_c = col0 + out_c as i64;
            if src_c < 0 || src_c >= cols as i64 {
                continue;
            }
            out[[out_r, out_c]] = grid[[src_r as usize, src_c as usize]];
        }
    }

    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// 1-degree pixels, origin at (-60, 0), north-up.
    fn unit_transform() -> GeoTransform {
        GeoTransform {
            origin_x: -60.0,
            origin_y: 0.0,
            pixel_width: 1.0,
            pixel_height: -1.0,
        }
    }

    fn counting_grid(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f32)
    }

    #[test]
    fn test_crop_inside_grid() {
        // Grid covers lon [-60,-50), lat (-10, 0]; crop lon [-58,-55), lat [-4,-1).
        let grid = counting_grid(10, 10);
        let aoi = Aoi::new(-58.0, -4.0, -55.0, -1.0).unwrap();
        let out = crop_to_aoi(&grid, &unit_transform(), &aoi);

        assert_eq!(out.dim(), (3, 3));
        // North-west AOI corner: lat -1 → row 1, lon -58 → col 2.
        assert_eq!(out[[0, 0]], grid[[1, 2]]);
        assert_eq!(out[[2, 2]], grid[[3, 4]]);
        assert!(out.iter().all(|v| !v.is_nan()), "fully covered window has no gaps");
    }

    #[test]
    fn test_crop_pads_outside_footprint_with_nodata() {
        // AOI extends 2 degrees west of the grid.
        let grid = counting_grid(10, 10);
        let aoi = Aoi::new(-62.0, -3.0, -58.0, -1.0).unwrap();
        let out = crop_to_aoi(&grid, &unit_transform(), &aoi);

        assert_eq!(out.dim(), (2, 4));
        assert!(out[[0, 0]].is_nan(), "west of the footprint is no-data");
        assert!(out[[0, 1]].is_nan());
        assert!(!out[[0, 2]].is_nan(), "covered cells carry DN values");
        assert!(!out[[0, 3]].is_nan());
    }

    #[test]
    fn test_crop_window_shape_is_aoi_times_resolution() {
        let grid = counting_grid(100, 100);
        let gt = GeoTransform {
            origin_x: -57.5,
            origin_y: -0.5,
            pixel_width: 0.25,
            pixel_height: -0.25,
        };
        let aoi = Aoi::new(-57.0, -3.0, -54.0, -1.0).unwrap();
        let out = crop_to_aoi(&grid, &gt, &aoi);
        // 3 degrees / 0.25 = 12 cols, 2 degrees / 0.25 = 8 rows.
        assert_eq!(out.dim(), (8, 12));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_dn_geotiff(b"not a tiff at all").unwrap_err();
        assert!(matches!(err, CatalogError::ParseError(_)));
    }

    #[test]
    fn test_decode_roundtrip_u16_dn_tile() {
        // Encode a tiny DN tile the way the provider does (u16, gray),
        // then decode it back.
        use tiff::encoder::{colortype, TiffEncoder};

        let mut buf = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            let image = encoder.new_image::<colortype::Gray16>(3, 2).unwrap();
            image.write_data(&[0u16, 1, 10, 100, 1000, 65535]).unwrap();
        }

        let (grid, gt) = decode_dn_geotiff(&buf).unwrap();
        assert_eq!(grid.dim(), (2, 3));
        assert_eq!(grid[[0, 0]], 0.0, "DN 0 must survive decoding untouched");
        assert_eq!(grid[[0, 2]], 10.0);
        assert_eq!(grid[[1, 2]], 65535.0);
        assert!(gt.is_none(), "plain TIFF has no geotransform tags");
    }
}
