/// Offline end-to-end tests for the seasonal composite pipeline.
///
/// These tests exercise the full local evaluation chain — calibration,
/// season partitioning, median reduction, delta, rendering, reporting —
/// over synthetic scenes, without touching the network. The live catalog
/// checks live in tests/catalog_integration.rs and are ignored by default.

use chrono::{TimeZone, Utc};
use ndarray::Array2;

use sarcomp::config::{parse_config, PipelineConfig};
use sarcomp::ingest::grid;
use sarcomp::model::{Aoi, Polarization, Scene, SceneMeta};
use sarcomp::pipeline;
use sarcomp::render;
use sarcomp::report;
use sarcomp::seasons::{self, Season};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn config_with_polarization(pol: &str) -> PipelineConfig {
    parse_config(&format!(
        r#"
            [aoi]
            west = -57.0
            south = -3.0
            east = -54.0
            north = -1.0

            [window]
            start = "2015-01-01"
            end = "2025-01-01"

            [collection]
            dataset = "JAXA/ALOS/PALSAR-2/Level2_2/ScanSAR"
            endpoint = "https://catalog.example.org/api/v1"
            polarization = "{pol}"

            [output]
            dir = "map_layers"
            evidence_log = "logs/evidence_log.jsonl"
        "#
    ))
    .expect("test config should be valid")
}

/// A synthetic scene with a uniform DN grid, acquired mid-month in 2020.
fn scene(id: &str, month: u32, dn: f32, shape: (usize, usize)) -> Scene {
    Scene {
        meta: seasons::tag_month(SceneMeta {
            id: id.to_string(),
            acquired: Utc.with_ymd_and_hms(2020, month, 15, 2, 30, 0).unwrap(),
            month: 0,
            assets: Vec::new(),
        }),
        dn: Array2::from_elem(shape, dn),
    }
}

// ---------------------------------------------------------------------------
// The reference end-to-end scenario
// ---------------------------------------------------------------------------

#[test]
fn test_single_wet_scene_reference_scenario() {
    // One scene dated 2020-01-15 (wet season) with DN = 10 for HH across
    // the AOI: wet_db must be -63 dB at the footprint, dry_db no-data
    // everywhere, delta_db no-data everywhere.
    let config = config_with_polarization("HH");
    let scenes = vec![scene("ALOS2-2020-01-15", 1, 10.0, (4, 6))];

    let out = pipeline::evaluate(&config, &scenes).expect("evaluation should succeed");

    assert!(
        out.wet.grid.iter().all(|v| (v - (-63.0)).abs() < 1e-4),
        "wet composite must be -63 dB across the scene footprint"
    );
    assert!(
        out.dry.grid.iter().all(|v| v.is_nan()),
        "dry composite has no contributing scenes and must be no-data everywhere"
    );
    assert!(
        out.delta.grid.iter().all(|v| v.is_nan()),
        "delta with a no-data dry operand must be no-data everywhere"
    );

    // The report side of the same run.
    let wet_partition = seasons::partition(&scenes, Season::Wet);
    let dry_partition = seasons::partition(&scenes, Season::Dry);
    assert_eq!(report::contributing_ids(&wet_partition), vec!["ALOS2-2020-01-15"]);
    assert!(report::contributing_ids(&dry_partition).is_empty());
}

#[test]
fn test_wet_minus_dry_delta_over_mixed_year() {
    // Wet scenes brighter than dry scenes by a known margin: DN 20 vs 10
    // is 10*log10(400) - 10*log10(100) = +6.02 dB.
    let config = config_with_polarization("HH");
    let scenes = vec![
        scene("wet-jan", 1, 20.0, (3, 3)),
        scene("wet-dec", 12, 20.0, (3, 3)),
        scene("dry-jul", 7, 10.0, (3, 3)),
        scene("dry-sep", 9, 10.0, (3, 3)),
    ];

    let out = pipeline::evaluate(&config, &scenes).unwrap();

    let expected = 10.0 * (400.0f64).log10() - 10.0 * (100.0f64).log10();
    assert!(
        out.delta.grid.iter().all(|v| (*v as f64 - expected).abs() < 1e-4),
        "delta must be wet - dry = {expected:.2} dB everywhere"
    );
}

#[test]
fn test_zero_dn_propagates_to_negative_infinity() {
    // A lone wet scene of DN 0: the composite is -inf, not clamped and
    // not no-data.
    let config = config_with_polarization("HH");
    let scenes = vec![
        scene("wet-zero", 2, 0.0, (2, 2)),
        scene("dry-ten", 8, 10.0, (2, 2)),
    ];

    let out = pipeline::evaluate(&config, &scenes).unwrap();
    assert!(
        out.wet.grid.iter().all(|v| v.is_infinite() && *v < 0.0),
        "DN 0 must surface as -inf dB in the composite"
    );
    // -inf - (-63) = -inf: the delta keeps the sentinel where it is defined.
    assert!(out.delta.grid.iter().all(|v| v.is_infinite() && *v < 0.0));
}

// ---------------------------------------------------------------------------
// Step independence
// ---------------------------------------------------------------------------

#[test]
fn test_polarization_choice_does_not_affect_partitioning() {
    // Changing the polarization changes which raw band is calibrated, but
    // must leave month tagging and season membership untouched.
    let scenes = vec![
        scene("a", 1, 10.0, (2, 2)),
        scene("b", 7, 10.0, (2, 2)),
        scene("c", 12, 10.0, (2, 2)),
    ];

    let out_hh = pipeline::evaluate(&config_with_polarization("HH"), &scenes).unwrap();
    let out_hv = pipeline::evaluate(&config_with_polarization("HV"), &scenes).unwrap();

    let wet = seasons::partition(&scenes, Season::Wet);
    let dry = seasons::partition(&scenes, Season::Dry);
    assert_eq!(wet.len(), 2);
    assert_eq!(dry.len(), 1);

    // Same synthetic DN grids on both channels → identical composites;
    // the composite band names never depend on the channel either.
    assert_eq!(out_hh.wet.band, out_hv.wet.band);
    assert_eq!(out_hh.wet.grid, out_hv.wet.grid);
    assert_eq!(out_hh.delta.grid, out_hv.delta.grid);
}

// ---------------------------------------------------------------------------
// From GeoTIFF bytes to composites
// ---------------------------------------------------------------------------

/// Encode a georeferenced u16 DN tile covering lon [-58, -53), lat [-4, 1)
/// at 1-degree pixels, the shape the asset fetcher sees on the wire.
fn encode_dn_tile(dn: u16) -> Vec<u8> {
    use tiff::encoder::{colortype, TiffEncoder};
    use tiff::tags::Tag;

    let (rows, cols) = (5usize, 5usize);
    let mut buf = Vec::new();
    {
        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buf)).unwrap();
        let mut image = encoder
            .new_image::<colortype::Gray16>(cols as u32, rows as u32)
            .unwrap();
        // ModelPixelScaleTag + ModelTiepointTag: origin (-58, 1), 1-degree pixels.
        image
            .encoder()
            .write_tag(Tag::Unknown(33550), [1.0f64, 1.0, 0.0].as_slice())
            .unwrap();
        image
            .encoder()
            .write_tag(
                Tag::Unknown(33922),
                [0.0f64, 0.0, 0.0, -58.0, 1.0, 0.0].as_slice(),
            )
            .unwrap();
        image.write_data(&vec![dn; rows * cols]).unwrap();
    }
    buf
}

#[test]
fn test_geotiff_tile_decodes_crops_and_composites() {
    let config = config_with_polarization("HH");

    let bytes = encode_dn_tile(10);
    let (full, gt) = grid::decode_dn_geotiff(&bytes).expect("tile should decode");
    assert_eq!(full.dim(), (5, 5));
    let gt = gt.expect("tile carries geotransform tags");
    assert_eq!(gt.pixel_width, 1.0);
    assert_eq!(gt.origin_x, -58.0);

    // AOI lon [-57,-54), lat [-3,-1): fully inside the tile.
    let cropped = grid::crop_to_aoi(&full, &gt, &config.aoi);
    assert_eq!(cropped.dim(), (2, 3));
    assert!(cropped.iter().all(|v| *v == 10.0));

    let scenes = vec![Scene {
        meta: seasons::tag_month(SceneMeta {
            id: "tile-wet".to_string(),
            acquired: Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap(),
            month: 0,
            assets: Vec::new(),
        }),
        dn: cropped,
    }];

    let out = pipeline::evaluate(&config, &scenes).unwrap();
    assert!(out.wet.grid.iter().all(|v| (v - (-63.0)).abs() < 1e-4));
}

// ---------------------------------------------------------------------------
// Rendering and evidence output
// ---------------------------------------------------------------------------

#[test]
fn test_layers_manifest_and_evidence_for_one_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_polarization("HH");
    config.output_dir = dir.path().join("map_layers");
    config.evidence_log = dir.path().join("logs/evidence_log.jsonl");

    let scenes = vec![
        scene("wet-1", 1, 10.0, (2, 2)),
        scene("dry-1", 7, 10.0, (2, 2)),
    ];
    let out = pipeline::evaluate(&config, &scenes).unwrap();

    // Layers + manifest.
    let mut view = render::MapView::centered_on(&config.aoi);
    for (comp, vis) in [
        (&out.wet, render::VIS_DB),
        (&out.dry, render::VIS_DB),
        (&out.delta, render::VIS_DELTA),
    ] {
        let path = render::write_layer(comp, &vis, &config.output_dir).unwrap();
        view.add_layer(&comp.band, &path, vis);
    }
    let manifest = view.write_manifest(&config.output_dir).unwrap();

    for band in ["wet_db", "dry_db", "delta_db"] {
        assert!(
            config.output_dir.join(format!("{band}.png")).exists(),
            "layer {band}.png should exist"
        );
    }
    let manifest_json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(manifest).unwrap()).unwrap();
    assert_eq!(manifest_json["layers"].as_array().unwrap().len(), 3);
    assert_eq!(manifest_json["zoom"], 8);

    // Evidence record.
    let wet = seasons::partition(&scenes, Season::Wet);
    let dry = seasons::partition(&scenes, Season::Dry);
    let record = report::EvidenceRecord::new(
        &config,
        &wet,
        &dry,
        Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
    );
    report::log_evidence(&config.evidence_log, &record).unwrap();

    let line = std::fs::read_to_string(&config.evidence_log).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(parsed["wet_ids"][0], "wet-1");
    assert_eq!(parsed["dry_ids"][0], "dry-1");
    assert_eq!(parsed["polarization"], "HH");
}

// ---------------------------------------------------------------------------
// AOI construction helper
// ---------------------------------------------------------------------------

#[test]
fn test_bbox_from_center_builds_a_usable_aoi() {
    let aoi = sarcomp::geoutils::bbox_from_center(-2.0, -55.5, 100_000.0)
        .expect("center bbox should be valid");
    let (lon, lat) = aoi.center();
    assert!((lon - (-55.5)).abs() < 1e-9);
    assert!((lat - (-2.0)).abs() < 1e-9);
    assert!(Aoi::new(aoi.west, aoi.south, aoi.east, aoi.north).is_ok());
}

// ---------------------------------------------------------------------------
// Asset selection
// ---------------------------------------------------------------------------

#[test]
fn test_missing_channel_asset_is_detected_before_download() {
    // An HV-only scene cannot serve an HH run; the fetcher reports the
    // missing asset instead of issuing a request.
    let meta = SceneMeta {
        id: "hv-only".to_string(),
        acquired: Utc.with_ymd_and_hms(2020, 1, 15, 0, 0, 0).unwrap(),
        month: 1,
        assets: vec![("HV".to_string(), "https://x/hv.tif".to_string())],
    };
    assert!(meta.asset_href(Polarization::HH).is_none());
    assert_eq!(meta.asset_href(Polarization::HV), Some("https://x/hv.tif"));
}
