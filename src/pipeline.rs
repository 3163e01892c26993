/// The seasonal composite pipeline.
///
/// One run is a strictly sequential build → submit → await chain: build the
/// catalog search, await the scene list, fetch the scene grids, then
/// evaluate calibration, season partitioning, median reduction, and the
/// delta locally, render the three layers, and report the contributing
/// scenes. Any failure anywhere is fatal to the run — there is no retry
/// and no partial output.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;

use crate::calibrate::calibrate_grid;
use crate::composite::{self, Composite};
use crate::config::PipelineConfig;
use crate::ingest::{catalog, grid};
use crate::logging::{self, Source};
use crate::model::{CatalogError, Scene, SceneMeta, BAND_DELTA, BAND_DRY, BAND_WET};
use crate::render::{self, MapView, VIS_DB, VIS_DELTA};
use crate::report;
use crate::seasons::{self, Season};

/// Per-request timeout for catalog and asset fetches.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The three rasters of one evaluated run.
#[derive(Debug)]
pub struct SeasonalComposites {
    pub wet: Composite,
    pub dry: Composite,
    pub delta: Composite,
}

/// Everything a completed run produced.
pub struct PipelineOutput {
    pub composites: SeasonalComposites,
    pub wet_ids: Vec<String>,
    pub dry_ids: Vec<String>,
    pub layer_paths: Vec<PathBuf>,
    pub manifest_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Scene acquisition
// ---------------------------------------------------------------------------

/// Fetch the DN grid for every scene of the collection, in catalog order.
///
/// All grids of a run must share dimensions (the collection tiles onto one
/// grid); the first scene fixes the expected shape.
pub fn fetch_scenes(
    client: &reqwest::blocking::Client,
    config: &PipelineConfig,
    metas: Vec<SceneMeta>,
) -> Result<Vec<Scene>, CatalogError> {
    let mut scenes: Vec<Scene> = Vec::with_capacity(metas.len());
    let mut expected_shape: Option<(usize, usize)> = None;

    for meta in metas {
        let dn = grid::fetch_scene_grid(client, &meta, config.polarization, &config.aoi)?;

        match expected_shape {
            None => expected_shape = Some(dn.dim()),
            Some(shape) if dn.dim() != shape => {
                return Err(CatalogError::GridShapeMismatch {
                    scene_id: meta.id,
                    expected: shape,
                    got: dn.dim(),
                });
            }
            Some(_) => {}
        }

        logging::debug(
            Source::Scene,
            Some(&meta.id),
            &format!("fetched {}x{} DN grid", dn.dim().0, dn.dim().1),
        );
        scenes.push(Scene { meta, dn });
    }

    logging::log_fetch_summary(Source::Scene, scenes.len(), scenes.len(), 0);
    Ok(scenes)
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Calibrate, partition, reduce, and subtract — the local half of the
/// pipeline, separated from HTTP so it can be exercised directly.
pub fn evaluate(
    config: &PipelineConfig,
    scenes: &[Scene],
) -> Result<SeasonalComposites, CatalogError> {
    let shape = scenes
        .first()
        .map(|s| s.dn.dim())
        .ok_or_else(|| CatalogError::EmptyCollection {
            collection: config.dataset.catalog_key.to_string(),
        })?;

    let wet = reduce_season(config, scenes, Season::Wet, BAND_WET, shape)?;
    let dry = reduce_season(config, scenes, Season::Dry, BAND_DRY, shape)?;
    let delta = composite::delta(BAND_DELTA, &wet, &dry)?;

    Ok(SeasonalComposites { wet, dry, delta })
}

/// Calibrate one season's partition and reduce it to its median composite.
fn reduce_season(
    config: &PipelineConfig,
    scenes: &[Scene],
    season: Season,
    band: &str,
    shape: (usize, usize),
) -> Result<Composite, CatalogError> {
    let partition = seasons::partition(scenes, season);
    let calibrated: Vec<_> = partition
        .iter()
        .map(|s| calibrate_grid(&s.dn, config.polarization, config.dataset.calibration_offset).db)
        .collect();
    let grids: Vec<_> = calibrated.iter().collect();
    let ids: Vec<&str> = partition.iter().map(|s| s.meta.id.as_str()).collect();

    let reduced = composite::median_composite(band, &grids, &ids, shape)?;
    logging::info(
        Source::Engine,
        None,
        &format!(
            "{}: {} scenes, {:.1}% coverage",
            band,
            partition.len(),
            reduced.coverage() * 100.0
        ),
    );
    Ok(reduced)
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

/// Execute one configured run end to end.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput, Box<dyn Error>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    // 1. Acquire the filtered collection.
    logging::info(
        Source::Catalog,
        Some(config.dataset.catalog_key),
        &format!(
            "searching {} over {} for {}",
            config.endpoint,
            config.window.stac_interval(),
            config.polarization
        ),
    );
    let metas = catalog::fetch_collection(
        &client,
        &config.endpoint,
        config.dataset.catalog_key,
        &config.aoi,
        &config.window,
    )?;
    logging::info(
        Source::Catalog,
        Some(config.dataset.catalog_key),
        &format!("{} scenes in collection", metas.len()),
    );

    // 2. Tag each scene with its acquisition month.
    let metas: Vec<SceneMeta> = metas.into_iter().map(seasons::tag_month).collect();

    // 3.-6. Fetch grids, then calibrate / partition / reduce / subtract.
    let scenes = fetch_scenes(&client, config, metas)?;
    let composites = evaluate(config, &scenes)?;

    // 7. Render the layers and the map manifest.
    let mut view = MapView::centered_on(&config.aoi);
    let mut layer_paths = Vec::with_capacity(3);
    for (comp, vis) in [
        (&composites.wet, VIS_DB),
        (&composites.dry, VIS_DB),
        (&composites.delta, VIS_DELTA),
    ] {
        let path = render::write_layer(comp, &vis, &config.output_dir)?;
        logging::info(Source::Render, Some(&comp.band), &format!("wrote {}", path.display()));
        view.add_layer(&comp.band, &path, vis);
        layer_paths.push(path);
    }
    let manifest_path = view.write_manifest(&config.output_dir)?;

    // 8. Report contributing scenes.
    let wet_partition = seasons::partition(&scenes, Season::Wet);
    let dry_partition = seasons::partition(&scenes, Season::Dry);
    report::print_season_ids(Season::Wet, &wet_partition);
    report::print_season_ids(Season::Dry, &dry_partition);

    let record = report::EvidenceRecord::new(config, &wet_partition, &dry_partition, Utc::now());
    report::log_evidence(&config.evidence_log, &record)?;

    Ok(PipelineOutput {
        wet_ids: report::contributing_ids(&wet_partition),
        dry_ids: report::contributing_ids(&dry_partition),
        composites,
        layer_paths,
        manifest_path,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
