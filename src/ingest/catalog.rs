/// STAC catalog client for scene discovery.
///
/// Submits an Item Search (POST /search) filtered spatially to the AOI and
/// temporally to the configured window, and parses the response into scene
/// metadata. The catalog decides result ordering; this module preserves it
/// and never sorts.
///
/// STAC API reference: https://github.com/radiantearth/stac-api-spec

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Aoi, CatalogError, SceneMeta, TimeWindow};
use crate::seasons;

/// Items requested per search. The catalogs serving ScanSAR tiles return a
/// decade of scenes for a ~100 km AOI well under this.
const SEARCH_LIMIT: u32 = 500;

// ============================================================================
// Search Request
// ============================================================================

/// Body for `POST /search` (STAC API Item Search).
#[derive(Debug, Clone, Serialize)]
pub struct SearchBody {
    pub bbox: [f64; 4],
    /// Datetime interval, e.g. "2015-01-01/2025-01-01".
    pub datetime: String,
    pub collections: Vec<String>,
    pub limit: u32,
}

/// Full `POST /search` URL for a catalog endpoint root.
pub fn build_search_url(endpoint: &str) -> String {
    format!("{}/search", endpoint.trim_end_matches('/'))
}

/// Search body for one collection over an AOI and time window.
pub fn build_search_body(collection: &str, aoi: &Aoi, window: &TimeWindow) -> SearchBody {
    SearchBody {
        bbox: aoi.bbox(),
        datetime: window.stac_interval(),
        collections: vec![collection.to_string()],
        limit: SEARCH_LIMIT,
    }
}

// ============================================================================
// Search Response Structures
// ============================================================================

/// Item Search response (GeoJSON FeatureCollection).
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub features: Vec<StacItem>,
    /// Total matches, when the catalog reports it.
    #[serde(rename = "numberMatched")]
    pub number_matched: Option<u64>,
}

/// One catalog item (scene).
#[derive(Debug, Deserialize)]
pub struct StacItem {
    pub id: String,
    pub properties: ItemProperties,
    /// Asset name → asset, e.g. "HH" → the HH DN GeoTIFF.
    pub assets: BTreeMap<String, ItemAsset>,
}

#[derive(Debug, Deserialize)]
pub struct ItemProperties {
    /// Acquisition timestamp, RFC 3339.
    pub datetime: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemAsset {
    pub href: String,
}

// ============================================================================
// Fetch + Parse
// ============================================================================

/// Fetch the scene list for one collection, AOI, and window.
///
/// Any HTTP or decode failure is fatal; there is no retry. An empty result
/// is reported as `EmptyCollection` because every downstream composite
/// would be no-data everywhere.
pub fn fetch_collection(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    collection: &str,
    aoi: &Aoi,
    window: &TimeWindow,
) -> Result<Vec<SceneMeta>, CatalogError> {
    let url = build_search_url(endpoint);
    let body = build_search_body(collection, aoi, window);

    let response = client
        .post(&url)
        .json(&body)
        .header("Accept", "application/geo+json")
        .send()
        .map_err(|e| CatalogError::ParseError(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(CatalogError::HttpError(response.status().as_u16()));
    }

    let parsed: SearchResponse = response
        .json()
        .map_err(|e| CatalogError::ParseError(e.to_string()))?;

    parse_search_response(parsed, collection)
}

/// Convert a search response into scene metadata, in catalog order.
pub fn parse_search_response(
    response: SearchResponse,
    collection: &str,
) -> Result<Vec<SceneMeta>, CatalogError> {
    if let Some(matched) = response.number_matched {
        if matched > response.features.len() as u64 {
            crate::logging::warn(
                crate::logging::Source::Catalog,
                Some(collection),
                &format!(
                    "catalog matched {} scenes but returned {}; composite uses the returned page",
                    matched,
                    response.features.len()
                ),
            );
        }
    }

    let mut scenes = Vec::with_capacity(response.features.len());
    for item in response.features {
        scenes.push(parse_item(item)?);
    }

    if scenes.is_empty() {
        return Err(CatalogError::EmptyCollection {
            collection: collection.to_string(),
        });
    }

    Ok(scenes)
}

fn parse_item(item: StacItem) -> Result<SceneMeta, CatalogError> {
    let acquired: DateTime<Utc> = DateTime::parse_from_rfc3339(&item.properties.datetime)
        .map_err(|e| {
            CatalogError::ParseError(format!("scene {}: bad datetime: {}", item.id, e))
        })?
        .with_timezone(&Utc);

    let assets = item
        .assets
        .into_iter()
        .map(|(name, asset)| (name, asset.href))
        .collect();

    Ok(SceneMeta {
        id: item.id,
        acquired,
        month: seasons::month_of(acquired),
        assets,
    })
}

// ============================================================================
// Tests
// ============================================================================
