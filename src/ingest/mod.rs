/// Ingest: everything that talks to the remote catalog.
///
/// Submodules:
/// - `catalog` — STAC item search (spatial + temporal filter) and response
///   parsing into scene metadata.
/// - `grid` — per-scene DN GeoTIFF asset download, decode, and AOI crop.

pub mod catalog;
pub mod grid;
