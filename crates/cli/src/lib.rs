//! Shared helpers for the GeoRAG CLI. The commands themselves live in `main.rs`.

use semantic_index::{Metadata, SearchHit};
use spatial_index::NearestFeature;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One line per raw search hit: `<id>  <score>  <title>`.
///
/// Hits without a usable title show as `Unknown`.
pub fn hit_line(hit: &SearchHit, meta: Option<&Metadata>) -> String {
    let title = meta
        .and_then(|m| m.get("title"))
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown");
    format!("{}  {:.4}  {}", hit.id, hit.score, title)
}

/// `<name> (<planar distance>, <km> km)`.
pub fn nearest_line(hit: &NearestFeature) -> String {
    format!("{} ({:.6}, {:.1} km)", hit.name, hit.distance, hit.km)
}

/// Comma-joined names, or `(none)`.
pub fn names_line(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
