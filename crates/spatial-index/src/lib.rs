//! Spatial side of GeoRAG: feature layers, a per-layer bounding-box index,
//! and filter-refine geometric queries.
//!
//! ```text
//! GeoJSON / FeatureInput ──► Layer ──► SpatialIndex::build (R-tree of bboxes)
//!                                            │
//!             query (lat, lon | box) ──► bbox prefilter ──► exact refine (geo)
//! ```
//!
//! Layers and indexes are immutable once built, so they can be shared across
//! threads for concurrent read-only queries. A changed layer means a rebuilt
//! index.

pub mod error;
pub mod index;
pub mod layer;
pub mod load;
pub mod query;

pub use error::{Result, SpatialError};
pub use index::SpatialIndex;
pub use layer::{Feature, FeatureInput, Layer, Properties};
pub use query::{NearestFeature, features_in_bbox, haversine_km, nearest_feature, point_in_polygon};

/// A layer bundled with the index built from it.
#[derive(Debug)]
pub struct IndexedLayer {
    layer: Layer,
    index: SpatialIndex,
}

impl IndexedLayer {
    pub fn build(layer: Layer) -> Self {
        let index = SpatialIndex::build(&layer);
        Self { layer, index }
    }

    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn point_in_polygon(&self, lat: f64, lon: f64, buffer: f64) -> Result<Vec<String>> {
        point_in_polygon(lat, lon, &self.layer, &self.index, buffer)
    }

    pub fn nearest_feature(&self, lat: f64, lon: f64, k: usize) -> Result<Option<NearestFeature>> {
        nearest_feature(lat, lon, &self.layer, &self.index, k)
    }

    pub fn features_in_bbox(
        &self,
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
    ) -> Result<Vec<String>> {
        features_in_bbox(min_lat, min_lon, max_lat, max_lon, &self.layer, &self.index)
    }
}
