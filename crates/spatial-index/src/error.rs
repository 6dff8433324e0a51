//! Error types for layers, the spatial index, and geometric queries.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpatialError {
    /// A feature has neither a `name` nor an `id` property.
    #[error("feature #{index} in layer `{layer}` has neither a name nor an id")]
    AmbiguousFeatureKey { layer: String, index: usize },

    #[error("feature #{index} in layer `{layer}` has an invalid geometry: {reason}")]
    InvalidGeometry {
        layer: String,
        index: usize,
        reason: String,
    },

    #[error("buffer must be a finite, non-negative distance (got {0})")]
    InvalidBuffer(f64),

    /// The index passed to a query was not built from the given layer.
    #[error("index for `{indexed}` does not match layer `{layer}` ({features} features)")]
    IndexMismatch {
        layer: String,
        indexed: String,
        features: usize,
    },

    #[error("layer file {} is not a GeoJSON feature collection: {reason}", path.display())]
    LayerFormat { path: PathBuf, reason: String },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SpatialError>;
