use semantic_index::StoreError;
use spatial_index::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
