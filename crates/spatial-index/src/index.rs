//! Immutable bounding-box index over one layer.
//!
//! Built once from a [`Layer`] by bulk-loading an R-tree of
//! `(FeatureKey -> bbox)` entries. It only answers coarse questions (which
//! boxes overlap a window, which boxes are closest to a point); exact geometry
//! is left to the query functions.

use crate::error::{Result, SpatialError};
use crate::layer::Layer;
use core_types::{BBox, FeatureKey};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

type Entry = GeomWithData<Rectangle<[f64; 2]>, FeatureKey>;

#[derive(Debug)]
pub struct SpatialIndex {
    layer: String,
    tree: RTree<Entry>,
}

impl SpatialIndex {
    /// Index every feature of `layer` by its bbox. Entry count equals feature count.
    pub fn build(layer: &Layer) -> Self {
        let entries: Vec<Entry> = layer
            .features()
            .iter()
            .enumerate()
            .map(|(i, f)| {
                GeomWithData::new(
                    Rectangle::from_corners(f.bbox.min_corner(), f.bbox.max_corner()),
                    FeatureKey::from_index(i),
                )
            })
            .collect();
        let tree = RTree::bulk_load(entries);
        tracing::info!(layer = layer.name(), entries = tree.size(), "spatial index built");
        Self {
            layer: layer.name().to_string(),
            tree,
        }
    }

    pub fn layer_name(&self) -> &str {
        &self.layer
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Keys whose bbox overlaps `window` (edges inclusive), in layer order.
    pub fn overlapping(&self, window: &BBox) -> Vec<FeatureKey> {
        let envelope = AABB::from_corners(window.min_corner(), window.max_corner());
        let mut keys: Vec<FeatureKey> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Up to `k` keys ordered by bbox distance to `(x, y)`, closest first.
    ///
    /// This ranks boxes, not geometries: the feature closest in reality may
    /// not be among them when its bbox is a poor fit.
    pub fn nearest(&self, x: f64, y: f64, k: usize) -> Vec<FeatureKey> {
        self.tree
            .nearest_neighbor_iter(&[x, y])
            .take(k)
            .map(|entry| entry.data)
            .collect()
    }

    /// Fail unless this index was built from `layer` (same name, same size).
    pub fn ensure_built_from(&self, layer: &Layer) -> Result<()> {
        if self.layer == layer.name() && self.len() == layer.len() {
            Ok(())
        } else {
            Err(SpatialError::IndexMismatch {
                layer: layer.name().to_string(),
                indexed: self.layer.clone(),
                features: layer.len(),
            })
        }
    }
}
