//! Vocabulary shared by the GeoRAG crates: item ids, feature keys, layer
//! kinds, axis-aligned boxes, and the layered configuration in [`config`].
//!
//! The vector store and the spatial index both depend on this crate and on
//! nothing of each other.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an item held by the vector store.
pub type ItemId = String;

/// Synthetic key used by the spatial index: the position of a feature in its layer.
///
/// Sized like a slice index so every feature a layer can hold gets a distinct key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureKey(pub usize);

impl FeatureKey {
    pub const fn from_index(index: usize) -> Self {
        FeatureKey(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// Kind of features a layer holds. Drives how spatial highlights are phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    City,
    River,
    Region,
}

impl LayerKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            LayerKind::City => "city",
            LayerKind::River => "river",
            LayerKind::Region => "region",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned bounding box in the layer's planar frame (`x = lon`, `y = lat`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    /// Build a box from two opposite corners; the corners may come in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Degenerate box around a single point.
    pub const fn from_point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub const fn min_corner(&self) -> [f64; 2] {
        [self.min_x, self.min_y]
    }

    pub const fn max_corner(&self) -> [f64; 2] {
        [self.max_x, self.max_y]
    }
}

pub mod config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_normalizes_corners() {
        let b = BBox::new(77.3, 28.7, 77.0, 28.5);
        assert_eq!(b.min_corner(), [77.0, 28.5]);
        assert_eq!(b.max_corner(), [77.3, 28.7]);
    }

    #[test]
    fn bbox_overlap_is_inclusive_on_edges() {
        let a = BBox::new(0.0, 0.0, 1.0, 1.0);
        let touching = BBox::new(1.0, 1.0, 2.0, 2.0);
        let apart = BBox::new(1.5, 1.5, 2.0, 2.0);
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn expanded_point_box_contains_nearby_points() {
        let b = BBox::from_point(77.2090, 28.6139).expanded(0.01);
        assert!(b.contains_point(77.215, 28.62));
        assert!(!b.contains_point(77.25, 28.62));
    }

    #[test]
    fn feature_key_round_trips() {
        assert_eq!(FeatureKey::from_index(42).index(), 42);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn feature_keys_past_u32_stay_distinct() {
        let past = u32::MAX as usize + 1;
        assert_eq!(FeatureKey::from_index(past).index(), past);
        assert_ne!(FeatureKey::from_index(past), FeatureKey::from_index(0));
        assert!(FeatureKey::from_index(usize::MAX) > FeatureKey::from_index(past));
    }

    #[test]
    fn layer_kind_serializes_lowercase() {
        let kinds: Vec<LayerKind> = toml::from_str::<std::collections::BTreeMap<String, LayerKind>>(
            "a = \"city\"\nb = \"river\"",
        )
        .unwrap()
        .into_values()
        .collect();
        assert_eq!(kinds, vec![LayerKind::City, LayerKind::River]);
    }
}
