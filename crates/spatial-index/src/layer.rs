//! Features and layers.
//!
//! A [`Layer`] is validated once at construction: every feature must resolve
//! a key (`name`, else `id`) and a finite bounding box. Layers with a missing
//! key are rejected rather than defaulted.

use crate::error::{Result, SpatialError};
use core_types::{BBox, LayerKind};
use geo::BoundingRect;
use geo_types::Geometry;
use serde_json::{Map, Value};

pub type Properties = Map<String, Value>;

/// Raw feature as handed over by whatever loaded the layer.
#[derive(Debug, Clone)]
pub struct FeatureInput {
    pub properties: Properties,
    pub geometry: Geometry<f64>,
}

impl FeatureInput {
    pub fn new(properties: Properties, geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            properties,
            geometry: geometry.into(),
        }
    }

    /// Feature whose only property is `name`.
    pub fn named(name: &str, geometry: impl Into<Geometry<f64>>) -> Self {
        let mut properties = Properties::new();
        properties.insert("name".into(), Value::String(name.to_string()));
        Self::new(properties, geometry)
    }
}

/// Validated feature: key, geometry, and its bounding box.
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub geometry: Geometry<f64>,
    pub bbox: BBox,
    pub properties: Properties,
}

#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    kind: LayerKind,
    features: Vec<Feature>,
}

impl Layer {
    /// Validate `inputs` into a layer. Feature order is preserved and is the
    /// order every query reports matches in.
    pub fn new(name: impl Into<String>, kind: LayerKind, inputs: Vec<FeatureInput>) -> Result<Self> {
        let name = name.into();
        let mut features = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let key = feature_key(&input.properties).ok_or_else(|| {
                SpatialError::AmbiguousFeatureKey {
                    layer: name.clone(),
                    index,
                }
            })?;
            let bbox = bbox_of(&input.geometry).ok_or_else(|| SpatialError::InvalidGeometry {
                layer: name.clone(),
                index,
                reason: "geometry is empty or has non-finite coordinates".into(),
            })?;
            features.push(Feature {
                name: key,
                geometry: input.geometry,
                bbox,
                properties: input.properties,
            });
        }
        tracing::debug!(layer = %name, %kind, features = features.len(), "layer loaded");
        Ok(Self {
            name,
            kind,
            features,
        })
    }

    pub fn empty(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            features: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }
}

/// `name`, falling back to `id`. Non-string scalars use their JSON text; `null` counts as absent.
fn feature_key(properties: &Properties) -> Option<String> {
    ["name", "id"]
        .iter()
        .find_map(|field| match properties.get(*field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        })
}

fn bbox_of(geometry: &Geometry<f64>) -> Option<BBox> {
    let rect = geometry.bounding_rect()?;
    let bbox = BBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);
    [bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y]
        .iter()
        .all(|c| c.is_finite())
        .then_some(bbox)
}
