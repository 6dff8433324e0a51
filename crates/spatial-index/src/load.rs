//! Loading layers from GeoJSON `FeatureCollection`s.
//!
//! Decoding is done by the `geojson` crate; each feature geometry is then
//! converted into `geo_types`. Every GeoJSON geometry type is accepted,
//! including `GeometryCollection`. Positions are `[lon, lat]`; extra
//! ordinates are ignored.

use crate::error::{Result, SpatialError};
use crate::layer::{FeatureInput, Layer};
use core_types::LayerKind;
use geo_types::Geometry;
use geojson::{GeoJson, Value};
use std::path::Path;

impl Layer {
    /// Read a GeoJSON file into a layer named `name`.
    pub fn from_geojson_path(name: &str, kind: LayerKind, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| SpatialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_geojson_str(name, kind, &raw).map_err(|err| match err {
            SpatialError::LayerFormat { reason, .. } => SpatialError::LayerFormat {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse a GeoJSON `FeatureCollection` held in memory.
    pub fn from_geojson_str(name: &str, kind: LayerKind, raw: &str) -> Result<Self> {
        let bad_format = |reason: String| SpatialError::LayerFormat {
            path: Default::default(),
            reason,
        };
        let collection = match raw.parse::<GeoJson>().map_err(|e| bad_format(e.to_string()))? {
            GeoJson::FeatureCollection(fc) => fc,
            GeoJson::Feature(_) => return Err(bad_format("expected a FeatureCollection, found a Feature".into())),
            GeoJson::Geometry(_) => return Err(bad_format("expected a FeatureCollection, found a Geometry".into())),
        };

        let mut inputs = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.into_iter().enumerate() {
            let invalid = |reason: String| SpatialError::InvalidGeometry {
                layer: name.to_string(),
                index,
                reason,
            };
            let geometry = feature
                .geometry
                .ok_or_else(|| invalid("missing geometry".into()))?;
            if !positions_are_planar(&geometry.value) {
                return Err(invalid("position needs at least two ordinates".into()));
            }
            let geometry = Geometry::<f64>::try_from(geometry).map_err(|e| invalid(e.to_string()))?;
            inputs.push(FeatureInput::new(feature.properties.unwrap_or_default(), geometry));
        }
        Self::new(name, kind, inputs)
    }
}

/// Every position carries at least `x` and `y`.
fn positions_are_planar(value: &Value) -> bool {
    let ok = |p: &Vec<f64>| p.len() >= 2;
    match value {
        Value::Point(p) => ok(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => ps.iter().all(ok),
        Value::MultiLineString(ls) | Value::Polygon(ls) => ls.iter().flatten().all(ok),
        Value::MultiPolygon(polys) => polys.iter().flatten().flatten().all(ok),
        Value::GeometryCollection(gs) => gs.iter().all(|g| positions_are_planar(&g.value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Delhi"},
             "geometry": {"type": "Point", "coordinates": [77.2090, 28.6139]}},
            {"type": "Feature", "properties": {"id": "agra-district"},
             "geometry": {"type": "Polygon", "coordinates": [[[77.8, 27.0], [78.2, 27.0], [78.2, 27.4], [77.8, 27.4], [77.8, 27.0]]]}}
        ]
    }"#;

    #[test]
    fn feature_collection_becomes_layer() {
        let layer = Layer::from_geojson_str("cities", LayerKind::City, CITIES).unwrap();
        assert_eq!(layer.names().collect::<Vec<_>>(), vec!["Delhi", "agra-district"]);
        assert!(matches!(layer.features()[0].geometry, Geometry::Point(_)));
        assert!(matches!(layer.features()[1].geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn geometry_collection_is_accepted() {
        let raw = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "Sangam"},
             "geometry": {"type": "GeometryCollection", "geometries": [
                {"type": "Point", "coordinates": [81.88, 25.42]},
                {"type": "LineString", "coordinates": [[81.8, 25.4], [81.9, 25.45]]}
             ]}}
        ]}"#;
        let layer = Layer::from_geojson_str("rivers", LayerKind::River, raw).unwrap();
        assert!(matches!(
            layer.features()[0].geometry,
            Geometry::GeometryCollection(_)
        ));
        assert_eq!(layer.features()[0].bbox.max_x, 81.9);
    }

    #[test]
    fn third_ordinate_is_ignored() {
        let raw = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "Yamuna"},
             "geometry": {"type": "LineString", "coordinates": [[77.2, 28.4, 210.0], [77.3, 28.9, 205.0]]}}
        ]}"#;
        let layer = Layer::from_geojson_str("rivers", LayerKind::River, raw).unwrap();
        assert_eq!(layer.features()[0].bbox.max_y, 28.9);
    }

    #[test]
    fn null_geometry_is_invalid() {
        let raw = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "Ghost"}, "geometry": null}
        ]}"#;
        let err = Layer::from_geojson_str("cities", LayerKind::City, raw).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidGeometry { index: 0, .. }));
    }

    #[test]
    fn short_position_is_invalid() {
        let raw = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "Delhi"},
             "geometry": {"type": "Point", "coordinates": [77.2, 28.6]}},
            {"type": "Feature", "properties": {"name": "Half"},
             "geometry": {"type": "Point", "coordinates": [77.2]}}
        ]}"#;
        let err = Layer::from_geojson_str("cities", LayerKind::City, raw).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidGeometry { index: 1, .. }));
    }

    #[test]
    fn keyless_feature_keeps_its_index() {
        let raw = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "Delhi"},
             "geometry": {"type": "Point", "coordinates": [77.2, 28.6]}},
            {"type": "Feature", "properties": null,
             "geometry": {"type": "Point", "coordinates": [78.0, 27.1]}}
        ]}"#;
        let err = Layer::from_geojson_str("cities", LayerKind::City, raw).unwrap_err();
        assert!(matches!(err, SpatialError::AmbiguousFeatureKey { index: 1, .. }));
    }

    #[test]
    fn non_collection_document_is_rejected() {
        let raw = r#"{"type": "Point", "coordinates": [77.2, 28.6]}"#;
        let err = Layer::from_geojson_str("cities", LayerKind::City, raw).unwrap_err();
        assert!(matches!(err, SpatialError::LayerFormat { .. }));
    }
}
