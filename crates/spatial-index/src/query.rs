//! Stateless filter-refine queries over a [`Layer`] and its [`SpatialIndex`].
//!
//! Each query pulls candidates from the index by bbox, then checks the
//! candidates' real geometry. Query coordinates are `(lat, lon)`; geometry is
//! stored as `x = lon`, `y = lat`.

use crate::error::{Result, SpatialError};
use crate::index::SpatialIndex;
use crate::layer::{Feature, Layer};
use core_types::{BBox, FeatureKey};
use geo::{Closest, ClosestPoint, Distance, Euclidean, Haversine, Intersects};
use geo_types::{Coord, Geometry, Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct NearestFeature {
    pub name: String,
    /// Planar distance in coordinate units; 0 iff the point is on or in the geometry.
    pub distance: f64,
    /// Great-circle distance in km from the query point to the closest point of the geometry.
    pub km: f64,
}

/// Names of features within `buffer` of `(lat, lon)`, in layer order.
///
/// The point is grown into a disc of radius `buffer`, so a larger buffer
/// never drops a match found with a smaller one. `buffer = 0` means exact
/// intersection.
pub fn point_in_polygon(
    lat: f64,
    lon: f64,
    layer: &Layer,
    index: &SpatialIndex,
    buffer: f64,
) -> Result<Vec<String>> {
    if !buffer.is_finite() || buffer < 0.0 {
        return Err(SpatialError::InvalidBuffer(buffer));
    }
    index.ensure_built_from(layer)?;

    let probe = Geometry::Point(Point::new(lon, lat));
    let window = BBox::from_point(lon, lat).expanded(buffer);
    let names = index
        .overlapping(&window)
        .into_iter()
        .map(|key| feature(layer, key))
        .filter(|f| distance_to(&probe, f) <= buffer)
        .map(|f| f.name.clone())
        .collect();
    Ok(names)
}

/// Closest of the `k` features whose bboxes are nearest `(lat, lon)`.
///
/// Candidates come from bbox proximity, so for long or winding geometries
/// the true nearest feature can fall outside them; a larger `k` narrows that
/// gap. `k = 0` is treated as 1. Exact ties go to the earlier feature.
pub fn nearest_feature(
    lat: f64,
    lon: f64,
    layer: &Layer,
    index: &SpatialIndex,
    k: usize,
) -> Result<Option<NearestFeature>> {
    index.ensure_built_from(layer)?;

    let probe = Geometry::Point(Point::new(lon, lat));
    let mut best: Option<(FeatureKey, f64)> = None;
    for key in index.nearest(lon, lat, k.max(1)) {
        let d = distance_to(&probe, feature(layer, key));
        let better = match best {
            None => true,
            Some((best_key, best_d)) => d < best_d || (d == best_d && key < best_key),
        };
        if better {
            best = Some((key, d));
        }
    }

    Ok(best.map(|(key, distance)| {
        let found = feature(layer, key);
        NearestFeature {
            name: found.name.clone(),
            distance,
            km: km_to_closest(lat, lon, found),
        }
    }))
}

/// Names of features whose geometry intersects the rectangle, in layer order.
///
/// Corners may be given in either order.
pub fn features_in_bbox(
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
    layer: &Layer,
    index: &SpatialIndex,
) -> Result<Vec<String>> {
    index.ensure_built_from(layer)?;

    let window = BBox::new(min_lon, min_lat, max_lon, max_lat);
    let region = Geometry::Rect(Rect::new(
        Coord {
            x: window.min_x,
            y: window.min_y,
        },
        Coord {
            x: window.max_x,
            y: window.max_y,
        },
    ));
    let names = index
        .overlapping(&window)
        .into_iter()
        .map(|key| feature(layer, key))
        .filter(|f| f.geometry.intersects(&region))
        .map(|f| f.name.clone())
        .collect();
    Ok(names)
}

/// Great-circle distance between two `(lat, lon)` positions in kilometres
/// (mean Earth radius 6371.0088 km). Also usable on its own, outside any layer.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Haversine::distance(Point::new(lon1, lat1), Point::new(lon2, lat2)) / 1000.0
}

fn km_to_closest(lat: f64, lon: f64, feature: &Feature) -> f64 {
    match feature.geometry.closest_point(&Point::new(lon, lat)) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => haversine_km(lat, lon, p.y(), p.x()),
        // Layers reject empty geometries, so this is unreachable in practice.
        Closest::Indeterminate => 0.0,
    }
}

fn feature(layer: &Layer, key: FeatureKey) -> &Feature {
    &layer.features()[key.index()]
}

/// Planar distance that is 0 exactly when the geometries intersect.
///
/// `Euclidean::distance` can round to 0 for a point the exact predicate puts
/// just off a line, so a disjoint pair is floored at the smallest positive f64.
fn distance_to(probe: &Geometry<f64>, feature: &Feature) -> f64 {
    if feature.geometry.intersects(probe) {
        0.0
    } else {
        Euclidean::distance(probe, &feature.geometry).max(f64::MIN_POSITIVE)
    }
}
