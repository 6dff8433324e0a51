//! Fuses vector search hits with spatial annotations.
//!
//! The orchestrator owns the store and one indexed layer per configured
//! feature file. A query ranks items by similarity, then looks for a feature
//! name mentioned in the query text (layers in order, first match wins) and
//! attaches it to every hit as a highlight.

use crate::error::Result;
use core_types::LayerKind;
use core_types::config::{AppConfig, SearchConfig, SpatialConfig};
use semantic_index::{SearchHit, VectorStore};
use spatial_index::{IndexedLayer, Layer, NearestFeature};
use std::fmt;
use std::path::Path;

/// Feature named in the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub kind: LayerKind,
    pub name: String,
}

impl fmt::Display for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LayerKind::City => write!(f, "Near {}", self.name),
            LayerKind::River => write!(f, "Close to {}", self.name),
            LayerKind::Region => write!(f, "Within {}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub score: f64,
    pub highlight: Option<Highlight>,
}

impl fmt::Display for RetrievedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let highlight = self.highlight.as_ref().map(ToString::to_string).unwrap_or_default();
        let line = format!(
            "{}: {} (score: {:.4}) {}",
            self.title, self.description, self.score, highlight
        );
        f.write_str(line.trim())
    }
}

pub struct RetrievalOrchestrator {
    store: VectorStore,
    layers: Vec<IndexedLayer>,
    search: SearchConfig,
    spatial: SpatialConfig,
}

impl RetrievalOrchestrator {
    /// Index each layer once. Layer order is the order annotations are checked in.
    pub fn new(store: VectorStore, layers: Vec<Layer>) -> Self {
        Self {
            store,
            layers: layers.into_iter().map(IndexedLayer::build).collect(),
            search: SearchConfig::default(),
            spatial: SpatialConfig::default(),
        }
    }

    /// Open the store and load cities then rivers from the configured paths.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let store = VectorStore::open(&cfg.paths.store)?;
        let cities = load_layer("cities", LayerKind::City, Path::new(&cfg.paths.cities))?;
        let rivers = load_layer("rivers", LayerKind::River, Path::new(&cfg.paths.rivers))?;
        Ok(Self::new(store, vec![cities, rivers]).with_settings(&cfg.search, &cfg.spatial))
    }

    #[must_use]
    pub fn with_settings(mut self, search: &SearchConfig, spatial: &SpatialConfig) -> Self {
        self.search = search.clone();
        self.spatial = spatial.clone();
        self
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut VectorStore {
        &mut self.store
    }

    pub fn layers(&self) -> &[IndexedLayer] {
        &self.layers
    }

    /// Ranked, annotated results using the configured `top_k`.
    pub fn query(&self, text: &str) -> Result<Vec<RetrievedItem>> {
        self.query_top_k(text, self.search.top_k)
    }

    pub fn query_top_k(&self, text: &str, top_k: usize) -> Result<Vec<RetrievedItem>> {
        let hits = self.store.search(text, top_k)?;
        let highlight = self.highlight_for(text);
        tracing::debug!(
            hits = hits.len(),
            highlight = highlight.as_ref().map(|h| h.name.as_str()),
            "query answered"
        );
        Ok(hits
            .into_iter()
            .map(|hit| self.item(hit, highlight.clone()))
            .collect())
    }

    /// Features of the first `kind` layer within `buffer` (default: configured) of the point.
    pub fn within(&self, kind: LayerKind, lat: f64, lon: f64, buffer: Option<f64>) -> Result<Vec<String>> {
        let Some(layer) = self.layer(kind) else {
            return Ok(Vec::new());
        };
        let buffer = buffer.unwrap_or(self.spatial.point_buffer);
        Ok(layer.point_in_polygon(lat, lon, buffer)?)
    }

    /// Nearest feature of the first `kind` layer, refining `k` (default: configured) candidates.
    pub fn nearest(
        &self,
        kind: LayerKind,
        lat: f64,
        lon: f64,
        k: Option<usize>,
    ) -> Result<Option<NearestFeature>> {
        let Some(layer) = self.layer(kind) else {
            return Ok(None);
        };
        let k = k.unwrap_or(self.spatial.nearest_candidates);
        Ok(layer.nearest_feature(lat, lon, k)?)
    }

    pub fn in_bbox(
        &self,
        kind: LayerKind,
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
    ) -> Result<Vec<String>> {
        let Some(layer) = self.layer(kind) else {
            return Ok(Vec::new());
        };
        Ok(layer.features_in_bbox(min_lat, min_lon, max_lat, max_lon)?)
    }

    fn layer(&self, kind: LayerKind) -> Option<&IndexedLayer> {
        self.layers.iter().find(|l| l.layer().kind() == kind)
    }

    /// First feature, in layer order, whose name occurs in `text` ignoring case.
    fn highlight_for(&self, text: &str) -> Option<Highlight> {
        let text = text.to_lowercase();
        self.layers.iter().find_map(|indexed| {
            let layer = indexed.layer();
            layer
                .names()
                .find(|name| !name.is_empty() && text.contains(&name.to_lowercase()))
                .map(|name| Highlight {
                    kind: layer.kind(),
                    name: name.to_string(),
                })
        })
    }

    fn item(&self, hit: SearchHit, highlight: Option<Highlight>) -> RetrievedItem {
        let meta = self.store.metadata(&hit.id);
        let field = |key: &str| meta.and_then(|m| m.get(key)).and_then(text_value);
        RetrievedItem {
            title: field("title").unwrap_or_else(|| hit.id.clone()),
            description: field("description").unwrap_or_default(),
            id: hit.id,
            score: hit.score,
            highlight,
        }
    }
}

fn text_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn load_layer(name: &str, kind: LayerKind, path: &Path) -> Result<Layer> {
    if !path.exists() {
        tracing::warn!(layer = name, path = %path.display(), "layer file missing; using empty layer");
        return Ok(Layer::empty(name, kind));
    }
    Ok(Layer::from_geojson_path(name, kind, path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Point, line_string};
    use semantic_index::Metadata;
    use spatial_index::FeatureInput;

    fn meta(title: &str, description: &str) -> Metadata {
        let mut m = Metadata::new();
        m.insert("title".into(), title.into());
        m.insert("description".into(), description.into());
        m
    }

    fn orchestrator() -> RetrievalOrchestrator {
        let mut store = VectorStore::in_memory();
        store
            .add("r1", "Ganges river near Delhi", Some(meta("Ganges", "A major river")))
            .unwrap();
        store.add("r2", "Yamuna flows past Agra", None).unwrap();

        let cities = Layer::new(
            "cities",
            LayerKind::City,
            vec![
                FeatureInput::named("Delhi", Point::new(77.2090, 28.6139)),
                FeatureInput::named("", Point::new(0.0, 0.0)),
            ],
        )
        .unwrap();
        let rivers = Layer::new(
            "rivers",
            LayerKind::River,
            vec![FeatureInput::named(
                "Yamuna",
                line_string![(x: 77.25, y: 28.9), (x: 77.23, y: 28.65), (x: 77.28, y: 28.4)],
            )],
        )
        .unwrap();
        RetrievalOrchestrator::new(store, vec![cities, rivers])
    }

    #[test]
    fn city_mention_wins_over_river() {
        let orch = orchestrator();
        let items = orch.query("yamuna in DELHI").unwrap();
        assert_eq!(items.len(), 2);
        for item in &items {
            assert_eq!(item.highlight.as_ref().unwrap().to_string(), "Near Delhi");
        }
    }

    #[test]
    fn river_mention_when_no_city() {
        let orch = orchestrator();
        let items = orch.query("the yamuna").unwrap();
        let h = items[0].highlight.as_ref().unwrap();
        assert_eq!(h.kind, LayerKind::River);
        assert_eq!(h.to_string(), "Close to Yamuna");
    }

    #[test]
    fn no_mention_means_no_highlight() {
        let orch = orchestrator();
        let items = orch.query("mountains").unwrap();
        assert!(items.iter().all(|i| i.highlight.is_none()));
        assert!(orch.query("").unwrap().iter().all(|i| i.highlight.is_none()));
    }

    #[test]
    fn metadata_fallbacks() {
        let orch = orchestrator();
        let items = orch.query_top_k("anything", 10).unwrap();
        let r2 = items.iter().find(|i| i.id == "r2").unwrap();
        assert_eq!(r2.title, "r2");
        assert_eq!(r2.description, "");
        let r1 = items.iter().find(|i| i.id == "r1").unwrap();
        assert_eq!(r1.title, "Ganges");
    }

    #[test]
    fn display_is_trimmed() {
        let mut item = RetrievedItem {
            id: "r2".into(),
            title: "r2".into(),
            description: String::new(),
            score: 0.75,
            highlight: None,
        };
        assert_eq!(item.to_string(), "r2:  (score: 0.7500)");
        item.highlight = Some(Highlight {
            kind: LayerKind::Region,
            name: "NCR".into(),
        });
        assert_eq!(item.to_string(), "r2:  (score: 0.7500) Within NCR");
    }

    #[test]
    fn passthroughs_use_layer_kind() {
        let orch = orchestrator();
        assert_eq!(
            orch.within(LayerKind::City, 28.6139, 77.2090, None).unwrap(),
            vec!["Delhi"]
        );
        let hit = orch.nearest(LayerKind::River, 28.6139, 77.2090, None).unwrap().unwrap();
        assert_eq!(hit.name, "Yamuna");
        assert!(orch.in_bbox(LayerKind::Region, 0.0, 0.0, 90.0, 180.0).unwrap().is_empty());
        assert!(orch.nearest(LayerKind::Region, 0.0, 0.0, None).unwrap().is_none());
    }
}
