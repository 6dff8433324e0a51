use crate::embedding::{EMBEDDING_DIM, Embedding, cosine_similarity, embed, norm};
use crate::error::{Result, StoreError};
use crate::records::{TextRecord, load_records};
use core_types::ItemId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Free-form metadata attached to an item (title, description, ...).
pub type Metadata = IndexMap<String, serde_json::Value>;

/// On-disk layout: `{"embeddings": {id: [..]}, "metadata": {id: {..}}}`.
///
/// Both maps keep insertion order so ties in search resolve the same way
/// after a reload.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    embeddings: IndexMap<ItemId, Embedding>,
    #[serde(default)]
    metadata: IndexMap<ItemId, Metadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: ItemId,
    pub score: f64,
}

/// Durable id → embedding store with exact brute-force cosine search.
#[derive(Debug)]
pub struct VectorStore {
    path: Option<PathBuf>,
    snapshot: Snapshot,
}

impl VectorStore {
    /// Open the store backed by `path`, loading the full snapshot eagerly.
    ///
    /// A missing file yields an empty store. A file that does not parse as a
    /// snapshot, or holds vectors of the wrong dimension, is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = match std::fs::read(&path) {
            Ok(bytes) => parse_snapshot(&path, &bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no snapshot found; starting with an empty store");
                Snapshot::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::info!(
            path = %path.display(),
            items = snapshot.embeddings.len(),
            "vector store loaded"
        );
        Ok(Self {
            path: Some(path),
            snapshot,
        })
    }

    /// Store without a backing file; mutations are never persisted.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            snapshot: Snapshot::default(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Embed `text` under `id`, replacing any previous vector, then persist the
    /// whole snapshot. Metadata is replaced only when `meta` is given.
    pub fn add(&mut self, id: impl Into<ItemId>, text: &str, meta: Option<Metadata>) -> Result<()> {
        let id = id.into();
        let vector = embed(text);
        tracing::debug!(id = %id, replaced = self.contains(&id), "storing embedding");
        if let Some(meta) = meta {
            self.snapshot.metadata.insert(id.clone(), meta);
        }
        self.snapshot.embeddings.insert(id, vector);
        self.persist()
    }

    /// Add a text record, embedding `"<title>. <description>"` with the record as metadata.
    pub fn add_record(&mut self, record: &TextRecord) -> Result<()> {
        self.add(
            record.id.clone(),
            &record.embedding_text(),
            Some(record.to_metadata()),
        )
    }

    /// Load a JSON array of records from `path` and add each one. Returns the count added.
    pub fn ingest_records(&mut self, path: &Path) -> Result<usize> {
        let records = load_records(path)?;
        for record in &records {
            self.add_record(record)?;
        }
        tracing::info!(path = %path.display(), records = records.len(), "ingested text records");
        Ok(records.len())
    }

    /// Top `top_k` items by cosine similarity to `embed(query)`, best first.
    ///
    /// Equal scores keep the order in which ids were first inserted.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let qv = embed(query);
        if norm(&qv) == 0.0 {
            return Err(StoreError::UndefinedSimilarity { id: None });
        }

        let mut hits = Vec::with_capacity(self.len());
        for (id, vector) in &self.snapshot.embeddings {
            let score = cosine_similarity(&qv, vector).map_err(|err| match err {
                StoreError::UndefinedSimilarity { .. } => StoreError::UndefinedSimilarity {
                    id: Some(id.clone()),
                },
                other => other,
            })?;
            hits.push(SearchHit {
                id: id.clone(),
                score,
            });
        }

        // Stable sort: ties stay in insertion order.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        tracing::debug!(query, top_k, returned = hits.len(), "vector search");
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.snapshot.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.embeddings.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot.embeddings.contains_key(id)
    }

    pub fn vector(&self, id: &str) -> Option<&[f64]> {
        self.snapshot.embeddings.get(id).map(Vec::as_slice)
    }

    pub fn metadata(&self, id: &str) -> Option<&Metadata> {
        self.snapshot.metadata.get(id)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.snapshot.embeddings.keys().map(String::as_str)
    }

    /// Rewrite the full snapshot. No-op for in-memory stores.
    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let body = serde_json::to_vec_pretty(&self.snapshot)?;
        std::fs::write(path, body).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), items = self.len(), "snapshot written");
        Ok(())
    }
}

fn parse_snapshot(path: &Path, bytes: &[u8]) -> Result<Snapshot> {
    let snapshot: Snapshot =
        serde_json::from_slice(bytes).map_err(|err| StoreError::CorruptSnapshot {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    if let Some((id, v)) = snapshot
        .embeddings
        .iter()
        .find(|(_, v)| v.len() != EMBEDDING_DIM)
    {
        return Err(StoreError::CorruptSnapshot {
            path: path.to_path_buf(),
            reason: format!(
                "vector for `{id}` has {} components, expected {EMBEDDING_DIM}",
                v.len()
            ),
        });
    }
    Ok(snapshot)
}
