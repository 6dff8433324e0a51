//! Semantic side of GeoRAG: deterministic text embeddings and exact
//! brute-force cosine search over a durable JSON snapshot.
//!
//! The store is write-through: every `add` rewrites the full snapshot before
//! returning. It is single-writer; callers that mutate from several threads
//! must serialize `add` themselves.

pub mod embedding;
pub mod error;
pub mod records;
pub mod store;

pub use embedding::{EMBEDDING_DIM, Embedding, cosine_similarity, embed};
pub use error::{Result, StoreError};
pub use records::{TextRecord, load_records};
pub use store::{Metadata, SearchHit, VectorStore};
