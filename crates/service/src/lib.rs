//! Service support library: retrieval orchestration and tracing bootstrap.

pub mod error;
mod logging;
pub mod orchestrator;

pub use error::{EngineError, Result};
pub use logging::{init_tracing, init_tracing_with_config};
pub use orchestrator::{Highlight, RetrievalOrchestrator, RetrievedItem};
