//! levelsync-core: level-synchronous BFS over CSR graphs.
//!
//! Computes the breadth-first level of every vertex from a single source,
//! expanding one whole frontier per round. The graph is an immutable
//! compressed-sparse-row structure that callers build once and share
//! between any number of traversals.
//!
//! Per-level progress is reported through an injected [`LevelObserver`];
//! the engine itself only emits `tracing` diagnostics.

mod error;
mod graph;
mod levels;
mod traversal;

pub use error::{Error, Result};
pub use graph::{CsrGraph, VertexId, MAX_VERTICES};
pub use levels::LevelArray;
pub use traversal::{
    has_path, traverse, traverse_into, traverse_with_observer, LevelObserver, NoopObserver,
    TracingObserver,
};
