use crate::graph::VertexId;

/// Errors raised while building a CSR graph or running a traversal.
///
/// Every variant is a precondition or invariant violation. A traversal that
/// hits one aborts without returning any levels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("source vertex {vertex} out of range for graph with {vertex_count} vertices")]
    InvalidSource {
        vertex: VertexId,
        vertex_count: usize,
    },

    #[error("target vertex {vertex} out of range for graph with {vertex_count} vertices")]
    InvalidTarget {
        vertex: VertexId,
        vertex_count: usize,
    },

    #[error("malformed CSR graph: {reason}")]
    MalformedGraph { reason: String },

    #[error("level counter overflow at depth {depth}")]
    LevelOverflow { depth: u32 },
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedGraph {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
