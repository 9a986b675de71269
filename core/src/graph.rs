use crate::error::{Error, Result};

/// Vertex identifier: a dense index in `[0, vertex_count)`.
pub type VertexId = u32;

/// Largest vertex count a graph may have.
///
/// Bounded so the deepest possible level (`vertex_count - 1`) stays below
/// [`crate::LevelArray::UNREACHED`].
pub const MAX_VERTICES: usize = u32::MAX as usize;

/// Immutable directed graph in compressed-sparse-row form.
///
/// The outgoing edges of vertex `v` are `targets[offsets[v]..offsets[v + 1]]`.
/// Self-loops and parallel edges are allowed. A `CsrGraph` can only be
/// obtained through a validating constructor, so every value of this type
/// satisfies the CSR invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrGraph {
    offsets: Vec<u64>,
    targets: Vec<VertexId>,
}

impl CsrGraph {
    /// Wrap caller-owned CSR arrays after checking them.
    ///
    /// `offsets` must hold `vertex_count + 1` non-decreasing values starting
    /// at 0 and ending at `targets.len()`; every target must be a valid id.
    pub fn new(offsets: Vec<u64>, targets: Vec<VertexId>) -> Result<Self> {
        let vertex_count = match offsets.len() {
            0 | 1 => {
                return Err(Error::malformed(format!(
                    "offsets has {} entries, need at least 2 (vertex_count >= 1)",
                    offsets.len()
                )))
            }
            n => n - 1,
        };
        if vertex_count > MAX_VERTICES {
            return Err(Error::malformed(format!(
                "{} vertices exceeds the maximum of {}",
                vertex_count, MAX_VERTICES
            )));
        }
        if offsets[0] != 0 {
            return Err(Error::malformed(format!(
                "offsets[0] is {}, expected 0",
                offsets[0]
            )));
        }
        if let Some(i) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(Error::malformed(format!(
                "offsets decrease at vertex {}: {} > {}",
                i,
                offsets[i],
                offsets[i + 1]
            )));
        }
        let last = offsets[vertex_count];
        if last != targets.len() as u64 {
            return Err(Error::malformed(format!(
                "offsets[{}] is {} but targets has {} entries",
                vertex_count,
                last,
                targets.len()
            )));
        }
        if let Some(i) = targets.iter().position(|&t| t as usize >= vertex_count) {
            return Err(Error::malformed(format!(
                "targets[{}] = {} is not a vertex of a {}-vertex graph",
                i, targets[i], vertex_count
            )));
        }

        Ok(Self { offsets, targets })
    }

    /// Build a CSR graph from directed `(from, to)` pairs.
    ///
    /// Edges keep their input order within each source vertex.
    pub fn from_edges<I>(vertex_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (VertexId, VertexId)>,
    {
        if vertex_count == 0 || vertex_count > MAX_VERTICES {
            return Err(Error::malformed(format!(
                "vertex_count must be in 1..={}, got {}",
                MAX_VERTICES, vertex_count
            )));
        }

        let edges: Vec<(VertexId, VertexId)> = edges.into_iter().collect();
        if let Some(&(from, to)) = edges
            .iter()
            .find(|&&(from, to)| from as usize >= vertex_count || to as usize >= vertex_count)
        {
            return Err(Error::malformed(format!(
                "edge {} -> {} references a vertex outside 0..{}",
                from, to, vertex_count
            )));
        }

        // Counting sort by source: degree histogram, prefix sum, then scatter.
        let mut offsets = vec![0u64; vertex_count + 1];
        for &(from, _) in &edges {
            offsets[from as usize + 1] += 1;
        }
        for i in 1..=vertex_count {
            offsets[i] += offsets[i - 1];
        }

        let mut cursor: Vec<u64> = offsets[..vertex_count].to_vec();
        let mut targets = vec![0 as VertexId; edges.len()];
        for (from, to) in edges {
            let slot = &mut cursor[from as usize];
            targets[*slot as usize] = to;
            *slot += 1;
        }

        Self::new(offsets, targets)
    }

    /// Build a CSR graph where every pair is stored in both directions.
    pub fn from_undirected_edges<I>(vertex_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (VertexId, VertexId)>,
    {
        Self::from_edges(
            vertex_count,
            edges
                .into_iter()
                .flat_map(|(a, b)| [(a, b), (b, a)]),
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// Whether `v` is a vertex of this graph.
    pub fn contains(&self, v: VertexId) -> bool {
        (v as usize) < self.vertex_count()
    }

    /// Outgoing neighbors of `v`, in storage order.
    ///
    /// Panics if `v` is not a vertex of this graph.
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        let v = v as usize;
        let start = self.offsets[v] as usize;
        let end = self.offsets[v + 1] as usize;
        &self.targets[start..end]
    }

    pub fn out_degree(&self, v: VertexId) -> usize {
        let v = v as usize;
        (self.offsets[v + 1] - self.offsets[v]) as usize
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn targets(&self) -> &[VertexId] {
        &self.targets
    }

    /// Give the arrays back to the caller.
    pub fn into_parts(self) -> (Vec<u64>, Vec<VertexId>) {
        (self.offsets, self.targets)
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        self.offsets.len() * size_of::<u64>() + self.targets.len() * size_of::<VertexId>()
    }
}
