use crate::graph::VertexId;

/// Per-vertex BFS levels produced by a traversal.
///
/// Entry `v` is the number of edges on a shortest path from the source to
/// `v`, or [`LevelArray::UNREACHED`] when no path exists. The sentinel is
/// never a valid level: graphs are capped at `u32::MAX` vertices, so the
/// deepest reachable level is `u32::MAX - 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LevelArray {
    levels: Vec<u32>,
}

impl LevelArray {
    /// Marks a vertex with no path from the source.
    pub const UNREACHED: u32 = u32::MAX;

    pub(crate) fn from_raw(levels: Vec<u32>) -> Self {
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level of `v`, or `None` if `v` was not reached (or is out of range).
    pub fn get(&self, v: VertexId) -> Option<u32> {
        self.levels
            .get(v as usize)
            .copied()
            .filter(|&l| l != Self::UNREACHED)
    }

    pub fn is_reached(&self, v: VertexId) -> bool {
        self.get(v).is_some()
    }

    /// Number of vertices reached, source included.
    pub fn reached_count(&self) -> usize {
        self.levels.iter().filter(|&&l| l != Self::UNREACHED).count()
    }

    /// Deepest level reached, i.e. the eccentricity of the source within
    /// its reachable set.
    pub fn max_level(&self) -> Option<u32> {
        self.levels
            .iter()
            .copied()
            .filter(|&l| l != Self::UNREACHED)
            .max()
    }

    /// Number of vertices at each level; index `i` holds the size of level `i`.
    pub fn level_sizes(&self) -> Vec<usize> {
        let mut sizes = match self.max_level() {
            Some(max) => vec![0usize; max as usize + 1],
            None => return Vec::new(),
        };
        for &l in &self.levels {
            if l != Self::UNREACHED {
                sizes[l as usize] += 1;
            }
        }
        sizes
    }

    /// `(vertex, level)` pairs in vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, Option<u32>)> + '_ {
        self.levels.iter().enumerate().map(|(v, &l)| {
            let level = if l == Self::UNREACHED { None } else { Some(l) };
            (v as VertexId, level)
        })
    }

    /// Raw levels, with unreached vertices holding [`LevelArray::UNREACHED`].
    pub fn as_slice(&self) -> &[u32] {
        &self.levels
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.levels
    }
}

impl AsRef<[u32]> for LevelArray {
    fn as_ref(&self) -> &[u32] {
        &self.levels
    }
}
