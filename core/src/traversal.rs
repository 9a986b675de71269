use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{CsrGraph, VertexId};
use crate::levels::LevelArray;

/// Receives one notification per completed BFS level.
///
/// `level` is the index of the frontier that was just expanded and
/// `frontier_size` is how many vertices it held. Observers cannot fail the
/// traversal and are never needed for correctness.
pub trait LevelObserver {
    fn level_completed(&mut self, level: u32, frontier_size: usize);
}

impl<F> LevelObserver for F
where
    F: FnMut(u32, usize),
{
    fn level_completed(&mut self, level: u32, frontier_size: usize) {
        self(level, frontier_size)
    }
}

/// Ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LevelObserver for NoopObserver {
    fn level_completed(&mut self, _level: u32, _frontier_size: usize) {}
}

/// Emits one `tracing` event per completed level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LevelObserver for TracingObserver {
    fn level_completed(&mut self, level: u32, frontier_size: usize) {
        tracing::info!(level, frontier_size, "completed level");
    }
}

/// Working state of a single traversal. Never outlives the call that
/// created it; the level buffer is borrowed from the caller.
struct TraversalState<'a> {
    level: &'a mut [u32],
    visited: Vec<bool>,
    frontier: Vec<VertexId>,
    next_frontier: Vec<VertexId>,
    /// Level assigned to vertices discovered in the current round.
    depth: u32,
}

impl<'a> TraversalState<'a> {
    /// Reset `level` to unreached and seed the frontier with `source`.
    fn new(level: &'a mut [u32], source: VertexId) -> Self {
        let vertex_count = level.len();
        level.fill(LevelArray::UNREACHED);
        let mut visited = vec![false; vertex_count];
        let mut frontier = Vec::with_capacity(vertex_count);

        level[source as usize] = 0;
        visited[source as usize] = true;
        frontier.push(source);

        Self {
            level,
            visited,
            frontier,
            next_frontier: Vec::with_capacity(vertex_count),
            depth: 1,
        }
    }

    fn is_done(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Scan the CSR range of every frontier vertex and claim unvisited
    /// neighbors for the current depth.
    fn expand(&mut self, graph: &CsrGraph) -> Result<()> {
        let depth = self.depth;
        for &v in &self.frontier {
            for &u in graph.neighbors(v) {
                let ui = u as usize;
                if !self.visited[ui] {
                    if depth == LevelArray::UNREACHED {
                        return Err(Error::LevelOverflow { depth });
                    }
                    self.visited[ui] = true;
                    self.level[ui] = depth;
                    self.next_frontier.push(u);
                }
            }
        }
        Ok(())
    }

    /// Hand the discovered vertices over as the next frontier.
    fn advance(&mut self) {
        std::mem::swap(&mut self.frontier, &mut self.next_frontier);
        self.next_frontier.clear();
        self.frontier.sort_unstable();
        self.depth = self.depth.saturating_add(1);
    }
}

fn check_vertex(graph: &CsrGraph, v: VertexId) -> Result<()> {
    if graph.contains(v) {
        Ok(())
    } else {
        Err(Error::InvalidSource {
            vertex: v,
            vertex_count: graph.vertex_count(),
        })
    }
}

/// Breadth-first levels from `source` to every vertex of `graph`.
///
/// Equivalent to [`traverse_with_observer`] with a [`NoopObserver`].
pub fn traverse(graph: &CsrGraph, source: VertexId) -> Result<LevelArray> {
    traverse_with_observer(graph, source, &mut NoopObserver)
}

/// Level-synchronous BFS: expand the whole frontier at depth `d` before
/// touching anything at depth `d + 1`.
///
/// Each vertex is claimed the first time any edge reaches it, which is
/// always along a shortest path since every shallower level has already
/// been fully expanded. The observer hears about every level, including
/// the last one (whose expansion discovers nothing).
///
/// Fails with [`Error::InvalidSource`] if `source` is not a vertex of
/// `graph`. No levels are returned on failure.
pub fn traverse_with_observer<O>(
    graph: &CsrGraph,
    source: VertexId,
    observer: &mut O,
) -> Result<LevelArray>
where
    O: LevelObserver + ?Sized,
{
    let mut levels = Vec::new();
    traverse_into(graph, source, &mut levels, observer)?;
    Ok(LevelArray::from_raw(levels))
}

/// Same traversal as [`traverse_with_observer`], writing into a buffer the
/// caller owns.
///
/// `levels` is resized to `vertex_count` and reset to
/// [`LevelArray::UNREACHED`] before the traversal, so one buffer can be
/// reused across sources and graphs without reallocating. If the traversal
/// fails after it started, the buffer is left entirely unreached.
pub fn traverse_into<O>(
    graph: &CsrGraph,
    source: VertexId,
    levels: &mut Vec<u32>,
    observer: &mut O,
) -> Result<()>
where
    O: LevelObserver + ?Sized,
{
    check_vertex(graph, source)?;
    let vertex_count = graph.vertex_count();

    debug!(vertex_count, source, "starting level-synchronous bfs");

    levels.clear();
    levels.resize(vertex_count, LevelArray::UNREACHED);

    let mut state = TraversalState::new(levels, source);
    let mut reached = 0usize;

    while !state.is_done() {
        if let Err(e) = state.expand(graph) {
            state.level.fill(LevelArray::UNREACHED);
            return Err(e);
        }
        let frontier_size = state.frontier.len();
        reached += frontier_size;
        observer.level_completed(state.depth - 1, frontier_size);
        state.advance();
    }

    // depth was bumped once past the final (empty) round.
    let rounds = state.depth - 1;
    debug!(source, levels = rounds, reached, "bfs complete");

    Ok(())
}

/// Whether any path leads from `from` to `to`. A vertex always reaches
/// itself.
///
/// Runs the same level-by-level expansion as [`traverse`] but stops at the
/// end of the round that first claims `to`.
pub fn has_path(graph: &CsrGraph, from: VertexId, to: VertexId) -> Result<bool> {
    check_vertex(graph, from)?;
    if !graph.contains(to) {
        return Err(Error::InvalidTarget {
            vertex: to,
            vertex_count: graph.vertex_count(),
        });
    }

    let mut levels = vec![LevelArray::UNREACHED; graph.vertex_count()];
    let mut state = TraversalState::new(&mut levels, from);

    while !state.visited[to as usize] {
        if state.is_done() {
            return Ok(false);
        }
        state.expand(graph)?;
        state.advance();
    }

    debug!(from, to, level = state.level[to as usize], "path found");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const U: u32 = LevelArray::UNREACHED;

    fn make_path(n: u32) -> CsrGraph {
        CsrGraph::from_undirected_edges(n as usize, (0..n - 1).map(|i| (i, i + 1))).unwrap()
    }

    fn make_chain(n: u32) -> CsrGraph {
        CsrGraph::from_edges(n as usize, (0..n - 1).map(|i| (i, i + 1))).unwrap()
    }

    fn make_star(leaves: u32) -> CsrGraph {
        CsrGraph::from_undirected_edges(leaves as usize + 1, (1..=leaves).map(|i| (0, i)))
            .unwrap()
    }

    fn make_cycle(n: u32) -> CsrGraph {
        CsrGraph::from_edges(n as usize, (0..n).map(|i| (i, (i + 1) % n))).unwrap()
    }

    fn record_levels(graph: &CsrGraph, source: VertexId) -> (LevelArray, Vec<(u32, usize)>) {
        let mut reports = Vec::new();
        let mut record = |level: u32, size: usize| reports.push((level, size));
        let levels = traverse_with_observer(graph, source, &mut record).unwrap();
        (levels, reports)
    }

    // --- Scenarios ---

    #[test]
    fn test_bfs_path() {
        let g = make_path(5);
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_bfs_path_isolated_vertex() {
        let g = CsrGraph::from_undirected_edges(6, (0..4).map(|i| (i, i + 1))).unwrap();
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.as_slice(), &[0, 1, 2, 3, 4, U]);
        assert_eq!(levels.get(5), None);
    }

    #[test]
    fn test_bfs_self_loop() {
        let mut edges: Vec<(u32, u32)> = (0..4).flat_map(|i| [(i, i + 1), (i + 1, i)]).collect();
        edges.push((0, 0));
        let g = CsrGraph::from_edges(5, edges).unwrap();
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_bfs_star() {
        let g = make_star(10);
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.get(0), Some(0));
        assert!((1..=10).all(|v| levels.get(v) == Some(1)));
        assert_eq!(levels.level_sizes(), vec![1, 10]);
    }

    #[test]
    fn test_bfs_two_components() {
        let g = CsrGraph::from_undirected_edges(4, vec![(0, 1), (2, 3)]).unwrap();
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.as_slice(), &[0, 1, U, U]);
        assert_eq!(levels.reached_count(), 2);
    }

    #[test]
    fn test_bfs_long_path_no_overflow() {
        let g = make_path(300);
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.get(299), Some(299));
        assert_eq!(levels.max_level(), Some(299));
    }

    // --- Edge cases ---

    #[test]
    fn test_bfs_source_without_out_edges() {
        // 1 -> 0, but 0 has no outgoing edges
        let g = CsrGraph::from_edges(2, vec![(1, 0)]).unwrap();
        let (levels, reports) = record_levels(&g, 0);
        assert_eq!(levels.as_slice(), &[0, U]);
        assert_eq!(reports, vec![(0, 1)]);
    }

    #[test]
    fn test_bfs_single_vertex() {
        let g = CsrGraph::new(vec![0, 0], vec![]).unwrap();
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.as_slice(), &[0]);
    }

    #[test]
    fn test_bfs_directed_chain_from_middle() {
        let g = make_chain(5);
        let levels = traverse(&g, 2).unwrap();
        assert_eq!(levels.as_slice(), &[U, U, 0, 1, 2]);
    }

    #[test]
    fn test_bfs_cycle_no_infinite_loop() {
        let g = make_cycle(5);
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_bfs_parallel_edges() {
        let g = CsrGraph::from_edges(3, vec![(0, 1), (0, 1), (0, 1), (1, 2), (1, 2)]).unwrap();
        let (levels, reports) = record_levels(&g, 0);
        assert_eq!(levels.as_slice(), &[0, 1, 2]);
        // Node 1 discovered once despite three parallel edges
        assert_eq!(reports, vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_bfs_shortcut_wins() {
        // 0 -> 1 -> 2 -> 3 and a shortcut 0 -> 3
        let g = CsrGraph::from_edges(4, vec![(0, 1), (1, 2), (2, 3), (0, 3)]).unwrap();
        let levels = traverse(&g, 0).unwrap();
        assert_eq!(levels.as_slice(), &[0, 1, 2, 1]);
    }

    #[test]
    fn test_bfs_invalid_source() {
        let g = make_path(3);
        assert_eq!(
            traverse(&g, 3),
            Err(Error::InvalidSource {
                vertex: 3,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn test_bfs_invalid_source_skips_observer() {
        let g = make_path(3);
        let mut calls = 0;
        let result = traverse_with_observer(&g, 99, &mut |_: u32, _: usize| calls += 1);
        assert!(result.is_err());
        assert_eq!(calls, 0);
    }

    // --- Determinism ---

    #[test]
    fn test_bfs_repeat_identical() {
        let g = make_star(50);
        let first = traverse(&g, 7).unwrap();
        let second = traverse(&g, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bfs_edge_order_irrelevant() {
        let forward = CsrGraph::from_edges(4, vec![(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)]).unwrap();
        let reversed = CsrGraph::from_edges(4, vec![(0, 3), (0, 2), (0, 1), (2, 3), (1, 3)]).unwrap();
        assert_eq!(traverse(&forward, 0).unwrap(), traverse(&reversed, 0).unwrap());
    }

    // --- Observer ---

    #[test]
    fn test_observer_reports_every_level() {
        let g = make_path(5);
        let (_, reports) = record_levels(&g, 2);
        // Level 0: {2}, level 1: {1, 3}, level 2: {0, 4}
        assert_eq!(reports, vec![(0, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_observer_sizes_sum_to_reached() {
        let g = CsrGraph::from_undirected_edges(7, vec![(0, 1), (0, 2), (1, 3), (2, 4), (5, 6)])
            .unwrap();
        let (levels, reports) = record_levels(&g, 0);
        let total: usize = reports.iter().map(|&(_, n)| n).sum();
        assert_eq!(total, levels.reached_count());
        assert_eq!(total, 5);
    }

    #[test]
    fn test_observer_matches_level_sizes() {
        let g = make_star(20);
        let (levels, reports) = record_levels(&g, 3);
        let sizes: Vec<usize> = reports.iter().map(|&(_, n)| n).collect();
        assert_eq!(sizes, levels.level_sizes());
    }

    #[test]
    fn test_tracing_observer_is_usable() {
        let g = make_path(4);
        let levels = traverse_with_observer(&g, 0, &mut TracingObserver).unwrap();
        assert_eq!(levels.max_level(), Some(3));
    }

    // --- State ---

    #[test]
    fn test_state_frontier_sorted_after_advance() {
        // Neighbors stored in descending order
        let g = CsrGraph::from_edges(5, vec![(0, 4), (0, 3), (0, 2), (0, 1)]).unwrap();
        let mut levels = vec![0; 5];
        let mut state = TraversalState::new(&mut levels, 0);
        state.expand(&g).unwrap();
        assert_eq!(state.next_frontier, vec![4, 3, 2, 1]);
        state.advance();
        assert_eq!(state.frontier, vec![1, 2, 3, 4]);
        assert!(state.next_frontier.is_empty());
        assert_eq!(state.depth, 2);
    }

    #[test]
    fn test_state_level_overflow_only_on_discovery() {
        // Self-loop only: the round at the sentinel depth claims nothing
        let g = CsrGraph::from_edges(1, vec![(0, 0)]).unwrap();
        let mut levels = vec![0; 1];
        let mut state = TraversalState::new(&mut levels, 0);
        state.depth = LevelArray::UNREACHED;
        assert_eq!(state.expand(&g), Ok(()));
        assert!(state.next_frontier.is_empty());
    }

    #[test]
    fn test_state_level_overflow_on_claim() {
        let g = make_path(2);
        let mut levels = vec![0; 2];
        let mut state = TraversalState::new(&mut levels, 0);
        state.depth = LevelArray::UNREACHED;
        assert_eq!(
            state.expand(&g),
            Err(Error::LevelOverflow {
                depth: LevelArray::UNREACHED
            })
        );
        // Vertex 1 was not given the sentinel as a level
        assert!(!state.visited[1]);
    }

    // --- Caller-owned buffer ---

    #[test]
    fn test_traverse_into_matches_traverse() {
        let g = CsrGraph::from_undirected_edges(7, vec![(0, 1), (0, 2), (1, 3), (2, 4), (5, 6)])
            .unwrap();
        let mut buf = Vec::new();
        for source in 0..7 {
            traverse_into(&g, source, &mut buf, &mut NoopObserver).unwrap();
            assert_eq!(buf.as_slice(), traverse(&g, source).unwrap().as_slice());
        }
    }

    #[test]
    fn test_traverse_into_resets_stale_buffer() {
        let g = CsrGraph::from_undirected_edges(4, vec![(0, 1), (2, 3)]).unwrap();
        // Stale contents and the wrong length
        let mut buf = vec![7, 7, 7, 7, 7, 7];
        traverse_into(&g, 0, &mut buf, &mut NoopObserver).unwrap();
        assert_eq!(buf, vec![0, 1, U, U]);

        // Reused for another source: the old component goes back to unreached
        traverse_into(&g, 3, &mut buf, &mut NoopObserver).unwrap();
        assert_eq!(buf, vec![U, U, 1, 0]);
    }

    #[test]
    fn test_traverse_into_reused_across_graphs() {
        let small = make_path(3);
        let large = make_path(6);
        let mut buf = Vec::new();
        traverse_into(&large, 0, &mut buf, &mut NoopObserver).unwrap();
        traverse_into(&small, 2, &mut buf, &mut NoopObserver).unwrap();
        assert_eq!(buf, vec![2, 1, 0]);
    }

    #[test]
    fn test_traverse_into_invalid_source_leaves_buffer() {
        let g = make_path(3);
        let mut buf = vec![5, 5];
        let result = traverse_into(&g, 3, &mut buf, &mut NoopObserver);
        assert!(matches!(result, Err(Error::InvalidSource { vertex: 3, .. })));
        assert_eq!(buf, vec![5, 5]);
    }

    #[test]
    fn test_traverse_into_reports_levels() {
        let g = make_path(5);
        let mut buf = Vec::new();
        let mut reports = Vec::new();
        let mut record = |level: u32, size: usize| reports.push((level, size));
        traverse_into(&g, 2, &mut buf, &mut record).unwrap();
        assert_eq!(reports, vec![(0, 1), (1, 2), (2, 2)]);
    }

    // --- has_path ---

    #[test]
    fn test_has_path_directed() {
        let g = make_chain(5);
        assert_eq!(has_path(&g, 0, 4), Ok(true));
        assert_eq!(has_path(&g, 4, 0), Ok(false));
        assert_eq!(has_path(&g, 2, 3), Ok(true));
    }

    #[test]
    fn test_has_path_self() {
        let g = CsrGraph::new(vec![0, 0, 0], vec![]).unwrap();
        assert_eq!(has_path(&g, 1, 1), Ok(true));
        assert_eq!(has_path(&g, 0, 1), Ok(false));
    }

    #[test]
    fn test_has_path_components() {
        let g = CsrGraph::from_undirected_edges(4, vec![(0, 1), (2, 3)]).unwrap();
        assert_eq!(has_path(&g, 1, 0), Ok(true));
        assert_eq!(has_path(&g, 0, 3), Ok(false));
    }

    #[test]
    fn test_has_path_agrees_with_levels() {
        let g = make_cycle(6);
        let levels = traverse(&g, 2).unwrap();
        for v in 0..6 {
            assert_eq!(has_path(&g, 2, v).unwrap(), levels.is_reached(v));
        }
    }

    #[test]
    fn test_has_path_invalid_vertices() {
        let g = make_path(3);
        assert_eq!(
            has_path(&g, 3, 0),
            Err(Error::InvalidSource {
                vertex: 3,
                vertex_count: 3
            })
        );
        assert_eq!(
            has_path(&g, 0, 9),
            Err(Error::InvalidTarget {
                vertex: 9,
                vertex_count: 3
            })
        );
    }
}
