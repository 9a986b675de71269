use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use levelsync_core::{
    traverse_with_observer, CsrGraph, LevelArray, LevelObserver, NoopObserver, TracingObserver,
    VertexId,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Level rows shown in full before the table is elided.
const MAX_TABLE_ROWS: usize = 20;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Benchmark level-synchronous BFS on synthetic CSR graphs",
    long_about = None
)]
struct Args {
    /// Graph family to generate
    #[arg(
        short = 'g',
        long,
        value_enum,
        env = "LEVELSYNC_GRAPH",
        default_value_t = GraphSelection::All
    )]
    graph: GraphSelection,

    /// Target vertex count for each generated graph
    #[arg(short = 'n', long, env = "LEVELSYNC_VERTICES", default_value_t = 1_000_000)]
    vertices: u32,

    /// Source vertex for the traversal
    #[arg(short = 's', long, default_value_t = 0)]
    source: VertexId,

    /// Seed for the random generators
    #[arg(long, env = "LEVELSYNC_SEED", default_value_t = 42)]
    seed: u64,

    /// Log every completed level
    #[arg(long)]
    progress: bool,

    /// Print one JSON report per graph instead of a table
    #[arg(long)]
    json: bool,
}

/// `--graph` value: one generator, or all of them in turn.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum GraphSelection {
    /// Every generator below
    All,
    /// Undirected path (diameter n - 1)
    Chain,
    /// Hub connected to every other vertex
    Star,
    /// Undirected 2-D lattice
    Grid,
    /// Directed ternary tree rooted at 0
    Tree,
    /// Erdos-Renyi, ~10 directed edges per vertex
    Random,
    /// Two random halves with no edges between them
    Components,
}

impl GraphSelection {
    fn kinds(self) -> Vec<GraphKind> {
        match self {
            GraphSelection::All => GraphKind::ALL.to_vec(),
            GraphSelection::Chain => vec![GraphKind::Chain],
            GraphSelection::Star => vec![GraphKind::Star],
            GraphSelection::Grid => vec![GraphKind::Grid],
            GraphSelection::Tree => vec![GraphKind::Tree],
            GraphSelection::Random => vec![GraphKind::Random],
            GraphSelection::Components => vec![GraphKind::Components],
        }
    }
}

/// A concrete graph generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GraphKind {
    Chain,
    Star,
    Grid,
    Tree,
    Random,
    Components,
}

impl GraphKind {
    const ALL: [GraphKind; 6] = [
        GraphKind::Chain,
        GraphKind::Star,
        GraphKind::Grid,
        GraphKind::Tree,
        GraphKind::Random,
        GraphKind::Components,
    ];

    fn name(self) -> &'static str {
        match self {
            GraphKind::Chain => "Chain",
            GraphKind::Star => "Star",
            GraphKind::Grid => "Grid",
            GraphKind::Tree => "Ternary tree",
            GraphKind::Random => "Erdos-Renyi random",
            GraphKind::Components => "Components (two halves)",
        }
    }

    fn generate(self, n: u32, seed: u64) -> levelsync_core::Result<CsrGraph> {
        match self {
            GraphKind::Chain => gen_chain(n),
            GraphKind::Star => gen_star(n),
            GraphKind::Grid => gen_grid(n),
            GraphKind::Tree => gen_tree(n),
            GraphKind::Random => gen_random(n, seed),
            GraphKind::Components => gen_components(n, seed),
        }
    }
}

/// One benchmark run, as emitted with `--json`.
#[derive(Debug, Serialize)]
struct Report {
    graph: &'static str,
    vertices: usize,
    edges: usize,
    memory_bytes: usize,
    source: VertexId,
    reached: usize,
    max_level: Option<u32>,
    level_sizes: Vec<usize>,
    build_ms: f64,
    traverse_ms: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    if args.vertices == 0 {
        bail!("--vertices must be at least 1");
    }

    if !args.json {
        println!("levelsync-bench");
        println!("===============");
        println!();
    }

    for kind in args.graph.kinds() {
        let report = run_benchmark(kind, &args)
            .with_context(|| format!("{} benchmark failed", kind.name()))?;
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(&report);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_benchmark(kind: GraphKind, args: &Args) -> anyhow::Result<Report> {
    info!(graph = kind.name(), target_vertices = args.vertices, "generating graph");

    let t = Instant::now();
    let graph = kind
        .generate(args.vertices, args.seed)
        .context("generating CSR graph")?;
    let build_ms = t.elapsed().as_secs_f64() * 1000.0;

    let mut tracing_observer = TracingObserver;
    let mut noop = NoopObserver;
    let observer: &mut dyn LevelObserver = if args.progress {
        &mut tracing_observer
    } else {
        &mut noop
    };

    let t = Instant::now();
    let levels = traverse_with_observer(&graph, args.source, observer)
        .with_context(|| format!("traversing from vertex {}", args.source))?;
    let traverse_ms = t.elapsed().as_secs_f64() * 1000.0;

    Ok(build_report(kind, &graph, args.source, &levels, build_ms, traverse_ms))
}

fn build_report(
    kind: GraphKind,
    graph: &CsrGraph,
    source: VertexId,
    levels: &LevelArray,
    build_ms: f64,
    traverse_ms: f64,
) -> Report {
    Report {
        graph: kind.name(),
        vertices: graph.vertex_count(),
        edges: graph.edge_count(),
        memory_bytes: graph.memory_usage(),
        source,
        reached: levels.reached_count(),
        max_level: levels.max_level(),
        level_sizes: levels.level_sizes(),
        build_ms,
        traverse_ms,
    }
}

fn print_report(report: &Report) {
    println!("--- {} ---", report.graph);
    println!(
        "Built in {:.1}ms: {} vertices, {} edges, ~{:.1}MB",
        report.build_ms,
        report.vertices,
        report.edges,
        report.memory_bytes as f64 / 1_048_576.0
    );
    println!(
        "Traversed from {} in {:.1}ms: {} reached, {} unreached",
        report.source,
        report.traverse_ms,
        report.reached,
        report.vertices - report.reached
    );

    println!();
    println!("{:>8} {:>12}", "level", "size");
    println!("{:->8} {:->12}", "", "");

    let sizes = &report.level_sizes;
    if sizes.len() <= MAX_TABLE_ROWS {
        for (level, size) in sizes.iter().enumerate() {
            println!("{:>8} {:>12}", level, size);
        }
    } else {
        let tail = MAX_TABLE_ROWS / 4;
        let head = MAX_TABLE_ROWS - tail;
        for (level, size) in sizes.iter().enumerate().take(head) {
            println!("{:>8} {:>12}", level, size);
        }
        println!("{:>8} ({} levels elided)", "...", sizes.len() - head - tail);
        for (level, size) in sizes.iter().enumerate().skip(sizes.len() - tail) {
            println!("{:>8} {:>12}", level, size);
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: O(n + edges), single-threaded, deterministic for a given seed
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
}

fn gen_chain(n: u32) -> levelsync_core::Result<CsrGraph> {
    CsrGraph::from_undirected_edges(n as usize, (1..n).map(|i| (i - 1, i)))
}

fn gen_star(n: u32) -> levelsync_core::Result<CsrGraph> {
    CsrGraph::from_undirected_edges(n as usize, (1..n).map(|i| (0, i)))
}

/// Near-square lattice; the vertex count is rounded down to `width * height`.
fn gen_grid(n: u32) -> levelsync_core::Result<CsrGraph> {
    let width = ((n as f64).sqrt() as u32).max(1);
    let height = n / width;
    let count = width * height;

    let mut edges = Vec::with_capacity(count as usize * 2);
    for row in 0..height {
        for col in 0..width {
            let v = row * width + col;
            if col + 1 < width {
                edges.push((v, v + 1));
            }
            if row + 1 < height {
                edges.push((v, v + width));
            }
        }
    }

    CsrGraph::from_undirected_edges(count as usize, edges)
}

/// Each vertex `v > 0` hangs off parent `(v - 1) / 3`. Edges point away from
/// the root, so only the subtree of the source is reachable.
fn gen_tree(n: u32) -> levelsync_core::Result<CsrGraph> {
    let branching = 3u32;
    CsrGraph::from_edges(n as usize, (1..n).map(|v| ((v - 1) / branching, v)))
}

fn gen_random(n: u32, seed: u64) -> levelsync_core::Result<CsrGraph> {
    let mut rng = FastRng::new(seed);
    let target_edges = n as u64 * 10;

    let mut edges = Vec::with_capacity(target_edges as usize);
    for _ in 0..target_edges {
        let from = rng.next(n as u64) as VertexId;
        let to = rng.next(n as u64) as VertexId;
        if from != to {
            edges.push((from, to));
        }
    }

    CsrGraph::from_edges(n as usize, edges)
}

/// Two random undirected halves. A source in one half leaves the other
/// half entirely unreached.
fn gen_components(n: u32, seed: u64) -> levelsync_core::Result<CsrGraph> {
    let mut rng = FastRng::new(seed ^ 0x9E37_79B9_7F4A_7C15);
    let half = (n / 2).max(1);
    let second = n - half;

    let mut edges = Vec::with_capacity(n as usize * 5);
    for (start, size) in [(0, half), (half, second)] {
        if size < 2 {
            continue;
        }
        // Spanning path keeps each half connected.
        edges.extend((start + 1..start + size).map(|v| (v - 1, v)));
        for _ in 0..size as u64 * 4 {
            let a = start + rng.next(size as u64) as VertexId;
            let b = start + rng.next(size as u64) as VertexId;
            edges.push((a, b));
        }
    }

    CsrGraph::from_undirected_edges(n as usize, edges)
}
