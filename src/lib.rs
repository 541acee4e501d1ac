//! # txgraph — Longitudinal Transaction-Graph Pipeline
//!
//! Turns multi-year blockchain transaction tables into a sequence of yearly
//! directed multigraphs, restricts them to a common set of significant
//! addresses, aligns their node sets for longitudinal comparison, and merges
//! them into a single year-tagged multiplex multigraph — plus per-snapshot
//! structural statistics.
//!
//! ## Design Principles
//!
//! 1. **Value types at the seams**: `DiMultigraph` is an owned node/edge
//!    collection passed between stage functions — no shared mutable graph state
//! 2. **Two-pass narrowing**: filtering down to the retained node set and
//!    padding back up to a common node set are distinct stages, so "isolated
//!    in year Y" and "absent from year Y" stay distinguishable artifacts
//! 3. **Row problems are counters, file problems are errors**: a malformed
//!    transaction row is skipped and counted; a missing yearly table or a
//!    violated alignment invariant aborts loudly
//! 4. **Idempotent artifacts**: every stage output is keyed by (stage, year)
//!    and overwritten on re-run, never appended
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use txgraph::{Pipeline, PipelineConfig};
//!
//! # fn example() -> txgraph::Result<()> {
//! let config = PipelineConfig::new("data", "out", vec![2018, 2019, 2020, 2021, 2022]);
//! let report = Pipeline::new(config).run()?;
//!
//! for (year, issues) in &report.row_issues {
//!     println!("{year}: {} rows skipped", issues.skipped());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline Stages
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Raw Graph Builder | `pipeline::build` | one multigraph per year |
//! | Node Selector | `pipeline::select` | retained address set |
//! | Intersection Filter | `pipeline::filter` | narrowed yearly graphs |
//! | Graph Aligner | `pipeline::align` | node-identical yearly graphs |
//! | Multiplex Merger | `pipeline::merge` | single multi-year multigraph |
//! | Metrics Reporter | `stats` | one CSV row per snapshot |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod ingest;
pub mod pipeline;
pub mod stats;
pub mod artifact;

// ============================================================================
// Re-exports: Model (the value types)
// ============================================================================

pub use model::{Address, DiMultigraph, GraphData, TxEdge, Year};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use pipeline::{
    EdgePolicy, NodeSet, Pipeline, PipelineConfig, PipelineReport, SelectionRule,
};

// ============================================================================
// Re-exports: Ingest & Stats
// ============================================================================

pub use ingest::RowIssues;
pub use stats::{GraphStats, StatsTable};

// ============================================================================
// Re-exports: Artifacts
// ============================================================================

pub use artifact::{ArtifactStore, Stage};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Expected yearly input table is absent. Fatal for that year's
    /// downstream stages only; other years keep processing.
    #[error("missing transaction table for year {year}: {path}")]
    MissingYearData { year: Year, path: String },

    /// The Node Selector produced an empty retained set — a configuration
    /// error surfaced before filtering, since it would otherwise silently
    /// yield all-empty graphs.
    #[error("node selection rule {rule} retained no addresses")]
    EmptyNodeSet { rule: String },

    /// Two yearly graphs disagree on node membership after alignment.
    /// This is a pipeline bug, never recoverable.
    #[error("node sets inconsistent after alignment (year {year}): {detail}")]
    InconsistentNodeSet { year: Year, detail: String },

    /// Artifact on disk does not match its expected shape.
    #[error("artifact error: {0}")]
    Artifact(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
