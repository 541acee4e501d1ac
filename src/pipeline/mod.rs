//! # Pipeline Stages & Orchestration
//!
//! The six stages of the longitudinal graph pipeline, each a pure function
//! over [`DiMultigraph`] values, plus the [`Pipeline`] runner that wires them
//! to ingestion, artifacts, and the stats table.
//!
//! ```text
//! yearly CSVs → build → raw graphs
//!                          ↓ select (one retained node set for ALL years)
//!                        filter → narrowed graphs
//!                          ↓ align (node-set union padding)
//!                        aligned graphs → merge → multiplex
//! ```
//!
//! The narrow-then-re-widen structure is deliberate and must stay two
//! stages: collapsing filter and align into one pass would make "address
//! isolated in year Y" indistinguishable from "address absent in year Y" in
//! the persisted artifacts.
//!
//! Stages before `align` are independent per year; `align` and `merge` are
//! the synchronization points that need every year in hand.

pub mod build;
pub mod select;
pub mod filter;
pub mod align;
pub mod merge;

pub use build::build_raw_graph;
pub use select::{NodeSet, SelectionRule, select_nodes};
pub use filter::narrow_to_nodes;
pub use align::align_node_sets;
pub use merge::merge_multiplex;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifact::{ArtifactStore, Stage};
use crate::ingest::{self, RowIssues};
use crate::model::{DiMultigraph, Year};
use crate::stats::{GraphStats, StatsTable};
use crate::{Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// Retention policy for edges at build time.
///
/// Applied uniformly to every year, and only at build time — later stages
/// never touch edge sets except to restrict them to retained endpoints.
/// Dropping an edge never drops its endpoints from the node table.
///
/// Defaults keep both: the study datasets count self-transfers and
/// zero-value contract calls as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePolicy {
    pub keep_self_loops: bool,
    pub keep_zero_value: bool,
}

impl Default for EdgePolicy {
    fn default() -> Self {
        Self { keep_self_loops: true, keep_zero_value: true }
    }
}

/// Full pipeline configuration. JSON-loadable for scripted runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding `transactions_<year>.csv` input tables.
    pub data_dir: PathBuf,
    /// Root directory for all produced artifacts.
    pub out_dir: PathBuf,
    /// Study years, processed in ascending order.
    pub years: Vec<Year>,
    #[serde(default)]
    pub selection: SelectionRule,
    #[serde(default)]
    pub policy: EdgePolicy,
}

impl PipelineConfig {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        years: Vec<Year>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            out_dir: out_dir.into(),
            years,
            selection: SelectionRule::default(),
            policy: EdgePolicy::default(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Input table path for one year.
    pub fn table_path(&self, year: Year) -> PathBuf {
        self.data_dir.join(format!("transactions_{year}.csv"))
    }
}

// ============================================================================
// Report
// ============================================================================

/// What a full run produced, beyond the on-disk artifacts.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Per-year skip counters from ingestion and edge policy.
    pub row_issues: BTreeMap<Year, RowIssues>,
    /// Years whose input table was absent. These years have no artifacts;
    /// all present years were still processed.
    pub missing_years: Vec<Year>,
    /// The stats table as written to `yearly_graph_stats.csv`.
    pub stats: StatsTable,
}

// ============================================================================
// Runner
// ============================================================================

/// Batch runner: sequential, single-threaded, one pass over the study years.
pub struct Pipeline {
    config: PipelineConfig,
    store: ArtifactStore,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let store = ArtifactStore::new(&config.out_dir);
        Self { config, store }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run every stage end to end, persisting each stage's artifact per year
    /// as soon as it exists. Re-running overwrites artifacts in place.
    pub fn run(&self) -> Result<PipelineReport> {
        let mut stats = StatsTable::new();
        let mut row_issues = BTreeMap::new();
        let mut missing_years = Vec::new();

        // Stage 1: per-year raw graphs. A missing table skips that year
        // only; every other failure aborts the run.
        let mut raw: BTreeMap<Year, DiMultigraph> = BTreeMap::new();
        let mut years: Vec<Year> = self.config.years.clone();
        years.sort_unstable();
        years.dedup();
        for year in years {
            let path = self.config.table_path(year);
            let (records, mut issues) = match ingest::read_year_table(&path, year) {
                Ok(read) => read,
                Err(Error::MissingYearData { year, path }) => {
                    warn!(year, path = %path, "year skipped: input table missing");
                    missing_years.push(year);
                    continue;
                }
                Err(other) => return Err(other),
            };

            let graph = build_raw_graph(year, &records, self.config.policy, &mut issues);
            info!(
                year,
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "built raw graph"
            );
            self.store.save_graph(Stage::Raw, year, &graph)?;
            stats.upsert(GraphStats::compute(year.to_string(), &graph));
            row_issues.insert(year, issues);
            raw.insert(year, graph);
        }

        // Stage 2: one retained node set, shared by every year.
        let retained = select_nodes(&self.config.selection, &raw)?;
        info!(
            rule = %retained.rule,
            retained = retained.len(),
            "selected retained node set"
        );
        self.store.save_node_set(&retained)?;

        // Stage 3: narrow each year to the retained set.
        let mut narrowed = BTreeMap::new();
        for (&year, graph) in &raw {
            let narrow = narrow_to_nodes(graph, &retained);
            info!(
                year,
                nodes = narrow.node_count(),
                edges = narrow.edge_count(),
                "narrowed graph to retained set"
            );
            self.store.save_graph(Stage::Narrowed, year, &narrow)?;
            narrowed.insert(year, narrow);
        }

        // Stage 4: pad every year up to the common node set.
        let aligned = align_node_sets(&narrowed)?;
        for (&year, graph) in &aligned {
            self.store.save_graph(Stage::Aligned, year, graph)?;
            stats.upsert(GraphStats::compute(format!("{year}_aligned"), graph));
        }

        // Stage 5: the multiplex union.
        let multiplex = merge_multiplex(&aligned)?;
        info!(
            nodes = multiplex.node_count(),
            edges = multiplex.edge_count(),
            "merged multiplex graph"
        );
        self.store.save_multiplex(&multiplex)?;
        stats.upsert(GraphStats::compute("multiplex", &multiplex));

        // Stage 6: the stats table, overwritten whole.
        stats.write_csv(&self.store.stats_path())?;

        Ok(PipelineReport { row_issues, missing_years, stats })
    }
}
