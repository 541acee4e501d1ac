//! # Metrics Reporter
//!
//! Structural statistics per graph snapshot, collected into a tabular
//! report with one row per key (`"2018"`, `"2018_aligned"`, `"multiplex"`).
//! Keys are upserted: recomputing a snapshot replaces its row, and the CSV
//! file is rewritten whole, so re-runs never duplicate rows.

pub mod components;

pub use components::{ComponentSummary, strongly_connected, weakly_connected};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::DiMultigraph;
use crate::Result;

// ============================================================================
// Per-snapshot record
// ============================================================================

/// One row of the statistics table. Computed once from a graph snapshot and
/// never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Snapshot key: a year, `<year>_aligned`, or `multiplex`.
    pub key: String,
    pub nodes: usize,
    pub edges: usize,
    /// Directed simple-graph density `e / (n·(n-1))`. An approximation when
    /// parallel edges exist (it can exceed 1); defined as 0 for n ≤ 1.
    pub density: f64,
    pub self_loops: usize,
    pub mean_in_degree: f64,
    pub max_in_degree: usize,
    pub mean_out_degree: f64,
    pub max_out_degree: usize,
    pub weakly_connected_components: usize,
    pub largest_weakly_connected_component: usize,
    pub strongly_connected_components: usize,
    pub largest_strongly_connected_component: usize,
}

impl GraphStats {
    /// Compute every metric for one snapshot.
    pub fn compute(key: impl Into<String>, graph: &DiMultigraph) -> Self {
        let n = graph.node_count();
        let e = graph.edge_count();

        let density = if n <= 1 {
            0.0
        } else {
            e as f64 / (n as f64 * (n as f64 - 1.0))
        };
        let mean_degree = if n == 0 { 0.0 } else { e as f64 / n as f64 };

        let mut max_in = 0;
        let mut max_out = 0;
        for id in 0..n as u32 {
            max_in = max_in.max(graph.in_degree(id));
            max_out = max_out.max(graph.out_degree(id));
        }

        let wcc = weakly_connected(graph);
        let scc = strongly_connected(graph);

        Self {
            key: key.into(),
            nodes: n,
            edges: e,
            density,
            self_loops: graph.self_loop_count(),
            // Every edge contributes one in- and one out-degree, so both
            // means are e/n.
            mean_in_degree: mean_degree,
            max_in_degree: max_in,
            mean_out_degree: mean_degree,
            max_out_degree: max_out,
            weakly_connected_components: wcc.count,
            largest_weakly_connected_component: wcc.largest,
            strongly_connected_components: scc.count,
            largest_strongly_connected_component: scc.largest,
        }
    }
}

// ============================================================================
// The stats table
// ============================================================================

/// Keyed statistics rows with overwrite-on-rerun semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    rows: Vec<GraphStats>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the row with the same key.
    pub fn upsert(&mut self, stats: GraphStats) {
        match self.rows.iter_mut().find(|row| row.key == stats.key) {
            Some(row) => *row = stats,
            None => self.rows.push(stats),
        }
    }

    pub fn get(&self, key: &str) -> Option<&GraphStats> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in canonical report order: raw years ascending, then aligned
    /// years ascending, then the multiplex.
    pub fn rows(&self) -> Vec<&GraphStats> {
        let mut ordered: Vec<&GraphStats> = self.rows.iter().collect();
        ordered.sort_by_key(|row| Self::sort_key(&row.key));
        ordered
    }

    fn sort_key(key: &str) -> (u8, i64, String) {
        if key == "multiplex" {
            return (3, 0, String::new());
        }
        if let Ok(year) = key.parse::<i64>() {
            return (0, year, String::new());
        }
        if let Some(year) = key
            .strip_suffix("_aligned")
            .and_then(|y| y.parse::<i64>().ok())
        {
            return (1, year, String::new());
        }
        (2, 0, key.to_string())
    }

    /// Write the whole table, truncating any previous file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        for row in self.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a previously written table.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut table = StatsTable::new();
        for row in reader.deserialize::<GraphStats>() {
            table.upsert(row?);
        }
        Ok(table)
    }
}
