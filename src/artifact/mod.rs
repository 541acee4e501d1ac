//! # Artifact Store
//!
//! On-disk layout for every pipeline output, keyed by (stage, year) so each
//! artifact is an idempotent, overwritable unit — a failed run resumes by
//! re-running, and nothing is ever appended to.
//!
//! ```text
//! <out_dir>/
//!   graphs/
//!     raw/transactions_<year>.json|.gexf
//!     narrowed/transactions_<year>.json|.gexf
//!     aligned/transactions_<year>.json|.gexf
//!     multiplex.json|.gexf
//!   nodes/retained_<rule-key>.json
//!   yearly_graph_stats.csv
//! ```
//!
//! Graphs are written twice: JSON (`GraphData`, the reloadable form) and
//! GEXF (the Gephi-facing export). Attribute keys and the string node ids
//! are identical in both so downstream tools can join on address identity
//! at any stage.

pub mod gexf;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::{DiMultigraph, GraphData, Year};
use crate::pipeline::{NodeSet, SelectionRule};
use crate::Result;

// ============================================================================
// Stage keys
// ============================================================================

/// Which per-year artifact a graph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Raw,
    Narrowed,
    Aligned,
}

impl Stage {
    fn dir(self) -> &'static str {
        match self {
            Stage::Raw => "raw",
            Stage::Narrowed => "narrowed",
            Stage::Aligned => "aligned",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir())
    }
}

// ============================================================================
// Store
// ============================================================================

/// All artifact paths and read/write operations under one output root.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // Paths
    // ========================================================================

    pub fn graph_path(&self, stage: Stage, year: Year) -> PathBuf {
        self.root
            .join("graphs")
            .join(stage.dir())
            .join(format!("transactions_{year}.json"))
    }

    pub fn multiplex_path(&self) -> PathBuf {
        self.root.join("graphs").join("multiplex.json")
    }

    pub fn node_set_path(&self, rule: &SelectionRule) -> PathBuf {
        self.root
            .join("nodes")
            .join(format!("retained_{}.json", rule.key()))
    }

    pub fn stats_path(&self) -> PathBuf {
        self.root.join("yearly_graph_stats.csv")
    }

    // ========================================================================
    // Graphs
    // ========================================================================

    /// Write one stage's yearly graph: JSON plus the GEXF export next to it.
    pub fn save_graph(&self, stage: Stage, year: Year, graph: &DiMultigraph) -> Result<()> {
        self.write_graph_files(&self.graph_path(stage, year), graph)
    }

    pub fn load_graph(&self, stage: Stage, year: Year) -> Result<DiMultigraph> {
        self.read_graph(&self.graph_path(stage, year))
    }

    pub fn save_multiplex(&self, graph: &DiMultigraph) -> Result<()> {
        self.write_graph_files(&self.multiplex_path(), graph)
    }

    pub fn load_multiplex(&self) -> Result<DiMultigraph> {
        self.read_graph(&self.multiplex_path())
    }

    fn write_graph_files(&self, json_path: &Path, graph: &DiMultigraph) -> Result<()> {
        if let Some(parent) = json_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(json_path)?;
        serde_json::to_writer(BufWriter::new(file), &graph.to_data())?;

        let gexf_path = json_path.with_extension("gexf");
        let mut writer = BufWriter::new(File::create(&gexf_path)?);
        gexf::write_gexf(&mut writer, graph)?;
        debug!(path = %json_path.display(), "wrote graph artifact");
        Ok(())
    }

    fn read_graph(&self, json_path: &Path) -> Result<DiMultigraph> {
        let file = File::open(json_path)?;
        let data: GraphData = serde_json::from_reader(BufReader::new(file))?;
        Ok(DiMultigraph::from_data(data))
    }

    // ========================================================================
    // Node set
    // ========================================================================

    /// Persist the retained set, keyed by its selection rule, so later
    /// stages can re-run without re-selecting.
    pub fn save_node_set(&self, node_set: &NodeSet) -> Result<()> {
        let path = self.node_set_path(&node_set.rule);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), node_set)?;
        debug!(path = %path.display(), "wrote node-set artifact");
        Ok(())
    }

    /// Load the cached node set for `rule`, or `None` if it was never
    /// computed with these parameters.
    pub fn load_node_set(&self, rule: &SelectionRule) -> Result<Option<NodeSet>> {
        let path = self.node_set_path(rule);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path)?;
        let node_set: NodeSet = serde_json::from_reader(BufReader::new(file))?;
        if node_set.rule != *rule {
            return Err(crate::Error::Artifact(format!(
                "node set at {} was computed with rule {}, expected {}",
                path.display(),
                node_set.rule,
                rule
            )));
        }
        Ok(Some(node_set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Address;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_graph_round_trip() {
        let (_dir, store) = store();
        let mut g = DiMultigraph::new();
        g.add_edge(addr("0xa"), addr("0xb"), 2018, 1.0);
        g.add_edge(addr("0xa"), addr("0xb"), 2018, 2.0);

        store.save_graph(Stage::Raw, 2018, &g).unwrap();
        let loaded = store.load_graph(Stage::Raw, 2018).unwrap();
        assert_eq!(loaded.to_data(), g.to_data());

        // GEXF export written next to the JSON.
        assert!(store.graph_path(Stage::Raw, 2018).with_extension("gexf").exists());
    }

    #[test]
    fn test_save_overwrites_in_place() {
        let (_dir, store) = store();
        let mut g = DiMultigraph::new();
        g.add_edge(addr("0xa"), addr("0xb"), 2018, 1.0);
        store.save_graph(Stage::Raw, 2018, &g).unwrap();

        let empty = DiMultigraph::new();
        store.save_graph(Stage::Raw, 2018, &empty).unwrap();
        assert_eq!(store.load_graph(Stage::Raw, 2018).unwrap().node_count(), 0);
    }

    #[test]
    fn test_stage_paths_are_distinct() {
        let (_dir, store) = store();
        let paths = [
            store.graph_path(Stage::Raw, 2018),
            store.graph_path(Stage::Narrowed, 2018),
            store.graph_path(Stage::Aligned, 2018),
            store.multiplex_path(),
        ];
        for (i, a) in paths.iter().enumerate() {
            for b in &paths[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_node_set_round_trip_and_rule_key() {
        let (_dir, store) = store();
        let node_set = NodeSet {
            rule: SelectionRule::TopByDegree { count: 2 },
            addresses: [addr("0xa"), addr("0xb")].into(),
        };
        store.save_node_set(&node_set).unwrap();

        let loaded = store
            .load_node_set(&SelectionRule::TopByDegree { count: 2 })
            .unwrap()
            .unwrap();
        assert_eq!(loaded, node_set);

        // Different parameters: different artifact, not found.
        let other = store
            .load_node_set(&SelectionRule::TopByDegree { count: 9 })
            .unwrap();
        assert!(other.is_none());
    }
}
