//! End-to-end tests for the full pipeline.
//!
//! Each test writes yearly CSV tables into a temp data directory, runs
//! `Pipeline::run()`, and inspects the report plus the artifacts it left on
//! disk — exercising ingest → build → select → filter → align → merge →
//! stats through the public API only.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use txgraph::{
    Address, Pipeline, PipelineConfig, SelectionRule, Stage,
};

fn write_table(data_dir: &Path, year: i32, rows: &[(&str, &str, f64)]) {
    fs::create_dir_all(data_dir).unwrap();
    let mut contents = String::from("from_address,to_address,value\n");
    for (from, to, value) in rows {
        contents.push_str(&format!("{from},{to},{value}\n"));
    }
    fs::write(data_dir.join(format!("transactions_{year}.csv")), contents).unwrap();
}

fn addr(s: &str) -> Address {
    Address::parse(s).unwrap()
}

fn addresses(names: &[&str]) -> BTreeSet<Address> {
    names.iter().map(|s| addr(s)).collect()
}

/// Two years: 2018 has x→y, y→z; 2019 has y→z, z→w.
fn two_year_config(keep: SelectionRule) -> (tempfile::TempDir, PipelineConfig) {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    write_table(&data, 2018, &[("x", "y", 1.0), ("y", "z", 1.0)]);
    write_table(&data, 2019, &[("y", "z", 1.0), ("z", "w", 1.0)]);
    let mut config = PipelineConfig::new(data, dir.path().join("out"), vec![2018, 2019]);
    config.selection = keep;
    (dir, config)
}

// ============================================================================
// 1. The two-year reference scenario, retention = present in ≥ 1 year
// ============================================================================

#[test]
fn test_two_year_scenario_with_union_retention() {
    let (_dir, config) = two_year_config(SelectionRule::PresentInYears {
        min_years: Some(1),
    });
    let pipeline = Pipeline::new(config);
    let report = pipeline.run().unwrap();
    let store = pipeline.store();

    // Retained set is the union {w, x, y, z}.
    let retained = store
        .load_node_set(&SelectionRule::PresentInYears { min_years: Some(1) })
        .unwrap()
        .unwrap();
    assert_eq!(retained.addresses, addresses(&["w", "x", "y", "z"]));

    // Aligned 2018: nodes {w,x,y,z}, edges x→y and y→z, w isolated.
    let aligned_2018 = store.load_graph(Stage::Aligned, 2018).unwrap();
    assert_eq!(aligned_2018.node_set(), addresses(&["w", "x", "y", "z"]));
    assert_eq!(aligned_2018.edge_count(), 2);
    let w = aligned_2018.node_id(&addr("w")).unwrap();
    assert_eq!(aligned_2018.in_degree(w) + aligned_2018.out_degree(w), 0);

    // Aligned 2019: same nodes, edges y→z and z→w, x isolated.
    let aligned_2019 = store.load_graph(Stage::Aligned, 2019).unwrap();
    assert_eq!(aligned_2019.node_set(), addresses(&["w", "x", "y", "z"]));
    assert_eq!(aligned_2019.edge_count(), 2);
    let x = aligned_2019.node_id(&addr("x")).unwrap();
    assert_eq!(aligned_2019.in_degree(x) + aligned_2019.out_degree(x), 0);

    // Multiplex: 4 nodes, 4 edges; y→z appears twice, tagged per year.
    let multiplex = store.load_multiplex().unwrap();
    assert_eq!(multiplex.node_count(), 4);
    assert_eq!(multiplex.edge_count(), 4);
    let y = multiplex.node_id(&addr("y")).unwrap();
    let z = multiplex.node_id(&addr("z")).unwrap();
    let mut y_to_z_years: Vec<i32> = multiplex
        .edges()
        .iter()
        .filter(|e| e.src == y && e.dst == z)
        .map(|e| e.year)
        .collect();
    y_to_z_years.sort_unstable();
    assert_eq!(y_to_z_years, vec![2018, 2019]);

    // No rows were dropped anywhere.
    assert!(report.row_issues.values().all(|issues| issues.is_clean()));
    assert!(report.missing_years.is_empty());
}

// ============================================================================
// 2. Default retention (intersection of all years)
// ============================================================================

#[test]
fn test_default_retention_keeps_only_cross_year_nodes() {
    let (_dir, config) = two_year_config(SelectionRule::default());
    let pipeline = Pipeline::new(config);
    pipeline.run().unwrap();

    let retained = pipeline
        .store()
        .load_node_set(&SelectionRule::default())
        .unwrap()
        .unwrap();
    assert_eq!(retained.addresses, addresses(&["y", "z"]));

    // Only y→z survives in each narrowed year.
    for year in [2018, 2019] {
        let narrowed = pipeline.store().load_graph(Stage::Narrowed, year).unwrap();
        assert_eq!(narrowed.node_set(), addresses(&["y", "z"]));
        assert_eq!(narrowed.edge_count(), 1);
    }

    let multiplex = pipeline.store().load_multiplex().unwrap();
    assert_eq!(multiplex.node_count(), 2);
    assert_eq!(multiplex.edge_count(), 2);
}

// ============================================================================
// 3. Statistics table
// ============================================================================

#[test]
fn test_stats_rows_cover_every_snapshot() {
    let (_dir, config) = two_year_config(SelectionRule::PresentInYears {
        min_years: Some(1),
    });
    let pipeline = Pipeline::new(config);
    let report = pipeline.run().unwrap();

    for key in ["2018", "2019", "2018_aligned", "2019_aligned", "multiplex"] {
        assert!(report.stats.get(key).is_some(), "missing stats row {key}");
    }

    let multiplex_row = report.stats.get("multiplex").unwrap();
    assert_eq!(multiplex_row.nodes, 4);
    assert_eq!(multiplex_row.edges, 4);
    assert_eq!(multiplex_row.density, 4.0 / 12.0);

    // Raw 2018 never saw w.
    assert_eq!(report.stats.get("2018").unwrap().nodes, 3);
    assert_eq!(report.stats.get("2018_aligned").unwrap().nodes, 4);

    assert!(pipeline.store().stats_path().exists());
}

// ============================================================================
// 4. Re-run idempotence: byte-identical stats artifact
// ============================================================================

#[test]
fn test_rerun_produces_identical_artifacts() {
    let (_dir, config) = two_year_config(SelectionRule::default());
    let pipeline = Pipeline::new(config);

    pipeline.run().unwrap();
    let stats_first = fs::read(pipeline.store().stats_path()).unwrap();
    let multiplex_first = fs::read(pipeline.store().multiplex_path()).unwrap();

    pipeline.run().unwrap();
    let stats_second = fs::read(pipeline.store().stats_path()).unwrap();
    let multiplex_second = fs::read(pipeline.store().multiplex_path()).unwrap();

    assert_eq!(stats_first, stats_second);
    assert_eq!(multiplex_first, multiplex_second);
}

// ============================================================================
// 5. Case-folded address identity across tables
// ============================================================================

#[test]
fn test_mixed_case_addresses_are_one_node() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    write_table(&data, 2018, &[("0xAB", "0xcd", 1.0)]);
    write_table(&data, 2019, &[("0xab", "0xCD", 2.0)]);

    let mut config = PipelineConfig::new(data, dir.path().join("out"), vec![2018, 2019]);
    config.selection = SelectionRule::default();
    let pipeline = Pipeline::new(config);
    pipeline.run().unwrap();

    let multiplex = pipeline.store().load_multiplex().unwrap();
    assert_eq!(multiplex.node_set(), addresses(&["0xab", "0xcd"]));
    assert_eq!(multiplex.edge_count(), 2);
}
