//! Multiplex Merger — union the aligned years into one multigraph.

use std::collections::BTreeMap;

use crate::model::{DiMultigraph, TxEdge, Year};
use crate::pipeline::align::verify_aligned;
use crate::Result;

/// Merge the aligned yearly graphs into the single multi-year multiplex.
///
/// Node sets must already be identical across years (checked, since a
/// mismatch here means the aligner was bypassed or broken). Edges are a
/// disjoint union: every edge keeps its origin-year tag and parallel edges
/// from different years are never collapsed, so
/// `edges(multiplex) == Σ edges(aligned_year)` holds exactly.
pub fn merge_multiplex(aligned: &BTreeMap<Year, DiMultigraph>) -> Result<DiMultigraph> {
    verify_aligned(aligned)?;

    let mut multiplex = DiMultigraph::new();
    let Some(first) = aligned.values().next() else {
        return Ok(multiplex);
    };
    for address in first.nodes() {
        multiplex.add_node(address.clone());
    }

    // Years ascend (BTreeMap), so edge order is deterministic.
    let mut expected_edges = 0usize;
    for graph in aligned.values() {
        expected_edges += graph.edge_count();
        for edge in graph.edges() {
            // Node ids may differ per year; remap through the address.
            let src = multiplex
                .node_id(graph.address(edge.src))
                .unwrap_or_else(|| multiplex.add_node(graph.address(edge.src).clone()));
            let dst = multiplex
                .node_id(graph.address(edge.dst))
                .unwrap_or_else(|| multiplex.add_node(graph.address(edge.dst).clone()));
            multiplex.push_edge(TxEdge { src, dst, ..*edge });
        }
    }
    debug_assert_eq!(multiplex.edge_count(), expected_edges);

    Ok(multiplex)
}
