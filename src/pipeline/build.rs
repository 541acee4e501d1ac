//! Raw Graph Builder — one year's rows into a directed multigraph.

use crate::ingest::{RowIssues, TxRecord};
use crate::model::{DiMultigraph, TxEdge, Year};
use crate::pipeline::EdgePolicy;

/// Build the raw yearly graph: one node per distinct address appearing as
/// source or target, one edge per qualifying row, tagged with the partition
/// year.
///
/// Rows excluded by `policy` still register their endpoints as nodes — the
/// address was active that year even if the edge is dropped — and are
/// counted in `issues`.
pub fn build_raw_graph(
    year: Year,
    records: &[TxRecord],
    policy: EdgePolicy,
    issues: &mut RowIssues,
) -> DiMultigraph {
    let mut graph = DiMultigraph::new();
    for record in records {
        let src = graph.add_node(record.from.clone());
        let dst = graph.add_node(record.to.clone());

        if !policy.keep_self_loops && record.is_self_loop() {
            issues.self_loops_dropped += 1;
            continue;
        }
        if !policy.keep_zero_value && record.value == 0.0 {
            issues.zero_value_dropped += 1;
            continue;
        }

        let mut edge = TxEdge::new(src, dst, year, record.value);
        edge.block_number = record.block_number;
        graph.push_edge(edge);
    }
    graph
}
