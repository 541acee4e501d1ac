//! Graph Aligner — pad every year up to one common node set.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::{Address, DiMultigraph, Year};
use crate::{Error, Result};

/// Expand each narrowed yearly graph so its node set equals the union of
/// all narrowed node sets, adding isolated nodes where an address had no
/// presence that year. Edge sets are untouched.
///
/// Inputs are borrowed and new graphs returned, so narrowed and aligned
/// artifacts stay independently inspectable.
///
/// The critical invariant — `nodes(year_i) == nodes(year_j)` for every pair
/// — is re-checked on the outputs; a violation is a pipeline bug and aborts
/// as [`Error::InconsistentNodeSet`].
pub fn align_node_sets(
    narrowed: &BTreeMap<Year, DiMultigraph>,
) -> Result<BTreeMap<Year, DiMultigraph>> {
    let mut union: BTreeSet<Address> = BTreeSet::new();
    for graph in narrowed.values() {
        union.extend(graph.nodes().cloned());
    }

    let mut aligned = BTreeMap::new();
    for (&year, graph) in narrowed {
        let mut padded = graph.clone();
        let before = padded.node_count();
        for address in &union {
            padded.add_node(address.clone());
        }
        debug!(year, padded = padded.node_count() - before, "aligned node set");
        aligned.insert(year, padded);
    }

    verify_aligned(&aligned)?;
    Ok(aligned)
}

/// Assert that all yearly graphs agree on node membership.
pub fn verify_aligned(aligned: &BTreeMap<Year, DiMultigraph>) -> Result<()> {
    let Some((&first_year, first)) = aligned.iter().next() else {
        return Ok(());
    };
    for (&year, graph) in aligned.iter().skip(1) {
        if !first.same_node_set(graph) {
            return Err(Error::InconsistentNodeSet {
                year,
                detail: format!(
                    "{} nodes in {year} vs {} in {first_year}",
                    graph.node_count(),
                    first.node_count()
                ),
            });
        }
    }
    Ok(())
}
