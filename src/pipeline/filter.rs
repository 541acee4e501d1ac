//! Intersection Filter — restrict a yearly graph to the retained set.

use crate::model::DiMultigraph;
use crate::pipeline::NodeSet;

/// Narrow one raw yearly graph to the retained addresses.
///
/// The result is the induced subgraph (both endpoints retained) padded with
/// every retained address that had no qualifying edge that year, as an
/// isolated node. Guarantees:
///
/// - `nodes(narrowed) == retained` exactly, every year
/// - `edges(narrowed) ⊆ edges(raw)`
///
/// The padding is what lets the aligner distinguish "retained but inactive
/// this year" from "not retained at all".
pub fn narrow_to_nodes(raw: &DiMultigraph, retained: &NodeSet) -> DiMultigraph {
    let mut narrowed = raw.induced_subgraph(&retained.addresses);
    for address in &retained.addresses {
        narrowed.add_node(address.clone());
    }
    narrowed
}
