//! Transaction edge — the directed relation between two addresses.

use serde::{Deserialize, Serialize};

/// Partition key for yearly graphs.
pub type Year = i32;

/// A directed value transfer inside a graph.
///
/// `src` and `dst` are indices into the owning graph's node table, so an
/// edge is meaningless outside its graph. Parallel edges between the same
/// ordered pair are distinct entries (multigraph semantics); nothing in the
/// pipeline aggregates them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TxEdge {
    pub src: u32,
    pub dst: u32,
    /// Origin year of the transfer. Invariant: inside a yearly graph this
    /// equals the graph's partition year; inside the multiplex it records
    /// which yearly layer the edge came from.
    pub year: Year,
    /// Transferred value in the ledger's native unit. Non-negative.
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl TxEdge {
    pub fn new(src: u32, dst: u32, year: Year, value: f64) -> Self {
        Self { src, dst, year, value, block_number: None }
    }

    pub fn with_block(mut self, block_number: u64) -> Self {
        self.block_number = Some(block_number);
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.src == self.dst
    }
}
