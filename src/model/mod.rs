//! # Graph Model
//!
//! Owned value types for the yearly and multiplex transaction graphs.
//! These types cross every boundary: ingest ↔ pipeline stages ↔ stats ↔ artifacts.
//!
//! Design rule: this module is pure data — no I/O, no globals, no stage logic.

pub mod address;
pub mod transaction;
pub mod graph;

pub use address::Address;
pub use transaction::{TxEdge, Year};
pub use graph::{DiMultigraph, GraphData};
