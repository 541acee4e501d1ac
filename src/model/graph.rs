//! Directed multigraph over ledger addresses.
//!
//! This is the one graph type every stage exchanges. It is an owned value:
//! an insertion-ordered node table, a flat edge list, and per-node adjacency.
//! The pipeline is a sequential batch process, so there is no interior
//! locking — stages take graphs by value or `&`, and "mutation" between
//! stages means constructing a new graph.
//!
//! Insertion order is preserved for both nodes and edges, which makes every
//! serialized artifact a deterministic function of the input tables.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use super::{Address, TxEdge, Year};

/// Edge ids into `DiMultigraph::edges`.
type EdgeList = SmallVec<[u32; 4]>;

/// A directed multigraph: parallel edges and self-loops are representable,
/// and no operation silently collapses them.
#[derive(Debug, Clone, Default)]
pub struct DiMultigraph {
    /// Node table in insertion order. Index = node id used by edges.
    nodes: Vec<Address>,
    /// Address → node id. hashbrown map, rebuilt on deserialization.
    index: HashMap<Address, u32>,
    /// Flat edge list in insertion order.
    edges: Vec<TxEdge>,
    /// Per-node outgoing / incoming edge ids.
    out_adj: Vec<EdgeList>,
    in_adj: Vec<EdgeList>,
}

impl DiMultigraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Insert a node if absent; returns its id either way.
    pub fn add_node(&mut self, address: Address) -> u32 {
        if let Some(&id) = self.index.get(&address) {
            return id;
        }
        let id = self.nodes.len() as u32;
        self.index.insert(address.clone(), id);
        self.nodes.push(address);
        self.out_adj.push(EdgeList::new());
        self.in_adj.push(EdgeList::new());
        id
    }

    /// Add a directed edge, inserting endpoints as needed. Parallel edges
    /// accumulate; nothing is deduplicated.
    pub fn add_edge(&mut self, src: Address, dst: Address, year: Year, value: f64) -> u32 {
        let s = self.add_node(src);
        let d = self.add_node(dst);
        self.push_edge(TxEdge::new(s, d, year, value))
    }

    /// Add a fully-formed edge record whose endpoints are already node ids
    /// of this graph.
    pub fn push_edge(&mut self, edge: TxEdge) -> u32 {
        debug_assert!((edge.src as usize) < self.nodes.len());
        debug_assert!((edge.dst as usize) < self.nodes.len());
        let id = self.edges.len() as u32;
        self.out_adj[edge.src as usize].push(id);
        self.in_adj[edge.dst as usize].push(id);
        self.edges.push(edge);
        id
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    pub fn node_id(&self, address: &Address) -> Option<u32> {
        self.index.get(address).copied()
    }

    /// Address for a node id. Panics on an id not issued by this graph.
    pub fn address(&self, id: u32) -> &Address {
        &self.nodes[id as usize]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Address> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> &[TxEdge] {
        &self.edges
    }

    pub fn out_degree(&self, id: u32) -> usize {
        self.out_adj[id as usize].len()
    }

    pub fn in_degree(&self, id: u32) -> usize {
        self.in_adj[id as usize].len()
    }

    /// Outgoing edge ids of a node.
    pub fn out_edges(&self, id: u32) -> &[u32] {
        &self.out_adj[id as usize]
    }

    /// Incoming edge ids of a node.
    pub fn in_edges(&self, id: u32) -> &[u32] {
        &self.in_adj[id as usize]
    }

    pub fn self_loop_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_self_loop()).count()
    }

    /// Ordered snapshot of the node set. Used for set algebra between
    /// yearly graphs (intersection, union, equality) where insertion order
    /// must not matter.
    pub fn node_set(&self) -> BTreeSet<Address> {
        self.nodes.iter().cloned().collect()
    }

    /// True when both graphs hold exactly the same addresses, regardless of
    /// insertion order.
    pub fn same_node_set(&self, other: &DiMultigraph) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.nodes.iter().all(|a| other.contains(a))
    }

    // ========================================================================
    // Induced subgraph
    // ========================================================================

    /// New graph holding the nodes of `self` that are in `keep`, plus every
    /// edge whose two endpoints survive. Node and edge insertion order is
    /// inherited from `self`, so the result is deterministic.
    pub fn induced_subgraph(&self, keep: &BTreeSet<Address>) -> DiMultigraph {
        let mut sub = DiMultigraph::new();
        for address in &self.nodes {
            if keep.contains(address) {
                sub.add_node(address.clone());
            }
        }
        for edge in &self.edges {
            let src = self.address(edge.src);
            let dst = self.address(edge.dst);
            if let (Some(s), Some(d)) = (sub.node_id(src), sub.node_id(dst)) {
                sub.push_edge(TxEdge { src: s, dst: d, ..*edge });
            }
        }
        sub
    }

    // ========================================================================
    // Serialized form
    // ========================================================================

    pub fn to_data(&self) -> GraphData {
        GraphData {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    pub fn from_data(data: GraphData) -> Self {
        let mut graph = DiMultigraph::new();
        for address in data.nodes {
            graph.add_node(address);
        }
        for edge in data.edges {
            graph.push_edge(edge);
        }
        graph
    }
}

/// Flat serialized form of a `DiMultigraph`. The address↔id index and the
/// adjacency lists are derived data and are rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<Address>,
    pub edges: Vec<TxEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn triangle() -> DiMultigraph {
        let mut g = DiMultigraph::new();
        g.add_edge(addr("a"), addr("b"), 2018, 1.0);
        g.add_edge(addr("b"), addr("c"), 2018, 2.0);
        g.add_edge(addr("c"), addr("a"), 2018, 3.0);
        g
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut g = DiMultigraph::new();
        let first = g.add_node(addr("a"));
        let second = g.add_node(addr("a"));
        assert_eq!(first, second);
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut g = DiMultigraph::new();
        g.add_edge(addr("a"), addr("b"), 2018, 1.0);
        g.add_edge(addr("a"), addr("b"), 2019, 1.0);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.out_degree(0), 2);
        assert_eq!(g.in_degree(1), 2);
    }

    #[test]
    fn test_self_loops_counted() {
        let mut g = triangle();
        g.add_edge(addr("a"), addr("a"), 2018, 0.0);
        assert_eq!(g.self_loop_count(), 1);
        assert_eq!(g.out_degree(0), 2);
        assert_eq!(g.in_degree(0), 2);
    }

    #[test]
    fn test_edges_reference_existing_nodes() {
        let g = triangle();
        for edge in g.edges() {
            assert!((edge.src as usize) < g.node_count());
            assert!((edge.dst as usize) < g.node_count());
        }
    }

    #[test]
    fn test_induced_subgraph_drops_outside_edges() {
        let g = triangle();
        let keep: BTreeSet<_> = [addr("a"), addr("b")].into();
        let sub = g.induced_subgraph(&keep);
        assert_eq!(sub.node_count(), 2);
        // Only a→b survives; b→c and c→a each lose an endpoint.
        assert_eq!(sub.edge_count(), 1);
        let e = sub.edges()[0];
        assert_eq!(sub.address(e.src), &addr("a"));
        assert_eq!(sub.address(e.dst), &addr("b"));
    }

    #[test]
    fn test_induced_subgraph_ignores_unknown_addresses() {
        let g = triangle();
        let keep: BTreeSet<_> = [addr("a"), addr("zz")].into();
        let sub = g.induced_subgraph(&keep);
        assert_eq!(sub.node_count(), 1);
        assert_eq!(sub.edge_count(), 0);
    }

    #[test]
    fn test_same_node_set_is_order_independent() {
        let mut g1 = DiMultigraph::new();
        g1.add_node(addr("a"));
        g1.add_node(addr("b"));
        let mut g2 = DiMultigraph::new();
        g2.add_node(addr("b"));
        g2.add_node(addr("a"));
        assert!(g1.same_node_set(&g2));
    }

    #[test]
    fn test_data_round_trip_rebuilds_adjacency() {
        let g = triangle();
        let restored = DiMultigraph::from_data(g.to_data());
        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.edge_count(), 3);
        assert_eq!(restored.out_degree(0), 1);
        assert_eq!(restored.in_degree(0), 1);
        assert_eq!(restored.edges(), g.edges());
    }
}
