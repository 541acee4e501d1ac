//! Connected-component analysis over `DiMultigraph`.
//!
//! Weak components via union-find on the undirected view; strong components
//! via Tarjan's algorithm, iterative so multi-million-node yearly graphs
//! cannot blow the call stack.

use crate::model::DiMultigraph;

/// Count and largest size of a component partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentSummary {
    pub count: usize,
    pub largest: usize,
}

// ============================================================================
// Weakly connected components
// ============================================================================

struct UnionFind {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            // Path halving.
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra as usize] < self.size[rb as usize] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb as usize] = ra;
        self.size[ra as usize] += self.size[rb as usize];
    }
}

/// Weakly connected components: edge direction ignored.
pub fn weakly_connected(graph: &DiMultigraph) -> ComponentSummary {
    let n = graph.node_count();
    if n == 0 {
        return ComponentSummary::default();
    }
    let mut uf = UnionFind::new(n);
    for edge in graph.edges() {
        uf.union(edge.src, edge.dst);
    }
    let mut summary = ComponentSummary::default();
    for id in 0..n as u32 {
        if uf.find(id) == id {
            summary.count += 1;
            summary.largest = summary.largest.max(uf.size[id as usize] as usize);
        }
    }
    summary
}

// ============================================================================
// Strongly connected components (iterative Tarjan)
// ============================================================================

const UNVISITED: u32 = u32::MAX;

/// Strongly connected components of the directed graph.
pub fn strongly_connected(graph: &DiMultigraph) -> ComponentSummary {
    let n = graph.node_count();
    if n == 0 {
        return ComponentSummary::default();
    }

    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0u32; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<u32> = Vec::new();
    let mut next_index = 0u32;
    let mut summary = ComponentSummary::default();

    // Explicit DFS frames: (node, position into its out-edge list).
    let mut frames: Vec<(u32, usize)> = Vec::new();

    for root in 0..n as u32 {
        if index[root as usize] != UNVISITED {
            continue;
        }
        frames.push((root, 0));
        while let Some(&mut (v, ref mut edge_pos)) = frames.last_mut() {
            if *edge_pos == 0 {
                index[v as usize] = next_index;
                lowlink[v as usize] = next_index;
                next_index += 1;
                stack.push(v);
                on_stack[v as usize] = true;
            }

            let out = graph.out_edges(v);
            if let Some(&edge_id) = out.get(*edge_pos) {
                *edge_pos += 1;
                let w = graph.edges()[edge_id as usize].dst;
                if index[w as usize] == UNVISITED {
                    frames.push((w, 0));
                } else if on_stack[w as usize] {
                    lowlink[v as usize] = lowlink[v as usize].min(index[w as usize]);
                }
                continue;
            }

            // v is exhausted: pop its frame, fold its lowlink into the parent.
            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                lowlink[parent as usize] = lowlink[parent as usize].min(lowlink[v as usize]);
            }
            if lowlink[v as usize] == index[v as usize] {
                let mut size = 0;
                loop {
                    let w = stack.pop().unwrap_or(v);
                    on_stack[w as usize] = false;
                    size += 1;
                    if w == v {
                        break;
                    }
                }
                summary.count += 1;
                summary.largest = summary.largest.max(size);
            }
        }
    }
    summary
}
