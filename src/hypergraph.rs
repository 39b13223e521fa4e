//! Isomorphism of open hypergraphs, by reduction to colored digraph isomorphism.
//!
//! An open hypergraph `f` is encoded as a digraph with one vertex per node, one
//! per hyperedge, and one per edge *port*:
//!
//! ```text
//! node --> source port k --> edge --> target port k --> node
//! ```
//!
//! Vertex colors carry node labels (plus the node's positions in the source and
//! target interfaces), edge labels and port indices. A color-preserving
//! bijection between two encodings restricts to an isomorphism of open
//! hypergraphs, and vice versa.
use log::debug;
use open_hypergraphs::lax::{NodeId, OpenHypergraph};
use std::collections::HashMap;
use std::hash::Hash;

use crate::graph::Graph;
use crate::nogood::is_sorted_equal;
use crate::permutation::Permutation;
use crate::search::colored_isomorphism;

#[derive(Clone, PartialEq, Debug)]
pub struct Isomorphism {
    nodes: Permutation,
    edges: Permutation,
}

impl Isomorphism {
    pub fn identity(num_nodes: usize, num_edges: usize) -> Self {
        Self {
            nodes: Permutation::identity(num_nodes),
            edges: Permutation::identity(num_edges),
        }
    }

    /// Find an isomorphism from `f` to `g`, if one exists.
    pub fn new<O: Eq + Clone + Hash, A: Eq + Clone + Hash>(
        f: &OpenHypergraph<O, A>,
        g: &OpenHypergraph<O, A>,
    ) -> Option<Isomorphism> {
        if f == g {
            return Some(Isomorphism::identity(
                f.hypergraph.nodes.len(),
                f.hypergraph.edges.len(),
            ));
        }

        find_isomorphism(f, g)
    }

    /// Image of each node.
    pub fn nodes(&self) -> &Permutation {
        &self.nodes
    }

    /// Image of each hyperedge.
    pub fn edges(&self) -> &Permutation {
        &self.edges
    }

    /// Move node `i` of `f` to position `nodes[i]` and edge `e` to
    /// `edges[e]`, rewiring adjacency and interfaces to match.
    ///
    /// Panics if the permutation sizes do not match `f`.
    pub fn apply<O: Clone, A: Clone>(&self, f: &OpenHypergraph<O, A>) -> OpenHypergraph<O, A> {
        let node = |id: &NodeId| NodeId(self.nodes[id.0]);

        let mut h = f.clone();
        for (i, label) in f.hypergraph.nodes.iter().enumerate() {
            h.hypergraph.nodes[self.nodes[i]] = label.clone();
        }
        for (e, label) in f.hypergraph.edges.iter().enumerate() {
            h.hypergraph.edges[self.edges[e]] = label.clone();

            let mut adjacency = f.hypergraph.adjacency[e].clone();
            adjacency.sources = adjacency.sources.iter().map(node).collect();
            adjacency.targets = adjacency.targets.iter().map(node).collect();
            h.hypergraph.adjacency[self.edges[e]] = adjacency;
        }
        h.sources = f.sources.iter().map(node).collect();
        h.targets = f.targets.iter().map(node).collect();
        h
    }
}

/// Find an isomorphism of open hypergraphs `f` and `g`: a bijection on nodes
/// and one on edges that preserve labels, adjacency (in port order) and both
/// interfaces (in order).
pub fn find_isomorphism<O: Eq + Clone + Hash, A: Eq + Clone + Hash>(
    f: &OpenHypergraph<O, A>,
    g: &OpenHypergraph<O, A>,
) -> Option<Isomorphism> {
    nogood(f, g)?;

    let mut interner = Interner::default();
    let ef = interner.encode(f)?;
    let eg = interner.encode(g)?;
    debug!(
        "hypergraph encoding: {} nodes, {} edges, {} vertices",
        ef.nodes,
        ef.edges,
        ef.graph.size()
    );

    let iso = colored_isomorphism(&ef.graph, &eg.graph, &ef.colors, &eg.colors)?;

    // colors keep nodes, edges and ports in their own ranges
    let nodes = Permutation::new(iso[..ef.nodes].iter().copied())?;
    let edges = Permutation::new(
        iso[ef.nodes..ef.nodes + ef.edges]
            .iter()
            .map(|&v| v.wrapping_sub(ef.nodes)),
    )?;
    Some(Isomorphism { nodes, edges })
}

/// Label multisets and interface types must agree.
fn nogood<O: Eq + Clone + Hash, A: Eq + Clone + Hash>(
    f: &OpenHypergraph<O, A>,
    g: &OpenHypergraph<O, A>,
) -> Option<()> {
    if !is_sorted_equal(&f.hypergraph.nodes, &g.hypergraph.nodes) {
        return None;
    }

    if !is_sorted_equal(&f.hypergraph.edges, &g.hypergraph.edges) {
        return None;
    }

    use open_hypergraphs::category::*;
    if f.source() != g.source() || f.target() != g.target() {
        return None;
    }

    Some(())
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum Role {
    Node {
        label: usize,
        sources: Vec<usize>,
        targets: Vec<usize>,
    },
    Edge(usize),
    SourcePort(usize),
    TargetPort(usize),
}

/// Color tables shared by both encodings, so equal roles get equal colors.
struct Interner<'a, O, A> {
    node_labels: HashMap<&'a O, usize>,
    edge_labels: HashMap<&'a A, usize>,
    roles: HashMap<Role, usize>,
}

impl<O, A> Default for Interner<'_, O, A> {
    fn default() -> Self {
        Interner {
            node_labels: HashMap::new(),
            edge_labels: HashMap::new(),
            roles: HashMap::new(),
        }
    }
}

struct Encoding {
    graph: Graph,
    colors: Vec<usize>,
    nodes: usize,
    edges: usize,
}

impl<'a, O: Eq + Hash, A: Eq + Hash> Interner<'a, O, A> {
    /// Vertices `0..N` are nodes, `N..N+E` edges, the rest ports.
    fn encode(&mut self, f: &'a OpenHypergraph<O, A>) -> Option<Encoding> {
        let h = &f.hypergraph;
        let n = h.nodes.len();

        let mut positions = vec![(Vec::new(), Vec::new()); n];
        for (k, id) in f.sources.iter().enumerate() {
            positions.get_mut(id.0)?.0.push(k);
        }
        for (k, id) in f.targets.iter().enumerate() {
            positions.get_mut(id.0)?.1.push(k);
        }

        let mut colors = Vec::with_capacity(n + h.edges.len());
        for (label, (sources, targets)) in h.nodes.iter().zip(positions) {
            let label = intern(&mut self.node_labels, label);
            colors.push(intern(&mut self.roles, Role::Node { label, sources, targets }));
        }
        for label in &h.edges {
            let label = intern(&mut self.edge_labels, label);
            colors.push(intern(&mut self.roles, Role::Edge(label)));
        }

        let mut arcs = Vec::new();
        for (e, adjacency) in h.adjacency.iter().enumerate() {
            let edge = n + e;
            for (k, id) in adjacency.sources.iter().enumerate() {
                let port = colors.len();
                colors.push(intern(&mut self.roles, Role::SourcePort(k)));
                arcs.extend([(id.0, port), (port, edge)]);
            }
            for (k, id) in adjacency.targets.iter().enumerate() {
                let port = colors.len();
                colors.push(intern(&mut self.roles, Role::TargetPort(k)));
                arcs.extend([(edge, port), (port, id.0)]);
            }
        }

        let graph = Graph::from_edges(colors.len(), arcs).ok()?;
        Some(Encoding {
            graph,
            colors,
            nodes: n,
            edges: h.edges.len(),
        })
    }
}

fn intern<K: Eq + Hash>(table: &mut HashMap<K, usize>, key: K) -> usize {
    let next = table.len();
    *table.entry(key).or_insert(next)
}
