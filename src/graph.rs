//! Directed graphs as sorted adjacency lists.
//!
//! Neighbor lists are kept sorted ascending so that edge queries are a binary
//! search. Undirected graphs are represented by storing both directions.
use crate::error::{Error, Result};
use crate::permutation::Permutation;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Graph {
    neighbors: Vec<Vec<usize>>,
}

impl Graph {
    /// A graph with `size` vertices and no edges.
    pub fn empty(size: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); size],
        }
    }

    /// Build a graph from per-vertex neighbor lists.
    ///
    /// Lists are sorted and deduplicated; every neighbor must be a vertex.
    pub fn from_adjacency(mut neighbors: Vec<Vec<usize>>) -> Result<Self> {
        let size = neighbors.len();
        for list in neighbors.iter_mut() {
            if let Some(&vertex) = list.iter().find(|&&v| v >= size) {
                return Err(Error::VertexOutOfRange { vertex, size });
            }
            list.sort_unstable();
            list.dedup();
        }
        Ok(Self { neighbors })
    }

    /// Build a directed graph from `(source, target)` pairs.
    pub fn from_edges(size: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        let mut neighbors = vec![Vec::new(); size];
        for (u, v) in edges {
            let vertex = u.max(v);
            if vertex >= size {
                return Err(Error::VertexOutOfRange { vertex, size });
            }
            neighbors[u].push(v);
        }
        Self::from_adjacency(neighbors)
    }

    /// Build an undirected graph: each pair is stored in both directions.
    pub fn undirected(size: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        Self::from_edges(size, edges.into_iter().flat_map(|(u, v)| [(u, v), (v, u)]))
    }

    /// Number of vertices.
    pub fn size(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of directed edges (an undirected edge counts twice, a self-loop once).
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum()
    }

    /// Sorted out-neighbors of `v`.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.neighbors[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.neighbors[v].len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(u, list)| list.iter().map(move |&v| (u, v)))
    }

    pub fn contains_edge(&self, u: usize, v: usize) -> bool {
        self.neighbors[u].binary_search(&v).is_ok()
    }

    /// The transpose: every edge `u -> v` becomes `v -> u`.
    pub fn reverse(&self) -> Graph {
        let mut neighbors = vec![Vec::new(); self.size()];
        // visiting sources in ascending order leaves every list sorted
        for (u, v) in self.edges() {
            neighbors[v].push(u);
        }
        Graph { neighbors }
    }

    /// The graph obtained by renaming every vertex `v` to `iso[v]`.
    pub fn apply_relabeling(&self, iso: &Permutation) -> Result<Graph> {
        if iso.len() != self.size() {
            return Err(Error::SizeMismatch {
                left: self.size(),
                right: iso.len(),
            });
        }

        let mut neighbors = vec![Vec::new(); self.size()];
        for (u, v) in self.edges() {
            neighbors[iso[u]].push(iso[v]);
        }
        for list in neighbors.iter_mut() {
            list.sort_unstable();
        }
        Ok(Graph { neighbors })
    }

    /// True if every edge is present in both directions.
    pub fn is_symmetric(&self) -> bool {
        self.edges().all(|(u, v)| self.contains_edge(v, u))
    }
}
