//! Random graphs and relabelings, for tests and benchmarks.
use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index;

use crate::graph::Graph;
use crate::permutation::Permutation;

/// A directed graph with `edges` distinct edges chosen uniformly among all
/// `size * size` ordered pairs (self-loops included). `edges` is capped at
/// `size * size`.
pub fn graph<R: Rng + ?Sized>(size: usize, edges: usize, rng: &mut R) -> Graph {
    let pairs = size * size;
    let chosen = index::sample(rng, pairs, edges.min(pairs));
    let mut neighbors = vec![Vec::new(); size];
    for pair in chosen.iter() {
        neighbors[pair / size].push(pair % size);
    }
    for list in neighbors.iter_mut() {
        list.sort_unstable();
    }
    Graph::from_adjacency(neighbors).unwrap_or_else(|_| Graph::empty(size))
}

/// A simple undirected graph with `edges` distinct edges (no self-loops),
/// capped at `size * (size - 1) / 2`.
pub fn undirected_graph<R: Rng + ?Sized>(size: usize, edges: usize, rng: &mut R) -> Graph {
    let all: Vec<(usize, usize)> = (0..size)
        .flat_map(|u| (u + 1..size).map(move |v| (u, v)))
        .collect();
    let chosen = all.choose_multiple(rng, edges.min(all.len())).copied();
    Graph::undirected(size, chosen).unwrap_or_else(|_| Graph::empty(size))
}

/// A uniformly random permutation of `0..size`.
pub fn permutation<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Permutation {
    let mut values: Vec<usize> = (0..size).collect();
    values.shuffle(rng);
    Permutation::new(values).unwrap_or_else(|| Permutation::identity(size))
}

/// `g` under a random relabeling, together with that relabeling.
pub fn relabeled<R: Rng + ?Sized>(g: &Graph, rng: &mut R) -> (Graph, Permutation) {
    let iso = permutation(g.size(), rng);
    let h = g.apply_relabeling(&iso).unwrap_or_else(|_| g.clone());
    (h, iso)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_graph_edge_count() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(graph(5, 7, &mut rng).edge_count(), 7);
        assert_eq!(graph(3, 100, &mut rng).edge_count(), 9);
        assert_eq!(graph(0, 3, &mut rng).size(), 0);
    }

    #[test]
    fn test_undirected_graph() {
        let mut rng = StdRng::seed_from_u64(2);
        let g = undirected_graph(6, 8, &mut rng);
        assert!(g.is_symmetric());
        assert_eq!(g.edge_count(), 16);
        assert!(g.edges().all(|(u, v)| u != v));
        assert_eq!(undirected_graph(4, 100, &mut rng).edge_count(), 12);
    }

    #[test]
    fn test_relabeled() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = graph(8, 20, &mut rng);
        let (h, iso) = relabeled(&g, &mut rng);
        assert!(iso.is_isomorphism(&g, &h));
    }
}
