//! Individualization-refinement isomorphism search.
//!
//! Refine the paired partition to a fixpoint; if some class still holds several
//! vertices, pin one of its vertices in the first graph against each candidate
//! of the same class in the second graph in turn, and recurse on a clone of the
//! partition. A failed branch is simply dropped.
use log::{debug, trace};

use crate::graph::Graph;
use crate::partition::WlPartition;
use crate::permutation::Bijection;
use crate::refine::Refiner;

/// Which non-singleton class to individualize next.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ClassSelection {
    /// Lowest class id with more than one member
    #[default]
    FirstNonTrivial,
    /// Fewest members, ties broken by class id
    SmallestNonTrivial,
}

#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub class_selection: ClassSelection,
    /// Give up (and report no isomorphism) after visiting this many search nodes
    pub node_budget: Option<usize>,
    /// Check the final bijection edge by edge before accepting it
    pub verify: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            class_selection: ClassSelection::default(),
            node_budget: None,
            verify: true,
        }
    }
}

impl SearchOptions {
    pub fn class_selection(mut self, class_selection: ClassSelection) -> Self {
        self.class_selection = class_selection;
        self
    }

    pub fn node_budget(mut self, node_budget: usize) -> Self {
        self.node_budget = Some(node_budget);
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search nodes visited (one per refinement to a fixpoint)
    pub nodes: usize,
    /// Branches refuted by refinement
    pub failures: usize,
    pub max_depth: usize,
    /// The node budget ran out before the search finished
    pub budget_exhausted: bool,
}

/// Find an isomorphism from `a` to `b`.
pub fn isomorphism(a: &Graph, b: &Graph) -> Option<Bijection> {
    Search::new(a, b).run()
}

/// Find an isomorphism from `a` to `b` that maps every vertex `v` to a vertex
/// of the same color: `colors_b[f[v]] == colors_a[v]`.
pub fn colored_isomorphism(
    a: &Graph,
    b: &Graph,
    colors_a: &[usize],
    colors_b: &[usize],
) -> Option<Bijection> {
    Search::new(a, b).colors(colors_a, colors_b).run()
}

/// A configured isomorphism search between two graphs.
pub struct Search<'a> {
    a: &'a Graph,
    b: &'a Graph,
    colors: Option<[&'a [usize]; 2]>,
    options: SearchOptions,
}

impl<'a> Search<'a> {
    pub fn new(a: &'a Graph, b: &'a Graph) -> Self {
        Search {
            a,
            b,
            colors: None,
            options: SearchOptions::default(),
        }
    }

    pub fn colors(mut self, colors_a: &'a [usize], colors_b: &'a [usize]) -> Self {
        self.colors = Some([colors_a, colors_b]);
        self
    }

    pub fn options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(&self) -> Option<Bijection> {
        self.run_with_stats().0
    }

    pub fn run_with_stats(&self) -> (Option<Bijection>, SearchStats) {
        let mut stats = SearchStats::default();

        if self.a.size() != self.b.size() {
            debug!("size mismatch: {} vs {}", self.a.size(), self.b.size());
            return (None, stats);
        }
        if crate::nogood::nogood(self.a, self.b, self.colors).is_none() {
            debug!("rejected by degree and color counts");
            return (None, stats);
        }

        let Ok(refiner) = Refiner::new(self.a, self.b) else {
            return (None, stats);
        };
        let colors = self.colors;
        let color = |v: usize, g: usize| colors.map_or(0, |c| c[g][v]);
        let Ok(partition) = refiner.initial_partition(|v, g| (color(v, g), refiner.graph(g).degree(v)))
        else {
            return (None, stats);
        };

        let result = self
            .backtrack(&refiner, partition, 0, &mut stats)
            .and_then(|p| p.bijection());
        debug!(
            "search finished: {} after {} nodes ({} refuted, depth {})",
            if result.is_some() { "isomorphic" } else { "not isomorphic" },
            stats.nodes,
            stats.failures,
            stats.max_depth,
        );
        (result, stats)
    }

    /// Refine `p`, then either accept it (discrete), or branch on a class.
    /// Returns the discrete partition of the first successful branch.
    fn backtrack(
        &self,
        refiner: &Refiner,
        mut p: WlPartition,
        depth: usize,
        stats: &mut SearchStats,
    ) -> Option<WlPartition> {
        if self.options.node_budget.is_some_and(|budget| stats.nodes >= budget) {
            if !stats.budget_exhausted {
                debug!("node budget of {} exhausted", stats.nodes);
            }
            stats.budget_exhausted = true;
            return None;
        }
        stats.nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);
        trace!("backtrack depth {depth}");

        if refiner.stabilize(&mut p).is_err() {
            stats.failures += 1;
            return None;
        }
        p.compact();

        let Some(cls) = self.select_class(&p) else {
            return self.accept(p);
        };

        let va = *p.class_members(cls, 0).last()?;
        let candidates = p.class_members(cls, 1).to_vec();
        for vb in candidates {
            trace!("depth {depth}: individualize {va} ~ {vb} in class {cls}");
            let mut child = p.clone();
            refiner.individualize(&mut child, cls, [va, vb]);
            if let Some(done) = self.backtrack(refiner, child, depth + 1, stats) {
                return Some(done);
            }
            if stats.budget_exhausted {
                return None;
            }
        }
        None
    }

    fn accept(&self, p: WlPartition) -> Option<WlPartition> {
        if self.options.verify {
            let iso = p.bijection()?;
            if !iso.is_isomorphism(self.a, self.b) {
                // signatures collided somewhere along this branch
                debug!("discrete partition failed verification");
                return None;
            }
        }
        Some(p)
    }

    fn select_class(&self, p: &WlPartition) -> Option<usize> {
        let mut nontrivial = (0..p.class_count())
            .map(|cls| (p.class_sizes(cls)[0], cls))
            .filter(|&(size, _)| size > 1);
        match self.options.class_selection {
            ClassSelection::FirstNonTrivial => nontrivial.next(),
            ClassSelection::SmallestNonTrivial => nontrivial.min(),
        }
        .map(|(_, cls)| cls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::Permutation;
    use crate::random;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn cycle(n: usize) -> Graph {
        Graph::undirected(n, (0..n).map(|i| (i, (i + 1) % n))).unwrap()
    }

    fn path(n: usize) -> Graph {
        Graph::undirected(n, (0..n - 1).map(|i| (i, i + 1))).unwrap()
    }

    fn petersen() -> Graph {
        let outer = (0..5).map(|i| (i, (i + 1) % 5));
        let spokes = (0..5).map(|i| (i, i + 5));
        let inner = (0..5).map(|i| (i + 5, (i + 2) % 5 + 5));
        Graph::undirected(10, outer.chain(spokes).chain(inner)).unwrap()
    }

    /// Both strongly regular with parameters (16, 6, 2, 2); colour refinement
    /// alone cannot separate them.
    fn rook_4x4() -> Graph {
        let v = |i: usize, j: usize| 4 * i + j;
        let mut edges = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    if k != j {
                        edges.push((v(i, j), v(i, k)));
                    }
                    if k != i {
                        edges.push((v(i, j), v(k, j)));
                    }
                }
            }
        }
        Graph::from_edges(16, edges).unwrap()
    }

    fn shrikhande() -> Graph {
        let v = |i: usize, j: usize| 4 * (i % 4) + (j % 4);
        let mut edges = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                for (di, dj) in [(0, 1), (1, 0), (1, 1)] {
                    edges.push((v(i, j), v(i + di, j + dj)));
                }
            }
        }
        Graph::undirected(16, edges).unwrap()
    }

    fn assert_isomorphic(a: &Graph, b: &Graph) {
        let iso = isomorphism(a, b).expect("graphs should be isomorphic");
        assert!(iso.is_isomorphism(a, b));
        assert_eq!(a.apply_relabeling(&iso).unwrap(), *b);
    }

    #[test]
    fn test_empty_graphs() {
        let g = Graph::empty(0);
        assert_eq!(isomorphism(&g, &g), Some(Permutation::identity(0)));
    }

    #[test]
    fn test_single_edge() {
        let g = Graph::undirected(2, [(0, 1)]).unwrap();
        let iso = isomorphism(&g, &g).unwrap().into_inner();
        assert!(iso == vec![0, 1] || iso == vec![1, 0]);
    }

    #[test]
    fn test_cycle_vs_path() {
        assert_eq!(isomorphism(&cycle(4), &path(4)), None);
    }

    #[test]
    fn test_relabeled_cycle() {
        let a = cycle(4);
        let b = a.apply_relabeling(&Permutation::new([2, 0, 3, 1]).unwrap()).unwrap();
        assert_isomorphic(&a, &b);
    }

    #[test]
    fn test_two_triangles_vs_hexagon() {
        let triangles = Graph::undirected(6, [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]).unwrap();
        let (result, stats) = Search::new(&triangles, &cycle(6)).run_with_stats();
        assert_eq!(result, None);
        assert!(stats.nodes > 1, "individualization was needed");
    }

    #[test]
    fn test_size_mismatch() {
        assert_eq!(isomorphism(&cycle(4), &cycle(5)), None);
    }

    #[test]
    fn test_petersen_relabeled() {
        let a = petersen();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..5 {
            let b = a.apply_relabeling(&random::permutation(10, &mut rng)).unwrap();
            assert_isomorphic(&a, &b);
        }
    }

    #[test]
    fn test_strongly_regular_pair() {
        let (rook, shrikhande) = (rook_4x4(), shrikhande());
        assert_eq!(rook.edge_count(), shrikhande.edge_count());
        assert_eq!(isomorphism(&rook, &shrikhande), None);

        let mut rng = StdRng::seed_from_u64(3);
        let shuffled = shrikhande.apply_relabeling(&random::permutation(16, &mut rng)).unwrap();
        assert_isomorphic(&shrikhande, &shuffled);
    }

    #[test]
    fn test_directed_cycle_orientation() {
        // a 3-cycle with an edge into it, against the same with the cycle turned around
        let a = Graph::from_edges(4, [(0, 1), (1, 2), (2, 0), (3, 0)]).unwrap();
        let b = Graph::from_edges(4, [(0, 2), (2, 1), (1, 0), (3, 0)]).unwrap();
        assert_isomorphic(&a, &b);
    }

    #[test]
    fn test_two_directed_digons_vs_directed_square() {
        // every vertex has in- and out-degree 1 in both
        let digons = Graph::from_edges(4, [(0, 1), (1, 0), (2, 3), (3, 2)]).unwrap();
        let square = Graph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        assert_eq!(isomorphism(&digons, &square), None);
        assert_isomorphic(&square, &square.reverse());
    }

    #[test]
    fn test_colored_isomorphism() {
        let g = cycle(4);
        // colors pin vertex 0 of `g` to vertex 2 of itself
        let iso = colored_isomorphism(&g, &g, &[1, 0, 0, 0], &[0, 0, 1, 0]).unwrap();
        assert_eq!(iso[0], 2);
        assert_eq!(iso[2], 0);
        assert!(iso.is_isomorphism(&g, &g));

        // adjacent pair colored in `a`, antipodal pair colored in `b`
        assert_eq!(colored_isomorphism(&g, &g, &[1, 1, 0, 0], &[1, 0, 1, 0]), None);
    }

    #[test]
    fn test_class_selection_policies_agree() {
        let mut rng = StdRng::seed_from_u64(5);
        for n in [6, 9, 12] {
            let a = random::undirected_graph(n, n + 3, &mut rng);
            let b = a.apply_relabeling(&random::permutation(n, &mut rng)).unwrap();
            for selection in [ClassSelection::FirstNonTrivial, ClassSelection::SmallestNonTrivial] {
                let iso = Search::new(&a, &b)
                    .options(SearchOptions::default().class_selection(selection))
                    .run()
                    .expect("relabeled graph is isomorphic");
                assert!(iso.is_isomorphism(&a, &b));
            }
        }
    }

    #[test]
    fn test_node_budget() {
        let triangles = Graph::undirected(6, [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]).unwrap();
        let (result, stats) = Search::new(&triangles, &cycle(6))
            .options(SearchOptions::default().node_budget(1))
            .run_with_stats();
        assert_eq!(result, None);
        assert!(stats.budget_exhausted);
        assert_eq!(stats.nodes, 1);

        let (result, stats) = Search::new(&triangles, &triangles)
            .options(SearchOptions::default().node_budget(1000))
            .run_with_stats();
        assert!(result.is_some());
        assert!(!stats.budget_exhausted);
    }

    #[test]
    fn test_random_graphs_match_petgraph() {
        use petgraph::algo::is_isomorphic;

        fn to_petgraph(g: &Graph) -> petgraph::Graph<(), ()> {
            let mut out = petgraph::Graph::new();
            let nodes: Vec<_> = (0..g.size()).map(|_| out.add_node(())).collect();
            for (u, v) in g.edges() {
                out.add_edge(nodes[u], nodes[v], ());
            }
            out
        }

        fn without_loops(g: Graph) -> Graph {
            Graph::from_edges(g.size(), g.edges().filter(|(u, v)| u != v)).unwrap()
        }

        let mut rng = StdRng::seed_from_u64(2024);
        for n in 1..=7 {
            for m in 0..=(n * 2) {
                let a = without_loops(random::graph(n, m, &mut rng));
                let b = without_loops(random::graph(n, m, &mut rng));
                let expected = is_isomorphic(&to_petgraph(&a), &to_petgraph(&b));
                let found = isomorphism(&a, &b);
                assert_eq!(found.is_some(), expected, "n = {n}, m = {m}: {a:?} vs {b:?}");
                if let Some(iso) = found {
                    assert!(iso.is_isomorphism(&a, &b));
                }
            }
        }
    }
}
