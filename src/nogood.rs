use crate::graph::Graph;
use std::hash::Hash;

/// Cheap necessary conditions for `a` and `b` to be isomorphic: equal vertex
/// and edge counts, equal out- and in-degree sequences, and equal color
/// multisets when colors are given.
pub(crate) fn nogood(a: &Graph, b: &Graph, colors: Option<[&[usize]; 2]>) -> Option<()> {
    if a.size() != b.size() || a.edge_count() != b.edge_count() {
        return None;
    }

    if !is_sorted_equal(&out_degrees(a), &out_degrees(b)) {
        return None;
    }

    if !is_sorted_equal(&in_degrees(a), &in_degrees(b)) {
        return None;
    }

    if let Some([ca, cb]) = colors {
        if ca.len() != a.size() || !is_sorted_equal(ca, cb) {
            return None;
        }
    }

    Some(())
}

fn out_degrees(g: &Graph) -> Vec<usize> {
    (0..g.size()).map(|v| g.degree(v)).collect()
}

fn in_degrees(g: &Graph) -> Vec<usize> {
    let mut degrees = vec![0; g.size()];
    for (_, v) in g.edges() {
        degrees[v] += 1;
    }
    degrees
}

/// Check that two slices are equal once sorted (exact length and elements)
pub(crate) fn is_sorted_equal<T: Eq + Hash>(x: &[T], y: &[T]) -> bool {
    if x.len() != y.len() {
        return false;
    }

    use std::collections::HashMap;
    let mut counts = HashMap::new();

    for item in x {
        *counts.entry(item).or_insert(0) += 1;
    }

    for item in y {
        match counts.get_mut(item) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }

    true
}
