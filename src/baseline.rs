//! Simple reference algorithms, used to cross-check the refinement search on
//! small graphs. Both are exponential.
use crate::graph::Graph;
use crate::permutation::{Bijection, Permutation};

/// Try every bijection in lexicographic order.
pub fn brute_force(a: &Graph, b: &Graph) -> Option<Bijection> {
    if a.size() != b.size() {
        return None;
    }

    let mut iso: Vec<usize> = (0..a.size()).collect();
    loop {
        let candidate = Permutation::new(iso.iter().copied())?;
        if candidate.is_isomorphism(a, b) {
            return Some(candidate);
        }
        if !next_permutation(&mut iso) {
            return None;
        }
    }
}

/// Advance `values` to the next permutation in lexicographic order, returning
/// `false` (and leaving it untouched) if it is already the last one.
fn next_permutation(values: &mut [usize]) -> bool {
    let n = values.len();
    // longest non-increasing suffix starts at `k + 1`
    let Some(k) = (0..n.saturating_sub(1)).rev().find(|&k| values[k] < values[k + 1]) else {
        return false;
    };
    let Some(l) = (k + 1..n).rev().find(|&l| values[l] > values[k]) else {
        return false;
    };
    values.swap(k, l);
    values[k + 1..].reverse();
    true
}

/// Extend a partial bijection one vertex at a time, checking the edges between
/// the new vertex and those already mapped.
pub fn backtrack(a: &Graph, b: &Graph) -> Option<Bijection> {
    if a.size() != b.size() {
        return None;
    }

    let search = Backtrack {
        a,
        b,
        a_reversed: a.reverse(),
        b_reversed: b.reverse(),
    };
    // iso[..i] is fixed; iso[i..] holds the vertices of `b` still unused
    let mut iso: Vec<usize> = (0..a.size()).collect();
    if search.extend(&mut iso, 0) {
        Permutation::new(iso)
    } else {
        None
    }
}

struct Backtrack<'a> {
    a: &'a Graph,
    b: &'a Graph,
    a_reversed: Graph,
    b_reversed: Graph,
}

impl Backtrack<'_> {
    fn extend(&self, iso: &mut [usize], i: usize) -> bool {
        if i == iso.len() {
            return true;
        }
        for j in i..iso.len() {
            iso.swap(i, j);
            if self.consistent(iso, i) && self.extend(iso, i + 1) {
                return true;
            }
            iso.swap(i, j);
        }
        false
    }

    /// Can vertex `i` of `a` map to `iso[i]`, given `iso[..i]`?
    fn consistent(&self, iso: &[usize], i: usize) -> bool {
        let fi = iso[i];
        if self.a.degree(i) != self.b.degree(fi) || self.a_reversed.degree(i) != self.b_reversed.degree(fi) {
            return false;
        }

        let out_ok = self
            .a
            .neighbors(i)
            .iter()
            .filter(|&&k| k <= i)
            .all(|&k| self.b.contains_edge(fi, iso[k]));
        let in_ok = self
            .a_reversed
            .neighbors(i)
            .iter()
            .filter(|&&k| k < i)
            .all(|&k| self.b.contains_edge(iso[k], fi));
        out_ok && in_ok
    }
}
