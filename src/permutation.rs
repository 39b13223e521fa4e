use std::ops::Deref;

use crate::error::Error;
use crate::graph::Graph;

/// A bijection of `0..n`, stored as the image of each element.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Permutation(Vec<usize>);

/// A vertex bijection from one graph onto another: vertex `v` of the first
/// graph corresponds to vertex `f[v]` of the second.
pub type Bijection = Permutation;

impl Permutation {
    pub fn new(values: impl IntoIterator<Item = usize>) -> Option<Self> {
        let vec: Vec<usize> = values.into_iter().collect();

        if vec.is_empty() {
            return Some(Self(vec));
        }

        let n = vec.len();
        let mut seen = vec![false; n];

        for &value in &vec {
            if value >= n || seen[value] {
                return None;
            }
            seen[value] = true;
        }

        if seen.iter().all(|&x| x) {
            Some(Self(vec))
        } else {
            None
        }
    }

    pub fn identity(size: usize) -> Self {
        Self((0..size).collect())
    }

    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.0.len()];
        for (i, &j) in self.0.iter().enumerate() {
            inv[j] = i;
        }
        Self(inv)
    }

    /// `self` followed by `other`: `i ↦ other[self[i]]`.
    pub fn then(&self, other: &Permutation) -> Option<Self> {
        if self.len() != other.len() {
            return None;
        }
        Some(Self(self.0.iter().map(|&i| other.0[i]).collect()))
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }

    /// Check that this maps `a` onto `b` edge for edge.
    ///
    /// Every vertex must keep its out-degree and every edge `u -> v` of `a` must
    /// have its image `f(u) -> f(v)` in `b`; together these make the edge map
    /// onto.
    pub fn is_isomorphism(&self, a: &Graph, b: &Graph) -> bool {
        if a.size() != b.size() || a.size() != self.len() {
            return false;
        }

        (0..a.size()).all(|u| {
            let fu = self.0[u];
            a.degree(u) == b.degree(fu)
                && a.neighbors(u).iter().all(|&v| b.contains_edge(fu, self.0[v]))
        })
    }
}

impl Deref for Permutation {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = Error;

    fn try_from(values: Vec<usize>) -> Result<Self, Error> {
        Permutation::new(values).ok_or(Error::NotAPermutation)
    }
}
