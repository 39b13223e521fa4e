//! Color refinement (1-dimensional Weisfeiler-Lehman) over a paired partition.
//!
//! Every vertex carries a signature hash: the wrapping sum of one weight per
//! out-neighbor and one (differently mixed) weight per in-neighbor, each a
//! function of that neighbor's class label. When a vertex changes class, only
//! the signatures of its neighbors change, so they are patched in place and
//! their classes are queued for another look. Refinement drains the queue,
//! splitting classes whose members disagree on signature, until it is empty
//! (a stable partition) or the two graphs are caught splitting differently.
use log::trace;
use thiserror::Error;

use crate::error::{Error as CrateError, Result};
use crate::graph::Graph;
use crate::partition::WlPartition;

/// Proof that no isomorphism respects the current partition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefinementFailure {
    #[error("class {class} has {} vertices in the first graph and {} in the second", .sizes[0], .sizes[1])]
    ClassSizeMismatch { class: usize, sizes: [usize; 2] },

    #[error("class {class} has different neighbor signatures in the two graphs")]
    SignatureMismatch { class: usize },
}

/// splitmix64 finalizer
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Weight contributed to a vertex by an out-neighbor of color `label`.
fn forward_weight(label: u64) -> u64 {
    mix(label)
}

/// Weight contributed to a vertex by an in-neighbor of color `label`.
fn reverse_weight(label: u64) -> u64 {
    mix(label).rotate_left(29) ^ 0x5bd1_e995
}

/// Refines paired partitions of a fixed pair of graphs.
///
/// Holds both graphs and their reverses, computed once.
pub struct Refiner<'a> {
    graphs: [&'a Graph; 2],
    reversed: [Graph; 2],
}

impl<'a> Refiner<'a> {
    pub fn new(a: &'a Graph, b: &'a Graph) -> Result<Self> {
        if a.size() != b.size() {
            return Err(CrateError::SizeMismatch {
                left: a.size(),
                right: b.size(),
            });
        }
        Ok(Refiner {
            graphs: [a, b],
            reversed: [a.reverse(), b.reverse()],
        })
    }

    pub fn graph(&self, g: usize) -> &Graph {
        self.graphs[g]
    }

    /// The coarse partition given by `initial_class_of(v, g)`, with signatures
    /// computed and every class queued.
    pub fn initial_partition<K: Ord>(
        &self,
        initial_class_of: impl FnMut(usize, usize) -> K,
    ) -> Result<WlPartition> {
        let mut p = WlPartition::new_with_initial_classes(
            self.graphs[0].size(),
            self.graphs[1].size(),
            initial_class_of,
        )?;
        self.rehash(&mut p);
        Ok(p)
    }

    /// One class per distinct out-degree.
    pub fn degree_partition(&self) -> Result<WlPartition> {
        self.initial_partition(|v, g| self.graphs[g].degree(v))
    }

    /// Recompute every signature from scratch.
    pub fn rehash(&self, p: &mut WlPartition) {
        for (g, graph) in self.graphs.iter().enumerate() {
            let mut hashes = vec![0u64; graph.size()];
            for (u, v) in graph.edges() {
                let (cu, cv) = (p.label(p.class_of(g, u)), p.label(p.class_of(g, v)));
                hashes[u] = hashes[u].wrapping_add(forward_weight(cv));
                hashes[v] = hashes[v].wrapping_add(reverse_weight(cu));
            }
            p.set_signatures(g, hashes);
        }
    }

    /// Refine `p` until no queued class remains.
    pub fn stabilize(&self, p: &mut WlPartition) -> std::result::Result<(), RefinementFailure> {
        while let Some(cls) = p.next_queued() {
            self.refine_class(p, cls).inspect_err(|failure| trace!("refinement failed: {failure}"))?;
        }
        Ok(())
    }

    /// Move `pair[0]` and `pair[1]` out of class `cls` into a fresh class of
    /// their own, returning the new class.
    pub fn individualize(&self, p: &mut WlPartition, cls: usize, pair: [usize; 2]) -> usize {
        let old_label = p.label(cls);
        for (g, v) in pair.into_iter().enumerate() {
            p.remove_from_class_keep_signature(cls, g, v);
        }
        let new = p.new_class();
        p.assign(new, pair);

        let new_label = p.label(new);
        for (g, v) in pair.into_iter().enumerate() {
            self.relabel(p, g, v, old_label, new_label);
        }
        p.enqueue(cls);
        p.enqueue(new);
        new
    }

    fn refine_class(&self, p: &mut WlPartition, cls: usize) -> std::result::Result<(), RefinementFailure> {
        let sizes = p.class_sizes(cls);
        if sizes[0] != sizes[1] {
            return Err(RefinementFailure::ClassSizeMismatch { class: cls, sizes });
        }
        match sizes[0] {
            0 => Ok(()),
            1 => self.check_singleton(p, cls),
            _ => self.split(p, cls),
        }
    }

    /// The lone vertices of a singleton class must agree on signature and on
    /// the exact classes of their neighbors.
    fn check_singleton(&self, p: &WlPartition, cls: usize) -> std::result::Result<(), RefinementFailure> {
        let pair = [p.class_members(cls, 0)[0], p.class_members(cls, 1)[0]];
        if p.signature(0, pair[0]) != p.signature(1, pair[1]) {
            return Err(RefinementFailure::SignatureMismatch { class: cls });
        }

        let neighbor_classes = |g: usize, graph: &Graph| {
            let mut classes: Vec<usize> = graph.neighbors(pair[g]).iter().map(|&u| p.class_of(g, u)).collect();
            classes.sort_unstable();
            classes
        };
        let forward = neighbor_classes(0, self.graphs[0]) == neighbor_classes(1, self.graphs[1]);
        let reverse = neighbor_classes(0, &self.reversed[0]) == neighbor_classes(1, &self.reversed[1]);
        if forward && reverse {
            Ok(())
        } else {
            Err(RefinementFailure::SignatureMismatch { class: cls })
        }
    }

    /// Split `cls` into one class per distinct signature.
    fn split(&self, p: &mut WlPartition, cls: usize) -> std::result::Result<(), RefinementFailure> {
        let keyed: [Vec<(u64, usize)>; 2] = [0, 1].map(|g| {
            let mut keyed: Vec<(u64, usize)> =
                p.class_members(cls, g).iter().map(|&v| (p.signature(g, v), v)).collect();
            keyed.sort_unstable();
            keyed
        });

        let extremes = |keyed: &[(u64, usize)]| (keyed[0].0, keyed[keyed.len() - 1].0);
        let (lo0, hi0) = extremes(&keyed[0]);
        let (lo1, hi1) = extremes(&keyed[1]);
        if lo0 == hi0 && lo1 == hi1 {
            return if lo0 == lo1 {
                Ok(())
            } else {
                Err(RefinementFailure::SignatureMismatch { class: cls })
            };
        }

        // runs must line up across the two graphs in signature and length
        let runs = signature_runs(&keyed[0]);
        if runs != signature_runs(&keyed[1]) {
            return Err(RefinementFailure::SignatureMismatch { class: cls });
        }

        let old_label = p.label(cls);
        p.take_class(cls);
        for &(_, start, end) in &runs {
            let new = p.new_class();
            for (g, keyed) in keyed.iter().enumerate() {
                for &(_, v) in &keyed[start..end] {
                    p.assign_single(new, g, v);
                }
            }
            p.enqueue(new);
        }

        for (g, keyed) in keyed.iter().enumerate() {
            for &(_, v) in keyed {
                let new_label = p.label(p.class_of(g, v));
                self.relabel(p, g, v, old_label, new_label);
            }
        }
        trace!("split class {cls} into {} classes", runs.len());
        Ok(())
    }

    /// Patch the signatures of the neighbors of `v` after `v` moved from the
    /// class labelled `old` to the class labelled `new`, and queue their classes.
    fn relabel(&self, p: &mut WlPartition, g: usize, v: usize, old: u64, new: u64) {
        // `v` is an out-neighbor of each of its in-neighbors
        let (add, sub) = (forward_weight(new), forward_weight(old));
        for &u in self.reversed[g].neighbors(v) {
            p.adjust_signature(g, u, add, sub);
            p.enqueue(p.class_of(g, u));
        }

        let (add, sub) = (reverse_weight(new), reverse_weight(old));
        for &u in self.graphs[g].neighbors(v) {
            p.adjust_signature(g, u, add, sub);
            p.enqueue(p.class_of(g, u));
        }
    }
}

/// `(signature, start, end)` for each run of equal signature in a sorted slice.
fn signature_runs(keyed: &[(u64, usize)]) -> Vec<(u64, usize, usize)> {
    keyed
        .chunk_by(|x, y| x.0 == y.0)
        .scan(0, |start, run| {
            let range = (run[0].0, *start, *start + run.len());
            *start += run.len();
            Some(range)
        })
        .collect()
}
