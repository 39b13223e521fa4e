//! Paired partitions: two vertex partitions, one per graph, with synchronized
//! class ids.
//!
//! Class `k` of graph 0 and class `k` of graph 1 always denote the same color.
//! Each vertex also carries a cached signature hash summarizing the colors of
//! its neighbors, maintained by [`crate::refine`].
use std::collections::BTreeMap;
use std::mem;

use crate::error::{Error, Result};
use crate::permutation::Permutation;
use crate::set::OrderedSet;

/// Class of a vertex that is not currently placed in any class.
pub const UNASSIGNED: usize = usize::MAX;

#[derive(Clone, Debug)]
pub struct WlPartition {
    /// `partition[cls][g]`: members of class `cls` in graph `g`, in insertion order
    partition: Vec<[Vec<usize>; 2]>,
    /// `elements[g][v]`: class of vertex `v` in graph `g`
    elements: [Vec<usize>; 2],
    /// `elements_hash[g][v]`: signature of vertex `v` in graph `g`
    elements_hash: [Vec<u64>; 2],
    /// Color label of each class. Signatures are computed from labels rather than
    /// class ids, so they survive [`WlPartition::compact`].
    labels: Vec<u64>,
    next_label: u64,
    /// Classes whose neighborhood changed since they were last examined
    update_queue: OrderedSet<usize>,
}

impl WlPartition {
    /// Build the coarse partition with one class per distinct value of
    /// `initial_class_of(v, g)`.
    ///
    /// Classes are numbered in increasing key order and all of them are queued
    /// for refinement. A class may be empty in one graph; refinement rejects it.
    pub fn new_with_initial_classes<K: Ord>(
        size_a: usize,
        size_b: usize,
        mut initial_class_of: impl FnMut(usize, usize) -> K,
    ) -> Result<Self> {
        if size_a != size_b {
            return Err(Error::SizeMismatch {
                left: size_a,
                right: size_b,
            });
        }

        let mut keys: [Vec<K>; 2] = [Vec::with_capacity(size_a), Vec::with_capacity(size_b)];
        for (g, list) in keys.iter_mut().enumerate() {
            list.extend((0..size_a).map(|v| initial_class_of(v, g)));
        }

        let mut ids: BTreeMap<&K, usize> = BTreeMap::new();
        for key in keys.iter().flatten() {
            ids.insert(key, 0);
        }
        for (id, slot) in ids.values_mut().enumerate() {
            *slot = id;
        }

        let classes = ids.len();
        let mut p = WlPartition {
            partition: vec![[Vec::new(), Vec::new()]; classes],
            elements: [vec![UNASSIGNED; size_a], vec![UNASSIGNED; size_a]],
            elements_hash: [vec![0; size_a], vec![0; size_a]],
            labels: (0..classes as u64).collect(),
            next_label: classes as u64,
            update_queue: OrderedSet::range(0..classes),
        };

        for (g, keys) in keys.iter().enumerate() {
            for (v, key) in keys.iter().enumerate() {
                p.assign_single(ids[key], g, v);
            }
        }

        Ok(p)
    }

    /// Number of vertices in each graph.
    pub fn size(&self) -> usize {
        self.elements[0].len()
    }

    /// Number of class ids in use, including classes emptied since the last
    /// [`WlPartition::compact`].
    pub fn class_count(&self) -> usize {
        self.partition.len()
    }

    pub fn class_members(&self, cls: usize, g: usize) -> &[usize] {
        &self.partition[cls][g]
    }

    /// Number of members of `cls` in each graph.
    pub fn class_sizes(&self, cls: usize) -> [usize; 2] {
        [self.partition[cls][0].len(), self.partition[cls][1].len()]
    }

    pub fn class_of(&self, g: usize, v: usize) -> usize {
        self.elements[g][v]
    }

    pub fn label(&self, cls: usize) -> u64 {
        self.labels[cls]
    }

    pub fn signature(&self, g: usize, v: usize) -> u64 {
        self.elements_hash[g][v]
    }

    pub(crate) fn set_signatures(&mut self, g: usize, hashes: Vec<u64>) {
        debug_assert_eq!(hashes.len(), self.size());
        self.elements_hash[g] = hashes;
    }

    pub(crate) fn adjust_signature(&mut self, g: usize, v: usize, add: u64, sub: u64) {
        let h = &mut self.elements_hash[g][v];
        *h = h.wrapping_add(add).wrapping_sub(sub);
    }

    /// Allocate a new class, empty in both graphs.
    pub fn new_class(&mut self) -> usize {
        let cls = self.partition.len();
        self.partition.push([Vec::new(), Vec::new()]);
        self.labels.push(self.next_label);
        self.next_label += 1;
        cls
    }

    /// Place `pair[0]` (graph 0) and `pair[1]` (graph 1) into class `cls`.
    ///
    /// The vertices must already have been detached from their previous class.
    pub fn assign(&mut self, cls: usize, pair: [usize; 2]) {
        for (g, v) in pair.into_iter().enumerate() {
            self.assign_single(cls, g, v);
        }
    }

    pub(crate) fn assign_single(&mut self, cls: usize, g: usize, v: usize) {
        debug_assert_eq!(self.elements[g][v], UNASSIGNED, "vertex {v} of graph {g} is assigned");
        self.elements[g][v] = cls;
        self.partition[cls][g].push(v);
    }

    /// Detach `v` from class `cls` of graph `g`. Its signature is left as is.
    pub fn remove_from_class_keep_signature(&mut self, cls: usize, g: usize, v: usize) {
        let members = &mut self.partition[cls][g];
        if let Some(pos) = members.iter().position(|&x| x == v) {
            members.swap_remove(pos);
            self.elements[g][v] = UNASSIGNED;
        }
    }

    /// Empty class `cls` in both graphs, returning its former members.
    pub(crate) fn take_class(&mut self, cls: usize) -> [Vec<usize>; 2] {
        let members = mem::take(&mut self.partition[cls]);
        for (g, list) in members.iter().enumerate() {
            for &v in list {
                self.elements[g][v] = UNASSIGNED;
            }
        }
        members
    }

    pub fn enqueue(&mut self, cls: usize) -> bool {
        self.update_queue.insert(cls)
    }

    pub fn queue(&self) -> &OrderedSet<usize> {
        &self.update_queue
    }

    pub(crate) fn next_queued(&mut self) -> Option<usize> {
        self.update_queue.pop()
    }

    /// Drop classes that are empty in both graphs and renumber the rest densely,
    /// keeping their relative order. Queued class ids are renumbered too.
    pub fn compact(&mut self) {
        let mut mapping = vec![UNASSIGNED; self.partition.len()];
        let mut kept = 0;
        for (cls, members) in self.partition.iter().enumerate() {
            if !members[0].is_empty() || !members[1].is_empty() {
                mapping[cls] = kept;
                kept += 1;
            }
        }
        if kept == self.partition.len() {
            return;
        }

        let partition = mem::take(&mut self.partition);
        let labels = mem::take(&mut self.labels);
        for (members, label) in partition.into_iter().zip(labels) {
            if !members[0].is_empty() || !members[1].is_empty() {
                self.partition.push(members);
                self.labels.push(label);
            }
        }

        for elements in self.elements.iter_mut() {
            for cls in elements.iter_mut().filter(|c| **c != UNASSIGNED) {
                *cls = mapping[*cls];
            }
        }

        if self.update_queue.iter().all(|cls| mapping[cls] != UNASSIGNED) {
            self.update_queue.map_monotonic(|cls| mapping[cls]);
        } else {
            // an emptied class was still queued; it has nothing left to refine
            self.update_queue = self
                .update_queue
                .iter()
                .map(|cls| mapping[cls])
                .filter(|&cls| cls != UNASSIGNED)
                .collect();
        }
    }

    /// True if every non-empty class holds exactly one vertex of each graph.
    pub fn is_discrete(&self) -> bool {
        self.partition
            .iter()
            .all(|[a, b]| (a.is_empty() && b.is_empty()) || (a.len() == 1 && b.len() == 1))
    }

    /// Read off the bijection of a discrete partition: the lone vertex of each
    /// class in graph 0 maps to the lone vertex of the same class in graph 1.
    pub fn bijection(&self) -> Option<Permutation> {
        if !self.is_discrete() {
            return None;
        }
        let mut iso = vec![UNASSIGNED; self.size()];
        for [a, b] in &self.partition {
            if let (Some(&u), Some(&v)) = (a.first(), b.first()) {
                iso[u] = v;
            }
        }
        Permutation::new(iso)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // vertices 0..6 of both graphs, colored by v % 3 in graph 0 and (v + 1) % 3 in graph 1
    fn three_classes() -> WlPartition {
        WlPartition::new_with_initial_classes(6, 6, |v, g| (v + g) % 3).unwrap()
    }

    #[test]
    fn test_initial_classes() {
        let p = three_classes();
        assert_eq!(p.class_count(), 3);
        assert_eq!(p.class_members(0, 0), &[0, 3]);
        assert_eq!(p.class_members(0, 1), &[2, 5]);
        assert_eq!(p.class_members(2, 1), &[1, 4]);
        assert_eq!(p.class_of(1, 4), 2);
        assert_eq!(p.queue().iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_initial_classes_with_one_sided_key() {
        let p = WlPartition::new_with_initial_classes(2, 2, |v, g| if g == 0 { 1 } else { v }).unwrap();
        // keys {0, 1}: class 0 only exists in graph 1
        assert_eq!(p.class_sizes(0), [0, 1]);
        assert_eq!(p.class_sizes(1), [2, 1]);
    }

    #[test]
    fn test_size_mismatch() {
        assert!(matches!(
            WlPartition::new_with_initial_classes(3, 4, |_, _| 0),
            Err(Error::SizeMismatch { left: 3, right: 4 })
        ));
    }

    #[test]
    fn test_individualize() {
        let mut p = three_classes();
        p.remove_from_class_keep_signature(0, 0, 3);
        p.remove_from_class_keep_signature(0, 1, 2);
        assert_eq!(p.class_of(0, 3), UNASSIGNED);

        let cls = p.new_class();
        assert_eq!(cls, 3);
        p.assign(cls, [3, 2]);
        assert_eq!(p.class_members(0, 0), &[0]);
        assert_eq!(p.class_members(0, 1), &[5]);
        assert_eq!(p.class_of(0, 3), cls);
        assert_eq!(p.class_of(1, 2), cls);
        assert_eq!(p.label(cls), 3);
    }

    #[test]
    fn test_compact_is_idempotent_on_compact_partition() {
        let mut p = three_classes();
        let before = p.clone();
        p.compact();
        assert_eq!(p.partition, before.partition);
        assert_eq!(p.elements, before.elements);
        assert_eq!(p.labels, before.labels);
        assert!(p.queue().iter().eq(before.queue().iter()));
    }

    #[test]
    fn test_compact_renumbers_and_keeps_labels() {
        let mut p = three_classes();
        while p.next_queued().is_some() {}

        let members = p.take_class(1);
        let new = p.new_class();
        for (g, list) in members.iter().enumerate() {
            for &v in list {
                p.assign_single(new, g, v);
            }
        }
        p.enqueue(2);
        p.enqueue(new);

        p.compact();
        assert_eq!(p.class_count(), 3);
        assert_eq!(p.class_members(2, 0), &[1, 4]);
        assert_eq!(p.class_of(0, 4), 2);
        assert_eq!(p.class_of(0, 5), 1);
        assert_eq!(p.label(2), 3);
        assert_eq!(p.label(1), 2);
        assert_eq!(p.queue().iter().collect::<Vec<_>>(), vec![1, 2]);

        // compacting again changes nothing
        let again = p.clone();
        p.compact();
        assert_eq!(p.partition, again.partition);
        assert!(p.queue().iter().eq(again.queue().iter()));
    }

    #[test]
    fn test_compact_drops_queued_empty_class() {
        let mut p = three_classes();
        let members = p.take_class(0);
        let new = p.new_class();
        for (g, list) in members.iter().enumerate() {
            for &v in list {
                p.assign_single(new, g, v);
            }
        }
        // class 0 is still queued from construction
        p.compact();
        assert_eq!(p.queue().iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_clone_is_independent() {
        let p = three_classes();
        let mut q = p.clone();
        q.remove_from_class_keep_signature(1, 0, 1);
        q.next_queued();
        assert_eq!(p.class_members(1, 0), &[1, 4]);
        assert_eq!(p.queue().len(), 3);
    }

    #[test]
    fn test_bijection() {
        let p = WlPartition::new_with_initial_classes(3, 3, |v, g| if g == 0 { v } else { 2 - v }).unwrap();
        assert!(p.is_discrete());
        assert_eq!(&*p.bijection().unwrap(), &[2, 1, 0]);
        assert!(three_classes().bijection().is_none());
    }

    #[test]
    fn test_empty_partition() {
        let p = WlPartition::new_with_initial_classes(0, 0, |_, _| 0).unwrap();
        assert_eq!(p.class_count(), 0);
        assert!(p.is_discrete());
        assert_eq!(p.bijection(), Some(Permutation::identity(0)));
    }
}
