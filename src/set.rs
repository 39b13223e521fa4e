//! Ordered set of small integers backed by a splay tree.
//!
//! Nodes live in an arena (`Vec`) and refer to each other by index, so cloning
//! the set is a plain deep copy with no sharing. Splaying is top-down: the
//! search path is split into a left tree (values below the key) and a right tree
//! (values above it), rotating on zig-zig steps, and reassembled under the node
//! reached last.
use std::cmp::Ordering;

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct OrderedSet<T> {
    nodes: Vec<Node<T>>,
    // slots of extracted nodes, reused by `insert`
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }
}

impl<T: Ord + Copy> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Insert `value`, returning `true` if it was not already present.
    pub fn insert(&mut self, value: T) -> bool {
        let Some(root) = self.root else {
            self.root = Some(self.alloc(value, None, None));
            self.len = 1;
            return true;
        };

        let root = self.splay(root, value);
        let top = match value.cmp(&self.nodes[root].value) {
            Ordering::Equal => {
                self.root = Some(root);
                return false;
            }
            Ordering::Less => {
                let left = self.nodes[root].left.take();
                self.alloc(value, left, Some(root))
            }
            Ordering::Greater => {
                let right = self.nodes[root].right.take();
                self.alloc(value, Some(root), right)
            }
        };

        self.root = Some(top);
        self.len += 1;
        true
    }

    /// Remove and return the element currently at the root, if any.
    pub fn pop(&mut self) -> Option<T> {
        let root = self.root?;
        let value = self.nodes[root].value;
        let (left, right) = (self.nodes[root].left, self.nodes[root].right);
        self.free.push(root);

        // Every value of the left subtree is below `value`, so splaying for it
        // lifts the maximum, which has no right child.
        self.root = match left {
            None => right,
            Some(left) => {
                let top = self.splay(left, value);
                self.nodes[top].right = right;
                Some(top)
            }
        };
        self.len -= 1;
        Some(value)
    }

    /// Remove and return some member of the set.
    pub fn extract_any(&mut self) -> Result<T> {
        self.pop().ok_or(Error::EmptySet)
    }

    /// Membership test. Does not restructure the tree.
    pub fn contains(&self, value: T) -> bool {
        let mut cursor = self.root;
        while let Some(ix) = cursor {
            let node = &self.nodes[ix];
            cursor = match value.cmp(&node.value) {
                Ordering::Equal => return true,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        false
    }

    /// Values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            set: self,
            stack: Vec::new(),
        };
        iter.push_left(self.root);
        iter
    }

    /// Replace every value `v` with `f(v)`.
    ///
    /// `f` must be strictly increasing on the stored values; the tree shape is
    /// kept as is.
    pub fn map_monotonic(&mut self, mut f: impl FnMut(T) -> T) {
        let order: Vec<usize> = self.iter_indices();
        let mut previous: Option<T> = None;
        for ix in order {
            let mapped = f(self.nodes[ix].value);
            debug_assert!(previous.is_none_or(|p| p < mapped), "map is not monotonic");
            previous = Some(mapped);
            self.nodes[ix].value = mapped;
        }
    }

    fn alloc(&mut self, value: T, left: Option<usize>, right: Option<usize>) -> usize {
        let node = Node { value, left, right };
        match self.free.pop() {
            Some(ix) => {
                self.nodes[ix] = node;
                ix
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn iter_indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cursor = self.root;
        loop {
            while let Some(ix) = cursor {
                stack.push(ix);
                cursor = self.nodes[ix].left;
            }
            let Some(ix) = stack.pop() else { break };
            out.push(ix);
            cursor = self.nodes[ix].right;
        }
        out
    }

    /// Splay the subtree rooted at `t` for `value`, returning the new subtree root.
    ///
    /// The new root holds `value` if it is present, otherwise the last node on
    /// the search path (its predecessor or successor).
    fn splay(&mut self, mut t: usize, value: T) -> usize {
        // roots of the assembled side trees, and the nodes new pieces hang off
        let (mut left_root, mut right_root) = (None, None);
        let (mut left_max, mut right_min): (Option<usize>, Option<usize>) = (None, None);

        loop {
            match value.cmp(&self.nodes[t].value) {
                Ordering::Less => {
                    let Some(mut child) = self.nodes[t].left else { break };
                    if value < self.nodes[child].value {
                        // zig-zig: rotate right
                        self.nodes[t].left = self.nodes[child].right;
                        self.nodes[child].right = Some(t);
                        t = child;
                        match self.nodes[t].left {
                            Some(next) => child = next,
                            None => break,
                        }
                    }
                    // link t into the right tree
                    match right_min {
                        None => right_root = Some(t),
                        Some(r) => self.nodes[r].left = Some(t),
                    }
                    right_min = Some(t);
                    t = child;
                }
                Ordering::Greater => {
                    let Some(mut child) = self.nodes[t].right else { break };
                    if value > self.nodes[child].value {
                        // zig-zig: rotate left
                        self.nodes[t].right = self.nodes[child].left;
                        self.nodes[child].left = Some(t);
                        t = child;
                        match self.nodes[t].right {
                            Some(next) => child = next,
                            None => break,
                        }
                    }
                    // link t into the left tree
                    match left_max {
                        None => left_root = Some(t),
                        Some(l) => self.nodes[l].right = Some(t),
                    }
                    left_max = Some(t);
                    t = child;
                }
                Ordering::Equal => break,
            }
        }

        // reassemble
        match left_max {
            None => left_root = self.nodes[t].left,
            Some(l) => self.nodes[l].right = self.nodes[t].left,
        }
        match right_min {
            None => right_root = self.nodes[t].right,
            Some(r) => self.nodes[r].left = self.nodes[t].right,
        }
        self.nodes[t].left = left_root;
        self.nodes[t].right = right_root;
        t
    }
}

impl OrderedSet<usize> {
    /// The set `{start, .., end - 1}`.
    pub fn range(range: std::ops::Range<usize>) -> Self {
        range.collect()
    }
}

impl<T: Ord + Copy> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord + Copy> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

/// In-order iterator over an [`OrderedSet`].
pub struct Iter<'a, T> {
    set: &'a OrderedSet<T>,
    stack: Vec<usize>,
}

impl<T> Iter<'_, T> {
    fn push_left(&mut self, mut cursor: Option<usize>) {
        while let Some(ix) = cursor {
            self.stack.push(ix);
            cursor = self.set.nodes[ix].left;
        }
    }
}

impl<T: Copy> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let ix = self.stack.pop()?;
        let node = &self.set.nodes[ix];
        let (value, right) = (node.value, node.right);
        self.push_left(right);
        Some(value)
    }
}
