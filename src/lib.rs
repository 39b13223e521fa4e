pub mod error;
pub mod graph;
pub mod partition;
pub mod permutation;
pub mod refine;
pub mod search;
pub mod set;

/// Reference algorithms for cross-checking on small inputs
pub mod baseline;

/// Isomorphism of open hypergraphs via the colored search
pub mod hypergraph;

pub mod format;
pub mod random;

// fast nogood checks
mod nogood;

pub use error::{Error, Result};
pub use graph::Graph;
pub use hypergraph::Isomorphism;
pub use partition::WlPartition;
pub use permutation::{Bijection, Permutation};
pub use refine::{RefinementFailure, Refiner};
pub use search::{ClassSelection, Search, SearchOptions, SearchStats, colored_isomorphism, isomorphism};
pub use set::OrderedSet;
