use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The two graphs (or a graph and a permutation) have different vertex counts
    #[error("size mismatch: {left} vs {right}")]
    SizeMismatch { left: usize, right: usize },

    #[error("vertex {vertex} out of range for graph of size {size}")]
    VertexOutOfRange { vertex: usize, size: usize },

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("values do not form a permutation")]
    NotAPermutation,

    /// Extraction from an empty ordered set
    #[error("extract from empty set")]
    EmptySet,
}

pub type Result<T> = std::result::Result<T, Error>;
