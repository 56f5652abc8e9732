use thiserror::Error;

/// Errors reported by [`BspTree`](crate::BspTree) queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The tree holds no points: either `build` was never called, or it ran
    /// on an empty point set.
    #[error("the index is empty; build it from a non-empty point set first")]
    EmptyIndex,
}
