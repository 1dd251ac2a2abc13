//! Error type for `TieredVec` operations.

use std::alloc::Layout;

use thiserror::Error;

/// The error type returned by fallible `TieredVec` operations.
///
/// A failed operation never leaves the container half-modified: allocation
/// happens before any node is spliced, and index checks happen before either.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TieredVecError {
    /// The index does not name an element (or insertion point).
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The container length at the time of the call.
        len: usize,
    },

    /// The first tier must hold at least one element.
    #[error("base capacity must be greater than zero")]
    InvalidBaseCapacity,

    /// A snapshot's declared length disagrees with its element list.
    #[error("snapshot declares {declared} elements but holds {actual}")]
    SnapshotLengthMismatch {
        /// Length recorded in the snapshot header.
        declared: usize,
        /// Number of elements actually present.
        actual: usize,
    },

    /// The tier table size could not be computed.
    #[error("memory allocation failed due to capacity overflow")]
    CapacityOverflow,

    /// Memory allocation failed.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError {
        /// The layout of the failed request.
        layout: Layout,
    },
}

impl TieredVecError {
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }

    pub(crate) fn alloc_error(layout: Layout) -> Self {
        Self::AllocError { layout }
    }

    /// Returns `true` for the allocation failure kinds.
    pub fn is_alloc_failure(&self) -> bool {
        matches!(self, Self::AllocError { .. } | Self::CapacityOverflow)
    }
}
