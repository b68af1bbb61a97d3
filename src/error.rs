//! Error types for fathom.

use thiserror::Error;

/// Errors that can occur while loading or assembling a codebook set.
///
/// All of these are fatal to construction: no partially populated
/// [`CodebookSet`](crate::CodebookSet) is ever produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// Store missing or unreadable.
    #[error("failed to open codebook store: {0}")]
    Open(String),

    /// A named dataset is absent from the store.
    #[error("codebook store has no {0:?} dataset")]
    MissingDataset(&'static str),

    /// Reading a dataset's elements failed.
    #[error("failed to read {name:?} dataset: {detail}")]
    Read { name: &'static str, detail: String },

    /// A dataset's element count does not match its reported shape.
    #[error("{name:?} dataset holds {actual} elements, shape implies {expected}")]
    ElementCount {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A flat buffer's length does not match the product of its dims.
    #[error("{name:?} buffer holds {len} elements, dims {dims:?} imply a different count")]
    DimsMismatch {
        name: &'static str,
        len: usize,
        dims: Vec<usize>,
    },

    /// Lookup table too small to hold the norm and product regions.
    #[error("lookup table holds {0} entries, fewer than the 65792 (256 + 256*256) required")]
    LookupTooSmall(usize),

    /// Code length must be a nonzero multiple of 4 for the unrolled kernel.
    #[error("code length {0} is not a nonzero multiple of 4")]
    CodeLength(usize),
}

/// Faults in an individual encoded vector, surfaced only by the checked
/// entry points ([`pq_distance_checked`](crate::pq_distance_checked),
/// [`Space::prepare`](crate::Space::prepare)). The hot distance path
/// performs no per-call checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    /// Code length differs from the space's per-vector data size.
    #[error("code is {actual} bytes, space expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The code reconstructs to a (near-)zero-norm vector, for which the
    /// angular distance is undefined.
    #[error("code reconstructs to a degenerate zero-norm vector")]
    DegenerateNorm,
}
