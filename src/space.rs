//! Space adapter: binds a codebook to the contract an ANN index expects.
//!
//! Graph indexes in the hnswlib lineage are generic over a "space": they
//! ask it once, at construction, for the per-vector storage footprint, a
//! distance function pointer, and a context value passed back on every
//! distance call. [`Space`] is that contract with a concrete context type
//! in place of an untyped pointer, and [`PqSpace`] is its product-quantized
//! implementation.
//!
//! The index keeps the references it obtained here for its whole lifetime,
//! so a space must outlive any index built on it; the borrow returned by
//! [`Space::dist_func_context`] makes the compiler enforce exactly that.

use crate::codebook::CodebookSet;
use crate::distance::{pq_distance, DistFn, NORM_EPSILON};
use crate::error::CodeError;
#[cfg(feature = "hdf5")]
use crate::error::LoadError;

/// The capability set a host ANN index requires from a distance space.
pub trait Space {
    /// Shared read-only state passed to every distance call.
    type Context;

    /// Per-vector storage footprint in bytes. The index allocates exactly
    /// this much for each stored code and hands buffers of this length to
    /// the distance function.
    fn data_size(&self) -> usize;

    /// The distance function the index should invoke.
    fn dist_func(&self) -> DistFn<Self::Context>;

    /// The context to pass as the distance function's third argument.
    /// Taken once at index construction; the space must stay alive and
    /// unmoved-from for as long as the index uses it.
    fn dist_func_context(&self) -> &Self::Context;

    /// Optional query-preparation stage, run before the index starts
    /// issuing distance calls for a query. The base contract needs no
    /// preparation; spaces with per-query preconditions override this to
    /// surface violations as errors up front rather than as garbage
    /// distances mid-search.
    fn prepare(&self, _query: &[u8]) -> Result<(), CodeError> {
        Ok(())
    }
}

/// Product-quantized angular distance space.
///
/// Owns the [`CodebookSet`] for its lifetime and exposes the unchecked
/// [`pq_distance`] kernel plus the owned set as context.
#[derive(Debug, Clone)]
pub struct PqSpace {
    codebook: CodebookSet,
}

impl PqSpace {
    /// Wrap an already-constructed codebook set.
    pub fn new(codebook: CodebookSet) -> Self {
        Self { codebook }
    }

    /// Load the codebook store at `path` and build a space over it.
    ///
    /// `code_length` is the per-vector code size in bytes; it must be a
    /// nonzero multiple of 4, which is checked here (at construction) so
    /// the distance path never has to.
    #[cfg(feature = "hdf5")]
    pub fn open<P: AsRef<std::path::Path>>(
        path: P,
        code_length: usize,
    ) -> Result<Self, LoadError> {
        Ok(Self::new(CodebookSet::load(path, code_length)?))
    }

    /// The codebook set backing this space.
    pub fn codebook(&self) -> &CodebookSet {
        &self.codebook
    }
}

impl Space for PqSpace {
    type Context = CodebookSet;

    fn data_size(&self) -> usize {
        self.codebook.code_length()
    }

    fn dist_func(&self) -> DistFn<CodebookSet> {
        pq_distance
    }

    fn dist_func_context(&self) -> &CodebookSet {
        &self.codebook
    }

    /// Reject queries the unchecked kernel would mangle: wrong-length
    /// codes, and codes whose reconstructed norm is degenerate (the
    /// angular formula would divide by ≈0).
    fn prepare(&self, query: &[u8]) -> Result<(), CodeError> {
        let expected = self.codebook.code_length();
        if query.len() != expected {
            return Err(CodeError::LengthMismatch {
                expected,
                actual: query.len(),
            });
        }

        let norm_lut = self.codebook.norm_lookup();
        let norm: f32 = query.iter().map(|&c| norm_lut[c as usize]).sum();
        if norm <= NORM_EPSILON {
            return Err(CodeError::DegenerateNorm);
        }
        Ok(())
    }
}
