//! Codebook storage for product-quantized distance evaluation.
//!
//! A [`CodebookSet`] bundles the precomputed state a distance call needs:
//! the centroid table (metadata here; encoding happens upstream) and a flat
//! lookup table split into two logical regions:
//!
//! - **norm region** (`[..256]`): per-byte contribution to a reconstructed
//!   vector's squared norm, shared across every sub-quantizer position
//! - **product region** (`[256..256 + 65536]`): inner-product contribution
//!   for an ordered byte pair, indexed by `(a << 8) | b`, shared across
//!   position groups
//!
//! Sharing a single product table across positions is a property of the
//! external training pipeline, not something this crate derives or checks.
//!
//! The set is immutable once built and is shared read-only by every
//! distance call for the lifetime of the index that uses it. Structural
//! invariants (dims products, region sizes, code length alignment) are
//! enforced once in [`CodebookSet::new`] so the kernel never re-checks them.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Entries in the norm region of the lookup table (one per byte value).
pub const NORM_TABLE_LEN: usize = 256;

/// Entries in the product region (one per ordered byte pair).
pub const PROD_TABLE_LEN: usize = 256 * 256;

/// Sub-quantizer positions consumed per unrolled step of the kernel.
/// Code lengths must be a multiple of this.
pub const GROUP: usize = 4;

/// Immutable codebook state shared by all distance calls of one space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodebookSet {
    centroids: Box<[f32]>,
    centroid_dims: Vec<usize>,
    lookup: Box<[f32]>,
    lookup_dims: Vec<usize>,
    code_length: usize,
    query_scale: f32,
}

impl CodebookSet {
    /// Assemble a codebook set from flat buffers and their logical shapes.
    ///
    /// Validates structure only: each dims product must equal its buffer
    /// length, the lookup table must cover both regions, and `code_length`
    /// must be a nonzero multiple of [`GROUP`]. Table *contents* are the
    /// training pipeline's responsibility and are not inspected.
    pub fn new(
        centroids: Vec<f32>,
        centroid_dims: Vec<usize>,
        lookup: Vec<f32>,
        lookup_dims: Vec<usize>,
        code_length: usize,
    ) -> Result<Self, LoadError> {
        if centroid_dims.iter().product::<usize>() != centroids.len() {
            return Err(LoadError::DimsMismatch {
                name: "data",
                len: centroids.len(),
                dims: centroid_dims,
            });
        }
        if lookup_dims.iter().product::<usize>() != lookup.len() {
            return Err(LoadError::DimsMismatch {
                name: "dis_data",
                len: lookup.len(),
                dims: lookup_dims,
            });
        }
        if lookup.len() < NORM_TABLE_LEN + PROD_TABLE_LEN {
            return Err(LoadError::LookupTooSmall(lookup.len()));
        }
        if code_length == 0 || code_length % GROUP != 0 {
            return Err(LoadError::CodeLength(code_length));
        }

        Ok(Self {
            centroids: centroids.into_boxed_slice(),
            centroid_dims,
            lookup: lookup.into_boxed_slice(),
            lookup_dims,
            code_length,
            query_scale: 1.0,
        })
    }

    /// Load a codebook set from an HDF5 store.
    ///
    /// The store must expose two float32 datasets: `"data"` (centroid
    /// table) and `"dis_data"` (lookup table, flattened to norm region
    /// followed by product region). Dims are taken from the reported
    /// dataset shapes.
    #[cfg(feature = "hdf5")]
    pub fn load<P: AsRef<std::path::Path>>(
        path: P,
        code_length: usize,
    ) -> Result<Self, LoadError> {
        let file = hdf5::File::open(path).map_err(|e| LoadError::Open(e.to_string()))?;

        let (centroids, centroid_dims) = read_f32_dataset(&file, "data")?;
        let (lookup, lookup_dims) = read_f32_dataset(&file, "dis_data")?;

        Self::new(centroids, centroid_dims, lookup, lookup_dims, code_length)
    }

    /// Bytes per encoded vector.
    #[inline]
    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Flat centroid table.
    pub fn centroids(&self) -> &[f32] {
        &self.centroids
    }

    /// Logical shape of the centroid table.
    pub fn centroid_dims(&self) -> &[usize] {
        &self.centroid_dims
    }

    /// Flat lookup table, norm region followed by product region.
    pub fn lookup_table(&self) -> &[f32] {
        &self.lookup
    }

    /// Logical shape of the lookup table as stored.
    pub fn lookup_dims(&self) -> &[usize] {
        &self.lookup_dims
    }

    /// Per-byte squared-norm contributions (first 256 lookup entries).
    #[inline]
    pub fn norm_lookup(&self) -> &[f32] {
        &self.lookup[..NORM_TABLE_LEN]
    }

    /// Per-byte-pair inner-product contributions, indexed by
    /// `(a << 8) | b`.
    #[inline]
    pub fn prod_lookup(&self) -> &[f32] {
        &self.lookup[NORM_TABLE_LEN..NORM_TABLE_LEN + PROD_TABLE_LEN]
    }

    /// Scalar reserved for query-side normalization. Not consumed by the
    /// current distance formula.
    #[inline]
    pub fn query_scale(&self) -> f32 {
        self.query_scale
    }

    /// Replace the carried query scale.
    #[must_use]
    pub fn with_query_scale(mut self, query_scale: f32) -> Self {
        self.query_scale = query_scale;
        self
    }
}

#[cfg(feature = "hdf5")]
fn read_f32_dataset(
    file: &hdf5::File,
    name: &'static str,
) -> Result<(Vec<f32>, Vec<usize>), LoadError> {
    let dataset = file
        .dataset(name)
        .map_err(|_| LoadError::MissingDataset(name))?;

    let dims = dataset.shape();
    let expected: usize = dims.iter().product();

    let values = dataset.read_raw::<f32>().map_err(|e| LoadError::Read {
        name,
        detail: e.to_string(),
    })?;

    if values.len() != expected {
        return Err(LoadError::ElementCount {
            name,
            expected,
            actual: values.len(),
        });
    }

    Ok((values, dims))
}
