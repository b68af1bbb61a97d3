//! fathom: product-quantized distance primitives for ANN graph indexes.
//!
//! A graph index (HNSW and friends) only needs three things from a
//! distance space: the per-vector byte footprint, a distance function, and
//! a context value to pass back on every call. This crate provides that
//! space for vectors stored as product-quantization codes (one byte per
//! sub-quantizer), where distance is reconstructed from two small
//! precomputed lookup tables instead of the original floats:
//!
//! - `codebook`: the immutable [`CodebookSet`] (centroid table, norm and
//!   product lookup regions) and its HDF5 loader
//! - `distance`: the branch-minimal integer kernel [`pq_distance`] and its
//!   checked variant
//! - `space`: the [`Space`] contract and its PQ implementation
//!   [`PqSpace`]
//! - `error`: [`LoadError`] and [`CodeError`]
//!
//! The trade: exactness is given up for a constant-size, cache-friendly
//! computation that preserves neighbor ranking under a cosine-style
//! metric. Codebook training and vector encoding happen upstream; this
//! crate only consumes their output.
//!
//! # Usage
//!
//! ```
//! use fathom::{CodebookSet, PqSpace, Space};
//!
//! // Degenerate tables where every entry is 1.0: every pair of codes
//! // comes out at distance zero.
//! let lookup = vec![1.0_f32; 256 + 256 * 256];
//! let dims = vec![lookup.len()];
//! let codebook = CodebookSet::new(Vec::new(), vec![0], lookup, dims, 8)?;
//! let space = PqSpace::new(codebook);
//!
//! let dist = space.dist_func();
//! let ctx = space.dist_func_context();
//! assert_eq!(space.data_size(), 8);
//! assert_eq!(dist(&[1u8; 8], &[2u8; 8], ctx), 0);
//! # Ok::<(), fathom::LoadError>(())
//! ```
//!
//! With a real store, construction is `PqSpace::open("codebook.h5", 32)`
//! (requires the default `hdf5` feature).

pub mod codebook;
pub mod distance;
pub mod error;
pub mod space;

// Re-exports
pub use codebook::CodebookSet;
pub use distance::{pq_distance, pq_distance_checked, DistFn};
pub use error::{CodeError, LoadError};
pub use space::{PqSpace, Space};
