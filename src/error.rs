//! Error types for orientation search.
//!
//! Every failure aborts the search of the whole batch; there is no per-image
//! recovery. Out-of-range grid coordinates are programming errors and panic
//! instead of appearing here.

use thiserror::Error;

/// Errors raised by the rotation grid, the searches and the oracle adapters.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The scoring model reported training mode. Searches require inference mode.
    #[error("pose search requires the model to be in inference mode, but it is in training mode")]
    TrainingMode,

    /// The memory budget does not split the batch into whole chunks.
    #[error(
        "batch size {batch} must be a positive multiple of the chunk size {chunk} \
         (memory budget {memory_budget_px} px / {pixels} px per image)"
    )]
    ChunkSize {
        /// Number of images in the batch.
        batch: usize,
        /// Images per base-grid chunk derived from the budget.
        chunk: usize,
        /// Configured pixel budget per chunk.
        memory_budget_px: usize,
        /// Pixels per image (`ny * nx`).
        pixels: usize,
    },

    /// More refinement levels than the grid can address.
    #[error("niter = {niter} exceeds the deepest refinement level {max}")]
    TooManyLevels {
        /// Requested refinement levels.
        niter: u32,
        /// Largest accepted `niter`.
        max: u32,
    },

    /// Two per-image inputs disagree on the batch size.
    #[error("{what}: expected {expected} entries, got {actual}")]
    BatchMismatch {
        /// Which input was inconsistent.
        what: &'static str,
        /// Expected count.
        expected: usize,
        /// Actual count.
        actual: usize,
    },

    /// An image buffer length is not a whole number of `ny x nx` images.
    #[error("image buffer of length {len} is not a whole number of {ny}x{nx} images")]
    InvalidImageShape {
        /// Buffer length in pixels.
        len: usize,
        /// Image height.
        ny: usize,
        /// Image width.
        nx: usize,
    },

    /// A latent buffer length is not a whole number of `dim`-vectors.
    #[error("latent buffer of length {len} is not a whole number of {dim}-dimensional vectors")]
    InvalidLatentShape {
        /// Buffer length.
        len: usize,
        /// Latent dimension.
        dim: usize,
    },

    /// A quaternion with zero or non-finite norm cannot be turned into a rotation.
    #[error("degenerate quaternion {q:?} (zero or non-finite norm)")]
    DegenerateQuaternion {
        /// The offending `(w, x, y, z)` quaternion.
        q: [f32; 4],
    },

    /// The oracle produced a NaN reconstruction error.
    #[error("non-finite reconstruction error for image {image}, candidate {candidate}")]
    NonFiniteScore {
        /// Row (image) of the offending entry.
        image: usize,
        /// Column (candidate) of the offending entry.
        candidate: usize,
    },

    /// The oracle returned an error matrix of the wrong shape.
    #[error("oracle returned a {}x{} error matrix, expected {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    OracleShape {
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Returned `(rows, cols)`.
        actual: (usize, usize),
    },

    /// Failure inside the scoring oracle (including resource exhaustion),
    /// propagated unmodified.
    #[error("scoring oracle failed: {0}")]
    Oracle(#[from] anyhow::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SearchError>;
