//! Search with a per-image latent conformation.
//!
//! Unlike the homogeneous case no base rendering can be shared between
//! images, so scoring the base grid renders `B × 576` projections. To bound
//! working memory the batch is split into chunks of
//! `memory_budget_px / (ny * nx)` images; each chunk is scored against the full
//! base grid independently and the per-chunk argmins are concatenated back in
//! batch order. Chunking changes peak memory only, never the selections.

use tracing::debug;

use super::scoring::{argmin_rows, check_shape};
use super::{base_states, check_levels, descend, require_inference, PoseEstimate, SearchConfig};
use crate::batch::{ImageBatch, LatentBatch};
use crate::error::{Result, SearchError};
use crate::oracle::ScoringOracle;
use crate::so3_grid::base_grid;

/// Branch-and-bound search conditioned on one fixed latent vector per image.
#[derive(Debug, Clone, Default)]
pub struct HeterogeneousSearch {
    pub config: SearchConfig,
}

impl HeterogeneousSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Number of images per base-grid chunk for `ny × nx` images.
    ///
    /// Fails when the budget cannot fit a single image, or when `batch` is not
    /// an exact multiple of the chunk size. Images are never dropped or padded.
    pub fn chunk_size(&self, batch: usize, ny: usize, nx: usize) -> Result<usize> {
        let pixels = ny * nx;
        let chunk = self.config.memory_budget_px / pixels.max(1);
        if chunk == 0 || batch % chunk != 0 {
            return Err(SearchError::ChunkSize {
                batch,
                chunk,
                memory_budget_px: self.config.memory_budget_px,
                pixels,
            });
        }
        Ok(chunk)
    }

    /// Estimate the orientation of every image given its latent vector.
    ///
    /// `latents` must hold exactly one vector per image; the vectors are not
    /// re-estimated during the search. All preconditions are checked before
    /// the oracle is first invoked.
    pub fn run<O: ScoringOracle + ?Sized>(
        &self,
        oracle: &O,
        images: ImageBatch<'_>,
        latents: LatentBatch<'_>,
    ) -> Result<Vec<PoseEstimate>> {
        require_inference(oracle)?;
        check_levels(&self.config)?;
        let b = images.len();
        if latents.len() != b {
            return Err(SearchError::BatchMismatch {
                what: "latent vectors per image",
                expected: b,
                actual: latents.len(),
            });
        }
        let chunk = self.chunk_size(b, images.ny(), images.nx())?;
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let grid = base_grid();
        debug!(
            "Heterogeneous search: {} images of {}x{} (z dim {}), {} chunks of {}, {} levels",
            b,
            images.ny(),
            images.nx(),
            latents.dim(),
            b / chunk,
            chunk,
            self.config.niter
        );

        let mut picks = Vec::with_capacity(b);
        for start in (0..b).step_by(chunk) {
            let errors = oracle.score_base_grid(
                images.slice(start, chunk),
                grid.rotations(),
                Some(latents.slice(start, chunk)),
            )?;
            check_shape(&errors, chunk, grid.len())?;
            picks.extend(argmin_rows(&errors)?);
        }
        let base = base_states(&picks);

        descend(oracle, images, Some(latents), base, self.config.niter)
    }
}
