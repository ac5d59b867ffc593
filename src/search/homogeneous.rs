//! Search against a single shared density.

use tracing::debug;

use super::scoring::{argmin_rows, check_shape};
use super::{base_states, check_levels, descend, require_inference, PoseEstimate, SearchConfig};
use crate::batch::ImageBatch;
use crate::error::Result;
use crate::oracle::ScoringOracle;
use crate::so3_grid::base_grid;

/// Branch-and-bound search with no latent variable.
///
/// The base grid is scored in a single oracle call for the whole batch, since
/// the N0 base renderings are shared by every image.
#[derive(Debug, Clone, Default)]
pub struct HomogeneousSearch {
    pub config: SearchConfig,
}

impl HomogeneousSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Estimate the orientation of every image in `images`.
    ///
    /// Output `i` corresponds to image `i`. Fails before any oracle call when
    /// the model is in training mode.
    pub fn run<O: ScoringOracle + ?Sized>(
        &self,
        oracle: &O,
        images: ImageBatch<'_>,
    ) -> Result<Vec<PoseEstimate>> {
        require_inference(oracle)?;
        check_levels(&self.config)?;
        let b = images.len();
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let grid = base_grid();
        debug!(
            "Homogeneous search: {} images of {}x{}, {} base cells, {} levels",
            b,
            images.ny(),
            images.nx(),
            grid.len(),
            self.config.niter
        );

        let errors = oracle.score_base_grid(images, grid.rotations(), None)?;
        check_shape(&errors, b, grid.len())?;
        let base = base_states(&argmin_rows(&errors)?);

        descend(oracle, images, None, base, self.config.niter)
    }
}
