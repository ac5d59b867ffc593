//! Scoring oracles: the image-formation side of the search.
//!
//! The searches never look inside the model. They only need a
//! [`ScoringOracle`] that, given candidate rotations (and optionally one
//! latent vector per image), returns the squared reconstruction error of every
//! (image, candidate) pair. [`RenderOracle`] builds such an oracle from any
//! [`VolumeModel`] that can render a rotated lattice.

use anyhow::ensure;
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

use crate::batch::{ImageBatch, LatentBatch};
use crate::lattice::Lattice;
use crate::search::scoring::squared_error;
use crate::{Matrix3, Vector3};

/// Whether the model behind an oracle is training or serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMode {
    Training,
    Inference,
}

/// Batched reconstruction-error evaluator consumed by the searches.
///
/// Implementations must not mutate their inputs or the underlying model, and
/// must tolerate hundreds of calls per search.
pub trait ScoringOracle: Sync {
    /// Current mode of the underlying model. Searches refuse to run unless
    /// this is [`ModelMode::Inference`].
    fn mode(&self) -> ModelMode;

    /// Errors of every image against every rotation of a shared candidate set.
    ///
    /// Returns a `images.len() × rotations.len()` matrix. With `latents`,
    /// image `b` is rendered with latent `b`.
    fn score_base_grid(
        &self,
        images: ImageBatch<'_>,
        rotations: &[Matrix3],
        latents: Option<LatentBatch<'_>>,
    ) -> anyhow::Result<DMatrix<f32>>;

    /// Errors of every image against its own candidate set.
    ///
    /// `rotations` holds `images.len() × k` matrices, image-major; the result
    /// is `images.len() × k`.
    fn score_neighbors(
        &self,
        images: ImageBatch<'_>,
        rotations: &[Matrix3],
        latents: Option<LatentBatch<'_>>,
    ) -> anyhow::Result<DMatrix<f32>>;
}

/// A continuous density model that renders projections.
pub trait VolumeModel: Sync {
    fn mode(&self) -> ModelMode;

    /// Predicted pixel intensities at `coords` (one value per coordinate),
    /// conditioned on an optional latent vector.
    fn render(&self, coords: &[Vector3], latent: Option<&[f32]>) -> anyhow::Result<Vec<f32>>;
}

/// [`ScoringOracle`] that scores by rendering a [`VolumeModel`] on a rotated lattice.
#[derive(Debug, Clone)]
pub struct RenderOracle<M> {
    model: M,
    lattice: Lattice,
}

impl<M: VolumeModel> RenderOracle<M> {
    /// Oracle for `ny × nx` images.
    pub fn new(model: M, ny: usize, nx: usize) -> Self {
        Self {
            model,
            lattice: Lattice::new(ny, nx),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Render the model at one orientation.
    pub fn render(&self, rot: &Matrix3, latent: Option<&[f32]>) -> anyhow::Result<Vec<f32>> {
        let coords = self.lattice.rotate(rot);
        let pixels = self.model.render(&coords, latent)?;
        ensure!(
            pixels.len() == self.lattice.len(),
            "model rendered {} pixels for a {}x{} lattice",
            pixels.len(),
            self.lattice.ny(),
            self.lattice.nx()
        );
        Ok(pixels)
    }

    fn check_inputs(
        &self,
        images: ImageBatch<'_>,
        latents: Option<LatentBatch<'_>>,
    ) -> anyhow::Result<()> {
        ensure!(
            images.ny() == self.lattice.ny() && images.nx() == self.lattice.nx(),
            "images are {}x{} but the lattice is {}x{}",
            images.ny(),
            images.nx(),
            self.lattice.ny(),
            self.lattice.nx()
        );
        if let Some(z) = latents {
            ensure!(
                z.len() == images.len(),
                "{} latent vectors for {} images",
                z.len(),
                images.len()
            );
        }
        Ok(())
    }
}

impl<M: VolumeModel> ScoringOracle for RenderOracle<M> {
    fn mode(&self) -> ModelMode {
        self.model.mode()
    }

    fn score_base_grid(
        &self,
        images: ImageBatch<'_>,
        rotations: &[Matrix3],
        latents: Option<LatentBatch<'_>>,
    ) -> anyhow::Result<DMatrix<f32>> {
        self.check_inputs(images, latents)?;
        let (b, q) = (images.len(), rotations.len());

        let row_major: Vec<f32> = match latents {
            // One density: render each rotation once, reuse for every image.
            None => {
                debug!("Rendering {} shared base projections", q);
                let renders = rotations
                    .par_iter()
                    .map(|rot| self.render(rot, None))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                (0..b * q)
                    .into_par_iter()
                    .map(|idx| squared_error(images.image(idx / q), &renders[idx % q]))
                    .collect()
            }
            // Latent-conditioned: every (image, rotation) pair is its own rendering.
            Some(z) => {
                debug!("Rendering {} latent-conditioned base projections", b * q);
                (0..b * q)
                    .into_par_iter()
                    .map(|idx| {
                        let (i, k) = (idx / q, idx % q);
                        let pixels = self.render(&rotations[k], Some(z.latent(i)))?;
                        Ok(squared_error(images.image(i), &pixels))
                    })
                    .collect::<anyhow::Result<Vec<f32>>>()?
            }
        };
        Ok(DMatrix::from_row_slice(b, q, &row_major))
    }

    fn score_neighbors(
        &self,
        images: ImageBatch<'_>,
        rotations: &[Matrix3],
        latents: Option<LatentBatch<'_>>,
    ) -> anyhow::Result<DMatrix<f32>> {
        self.check_inputs(images, latents)?;
        let b = images.len();
        if b == 0 {
            return Ok(DMatrix::zeros(0, 0));
        }
        ensure!(
            rotations.len() % b == 0,
            "{} neighbor rotations do not split evenly over {} images",
            rotations.len(),
            b
        );
        let k = rotations.len() / b;

        let row_major = rotations
            .par_iter()
            .enumerate()
            .map(|(idx, rot)| {
                let i = idx / k;
                let pixels = self.render(rot, latents.map(|z| z.latent(i)))?;
                Ok(squared_error(images.image(i), &pixels))
            })
            .collect::<anyhow::Result<Vec<f32>>>()?;
        Ok(DMatrix::from_row_slice(b, k, &row_major))
    }
}
