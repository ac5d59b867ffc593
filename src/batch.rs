//! Borrowed views over batches of images and latent vectors.
//!
//! Both are thin wrappers around a contiguous `&[f32]` so that searches can
//! hand sub-batches to the oracle without copying pixels.

use crate::error::{Result, SearchError};

/// `len()` images of `ny × nx` pixels stored back to back, row-major.
#[derive(Debug, Clone, Copy)]
pub struct ImageBatch<'a> {
    ny: usize,
    nx: usize,
    data: &'a [f32],
}

impl<'a> ImageBatch<'a> {
    /// Wrap `data` as a batch of `ny × nx` images.
    ///
    /// Fails when a dimension is zero or the buffer is not a whole number of images.
    pub fn new(data: &'a [f32], ny: usize, nx: usize) -> Result<Self> {
        if ny == 0 || nx == 0 || data.len() % (ny * nx) != 0 {
            return Err(SearchError::InvalidImageShape {
                len: data.len(),
                ny,
                nx,
            });
        }
        Ok(Self { ny, nx, data })
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Pixels per image.
    pub fn pixels(&self) -> usize {
        self.ny * self.nx
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.data.len() / self.pixels()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixels of image `i`. Panics when out of range.
    pub fn image(&self, i: usize) -> &'a [f32] {
        let n = self.pixels();
        &self.data[i * n..(i + 1) * n]
    }

    /// Images `start .. start + count`, without copying.
    pub fn slice(&self, start: usize, count: usize) -> ImageBatch<'a> {
        let n = self.pixels();
        ImageBatch {
            ny: self.ny,
            nx: self.nx,
            data: &self.data[start * n..(start + count) * n],
        }
    }
}

/// `len()` latent vectors of dimension `dim`, stored back to back.
#[derive(Debug, Clone, Copy)]
pub struct LatentBatch<'a> {
    dim: usize,
    data: &'a [f32],
}

impl<'a> LatentBatch<'a> {
    /// Wrap `data` as a batch of `dim`-dimensional latent vectors.
    pub fn new(data: &'a [f32], dim: usize) -> Result<Self> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(SearchError::InvalidLatentShape {
                len: data.len(),
                dim,
            });
        }
        Ok(Self { dim, data })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Latent vector of image `i`. Panics when out of range.
    pub fn latent(&self, i: usize) -> &'a [f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Latents `start .. start + count`, without copying.
    pub fn slice(&self, start: usize, count: usize) -> LatentBatch<'a> {
        LatentBatch {
            dim: self.dim,
            data: &self.data[start * self.dim..(start + count) * self.dim],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_batch_views() {
        let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let batch = ImageBatch::new(&data, 2, 3).unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.pixels(), 6);
        assert_eq!(batch.image(1), &data[6..12]);

        let tail = batch.slice(2, 2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.image(0), batch.image(2));
        assert!(!batch.is_empty());
        assert!(batch.slice(4, 0).is_empty());
    }

    #[test]
    fn image_batch_rejects_ragged_buffers() {
        let data = vec![0.0f32; 7];
        assert!(matches!(
            ImageBatch::new(&data, 2, 3),
            Err(SearchError::InvalidImageShape { len: 7, ny: 2, nx: 3 })
        ));
        assert!(ImageBatch::new(&data, 0, 3).is_err());
    }

    #[test]
    fn latent_batch_views() {
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let z = LatentBatch::new(&data, 2).unwrap();
        assert_eq!(z.len(), 3);
        assert_eq!(z.latent(2), &[5.0, 6.0]);
        assert_eq!(z.slice(1, 1).latent(0), &[3.0, 4.0]);
        assert!(LatentBatch::new(&data, 4).is_err());
        assert!(LatentBatch::new(&data, 0).is_err());
    }
}
