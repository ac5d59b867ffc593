//! Error scoring and candidate selection shared by both searches.

use nalgebra::DMatrix;

use crate::error::{Result, SearchError};

/// Sum of squared pixel differences between an image and a rendering.
///
/// Both slices must have the same length.
#[inline]
pub fn squared_error(image: &[f32], rendered: &[f32]) -> f32 {
    debug_assert_eq!(image.len(), rendered.len());
    image
        .iter()
        .zip(rendered)
        .map(|(a, b)| {
            let d = a - b;
            d * d
        })
        .sum()
}

/// Per-row `(argmin column, min value)` of an error matrix.
///
/// Ties resolve to the lowest column (first occurrence); selection is a plain
/// strict `<` scan, so results are bit-reproducible. A NaN entry is a
/// numerical degeneracy and fails the whole selection.
pub fn argmin_rows(errors: &DMatrix<f32>) -> Result<Vec<(usize, f32)>> {
    let mut picks = Vec::with_capacity(errors.nrows());
    for (image, row) in errors.row_iter().enumerate() {
        let mut best = (0usize, f32::INFINITY);
        for (candidate, &err) in row.iter().enumerate() {
            if err.is_nan() {
                return Err(SearchError::NonFiniteScore { image, candidate });
            }
            if err < best.1 || candidate == 0 {
                best = (candidate, err);
            }
        }
        picks.push(best);
    }
    Ok(picks)
}

/// Reject oracle output whose shape is not `rows × cols`.
pub fn check_shape(errors: &DMatrix<f32>, rows: usize, cols: usize) -> Result<()> {
    if errors.shape() != (rows, cols) {
        return Err(SearchError::OracleShape {
            expected: (rows, cols),
            actual: errors.shape(),
        });
    }
    Ok(())
}
