//! Quaternion → rotation-matrix conversion.
//!
//! Grid quaternions are stored as `[w, x, y, z]` arrays and only turned into
//! matrices when handed to a scoring oracle. The conversion normalizes first,
//! so it is continuous in `q`, and `q` and `-q` map to the same matrix.

use nalgebra::{Quaternion, UnitQuaternion};
use rayon::prelude::*;

use crate::error::{Result, SearchError};
use crate::Matrix3;

/// Rotation matrix of a `(w, x, y, z)` quaternion.
///
/// Returns [`SearchError::DegenerateQuaternion`] for a zero-norm or
/// non-finite input instead of normalizing garbage.
pub fn quaternion_to_rotation(q: &[f32; 4]) -> Result<Matrix3> {
    let norm = q.iter().map(|c| c * c).sum::<f32>().sqrt();
    if !norm.is_finite() || norm <= f32::EPSILON {
        return Err(SearchError::DegenerateQuaternion { q: *q });
    }
    let unit = UnitQuaternion::from_quaternion(Quaternion::new(q[0], q[1], q[2], q[3]));
    Ok(unit.to_rotation_matrix().into_inner())
}

/// Batched [`quaternion_to_rotation`], order preserving.
pub fn quaternions_to_rotations(quats: &[[f32; 4]]) -> Result<Vec<Matrix3>> {
    quats.par_iter().map(quaternion_to_rotation).collect()
}
