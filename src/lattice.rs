//! Image-plane lattice.
//!
//! The (x, y, 0) coordinates of every pixel of an `ny × nx` image, centred and
//! scaled to `[-1, 1)`. The upper endpoint is excluded so that the origin sits
//! exactly on a pixel, matching the layout of a centred Fourier transform.

use crate::{Matrix3, Vector3};

/// Pixel coordinates of an `ny × nx` image, row-major (row = y, column = x).
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    ny: usize,
    nx: usize,
    points: Vec<Vector3>,
}

impl Lattice {
    /// Build the lattice for an image of `ny` rows and `nx` columns.
    ///
    /// Panics when either dimension is zero.
    pub fn new(ny: usize, nx: usize) -> Self {
        assert!(ny > 0 && nx > 0, "lattice dimensions must be > 0");
        let xs = centered_axis(nx);
        let ys = centered_axis(ny);
        let mut points = Vec::with_capacity(ny * nx);
        for &y in &ys {
            for &x in &xs {
                points.push(Vector3::new(x, y, 0.0));
            }
        }
        Self { ny, nx, points }
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of points (`ny * nx`).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vector3] {
        &self.points
    }

    /// Lattice expressed in the model frame for orientation `rot`.
    ///
    /// Points are treated as row vectors multiplied on the right, `p · R`,
    /// which is `Rᵀ p` for column vectors.
    pub fn rotate(&self, rot: &Matrix3) -> Vec<Vector3> {
        let rt = rot.transpose();
        self.points.iter().map(|p| rt * p).collect()
    }
}

/// `n` samples from -1 (inclusive) to 1 (exclusive).
fn centered_axis(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (-1.0 + 2.0 * i as f64 / n as f64) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lattice_layout() {
        let lat = Lattice::new(2, 4);
        assert_eq!(lat.len(), 8);
        let pts = lat.points();
        assert_eq!(pts[0], Vector3::new(-1.0, -1.0, 0.0));
        assert_eq!(pts[1], Vector3::new(-0.5, -1.0, 0.0));
        assert_eq!(pts[3], Vector3::new(0.5, -1.0, 0.0));
        assert_eq!(pts[4], Vector3::new(-1.0, 0.0, 0.0));
        assert!(pts.iter().all(|p| p.x < 1.0 && p.y < 1.0 && p.z == 0.0));
    }

    #[test]
    fn odd_size_axis_spacing() {
        let lat = Lattice::new(3, 3);
        let xs: Vec<f32> = lat.points()[..3].iter().map(|p| p.x).collect();
        assert_relative_eq!(xs[0], -1.0);
        assert_relative_eq!(xs[1], -1.0 / 3.0, epsilon = 1e-7);
        assert_relative_eq!(xs[2], 1.0 / 3.0, epsilon = 1e-7);
    }

    #[test]
    fn rotate_uses_transpose() {
        let lat = Lattice::new(4, 4);
        // 90° about z: R e_x = e_y, so Rᵀ e_x = -e_y.
        let rot = *nalgebra::Rotation3::from_axis_angle(
            &nalgebra::Vector3::z_axis(),
            std::f32::consts::FRAC_PI_2,
        )
        .matrix();
        let rotated = lat.rotate(&rot);
        for (p, q) in lat.points().iter().zip(&rotated) {
            assert_relative_eq!(*q, rot.transpose() * p, epsilon = 1e-6);
            assert_relative_eq!(q.norm(), p.norm(), epsilon = 1e-6);
        }
        // (0.5, -1, 0) → (-1, -0.5, 0)
        assert_relative_eq!(rotated[3], Vector3::new(-1.0, -0.5, 0.0), epsilon = 1e-6);
    }
}
