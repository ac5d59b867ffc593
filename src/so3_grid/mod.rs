//! Hierarchical SO(3) grid.
//!
//! Rotations are sampled through the Hopf fibration SO(3) → S2 × S1:
//!
//! - **S2** (viewing direction) uses HEALPix NESTED pixels at `nside = 2^r`,
//!   giving `12 · 4^r` cells whose children at `r + 1` are `4p .. 4p + 3`.
//! - **S1** (in-plane angle) uses `6 · 2^r` uniform cells with centres
//!   `ψ = (i + ½) · 2π / (6 · 2^r)`, whose children are `2i, 2i + 1`.
//!
//! A cell at resolution `r` is therefore addressed by `(s2, s1)` and has
//! exactly `4 × 2 = 8` children at `r + 1`, each covering half the angular
//! extent of its parent. The base grid is resolution 1 (48 × 12 = 576 cells).

mod base;
pub mod healpix;
mod neighbors;

use std::f64::consts::TAU;

pub use base::{base_grid, base_index_to_coords, BaseGrid};
pub use neighbors::neighbors;

/// Resolution of the base grid.
pub const BASE_RESOLUTION: u32 = 1;
/// Number of S1 cells at the base resolution.
pub const BASE_S1_CELLS: usize = 12;
/// Number of cells in the base grid (48 S2 × 12 S1).
pub const BASE_GRID_SIZE: usize = 576;
/// Children per cell per refinement level (4 S2 × 2 S1).
pub const NUM_NEIGHBORS: usize = 8;
/// Finest addressable resolution. HEALPix indices at `nside = 2^r` and the
/// `6 · 2^r` in-plane bins must fit 64-bit integers.
pub const MAX_LEVEL: u32 = 29;

/// Hierarchical address of a grid cell: HEALPix nested pixel and in-plane bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoords {
    /// HEALPix NESTED pixel index at `nside = 2^resolution`.
    pub s2: u64,
    /// In-plane cell index in `[0, 6 · 2^resolution)`.
    pub s1: u64,
}

/// A grid cell: its centre quaternion and hierarchical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// `(w, x, y, z)` quaternion of the cell centre.
    pub quat: [f32; 4],
    pub coords: GridCoords,
}

impl GridCell {
    /// Cell at `coords` on the grid of the given resolution.
    pub fn at(resolution: u32, coords: GridCoords) -> Self {
        let (theta, phi) = healpix::pix2ang_nest(resolution, coords.s2);
        let psi = s1_angle(resolution, coords.s1);
        Self {
            quat: hopf_to_quat(theta, phi, psi),
            coords,
        }
    }

    /// The 8 children of this cell, see [`neighbors`].
    pub fn children(&self, level: u32) -> [GridCell; NUM_NEIGHBORS] {
        neighbors(self, level)
    }

    /// Rotation matrix of the cell centre.
    pub fn rotation(&self) -> crate::Result<crate::Matrix3> {
        crate::rotation::quaternion_to_rotation(&self.quat)
    }
}

/// Number of in-plane cells at a resolution.
#[inline]
pub fn s1_cells(resolution: u32) -> u64 {
    6 << resolution
}

/// Number of S2 cells at a resolution.
#[inline]
pub fn s2_cells(resolution: u32) -> u64 {
    healpix::npix(resolution)
}

/// Centre angle of in-plane cell `i`; panics when out of range.
pub fn s1_angle(resolution: u32, i: u64) -> f64 {
    let n = s1_cells(resolution);
    assert!(i < n, "S1 index {i} out of range for resolution {resolution}");
    let dt = TAU / n as f64;
    i as f64 * dt + dt / 2.0
}

/// All in-plane cell centres at a resolution.
pub fn s1_grid(resolution: u32) -> Vec<f64> {
    (0..s1_cells(resolution))
        .map(|i| s1_angle(resolution, i))
        .collect()
}

/// All `(theta, phi)` S2 cell centres at a resolution, in nested order.
pub fn s2_grid(resolution: u32) -> Vec<(f64, f64)> {
    (0..s2_cells(resolution))
        .map(|p| healpix::pix2ang_nest(resolution, p))
        .collect()
}

/// Hopf coordinates → `(w, x, y, z)` unit quaternion.
///
/// Computed in f64, stored in f32.
pub fn hopf_to_quat(theta: f64, phi: f64, psi: f64) -> [f32; 4] {
    let (st, ct) = (theta / 2.0).sin_cos();
    let (sp, cp) = (psi / 2.0).sin_cos();
    let (sa, ca) = (phi + psi / 2.0).sin_cos();
    [
        (ct * cp) as f32,
        (ct * sp) as f32,
        (st * ca) as f32,
        (st * sa) as f32,
    ]
}

/// Every cell of the grid at `resolution`, S2-major then S1.
///
/// Flat index `i` holds coordinates `(i / s1_cells, i % s1_cells)`.
pub fn uniform_grid(resolution: u32) -> Vec<GridCell> {
    let psi = s1_grid(resolution);
    let mut cells = Vec::with_capacity(s2_cells(resolution) as usize * psi.len());
    for (s2, (theta, phi)) in s2_grid(resolution).into_iter().enumerate() {
        for (s1, &p) in psi.iter().enumerate() {
            cells.push(GridCell {
                quat: hopf_to_quat(theta, phi, p),
                coords: GridCoords {
                    s2: s2 as u64,
                    s1: s1 as u64,
                },
            });
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_sizes() {
        assert_eq!(s2_cells(1) * s1_cells(1), BASE_GRID_SIZE as u64);
        assert_eq!(s1_cells(1), BASE_S1_CELLS as u64);
        assert_eq!(uniform_grid(1).len(), BASE_GRID_SIZE);
        assert_eq!(uniform_grid(2).len(), 192 * 24);
    }

    #[test]
    fn hopf_quaternions_are_unit() {
        for cell in uniform_grid(2) {
            let n: f32 = cell.quat.iter().map(|c| c * c).sum::<f32>().sqrt();
            assert!((n - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn cell_at_matches_uniform_grid() {
        let grid = uniform_grid(2);
        for &i in &[0usize, 17, 1000, grid.len() - 1] {
            let cell = GridCell::at(2, grid[i].coords);
            assert_eq!(cell, grid[i]);
        }
    }

    #[test]
    fn s1_centres_are_offset_by_half_a_cell() {
        let psi = s1_grid(1);
        assert_eq!(psi.len(), 12);
        let dt = TAU / 12.0;
        assert!((psi[0] - dt / 2.0).abs() < 1e-12);
        assert!((psi[11] - (TAU - dt / 2.0)).abs() < 1e-12);
    }
}
