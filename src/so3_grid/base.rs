//! The fixed base grid, built once per process.

use once_cell::sync::Lazy;
use tracing::info;

use super::{uniform_grid, GridCell, GridCoords, BASE_GRID_SIZE, BASE_RESOLUTION, BASE_S1_CELLS};
use crate::Matrix3;

static BASE_GRID: Lazy<BaseGrid> = Lazy::new(BaseGrid::build);

/// The resolution-1 grid: 576 cells and their rotation matrices.
///
/// Immutable and shared by every search in the process, so base-grid
/// selections are reproducible across calls.
#[derive(Debug)]
pub struct BaseGrid {
    cells: Vec<GridCell>,
    quats: Vec<[f32; 4]>,
    rotations: Vec<Matrix3>,
}

impl BaseGrid {
    fn build() -> Self {
        let cells = uniform_grid(BASE_RESOLUTION);
        assert_eq!(cells.len(), BASE_GRID_SIZE);
        let quats: Vec<[f32; 4]> = cells.iter().map(|c| c.quat).collect();
        // Hopf quaternions are unit by construction.
        let rotations = crate::rotation::quaternions_to_rotations(&quats)
            .expect("base grid quaternions are unit length");
        info!("Built SO(3) base grid: {} cells", cells.len());
        Self {
            cells,
            quats,
            rotations,
        }
    }

    /// Number of cells (always 576).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in flat-index order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell at a flat index. Panics when `index >= 576`.
    pub fn cell(&self, index: usize) -> GridCell {
        self.cells[index]
    }

    /// Centre quaternions in flat-index order.
    pub fn quaternions(&self) -> &[[f32; 4]] {
        &self.quats
    }

    /// Rotation matrices in flat-index order, as handed to the oracle.
    pub fn rotations(&self) -> &[Matrix3] {
        &self.rotations
    }
}

/// The process-wide base grid.
pub fn base_grid() -> &'static BaseGrid {
    &BASE_GRID
}

/// Split a flat base-grid index into `(s2, s1)`.
///
/// Panics if `index` is outside `[0, 576)`: callers only pass argmin results
/// over the base grid, so anything else is a bug.
pub fn base_index_to_coords(index: usize) -> GridCoords {
    assert!(
        index < BASE_GRID_SIZE,
        "base grid index {index} out of range [0, {BASE_GRID_SIZE})"
    );
    GridCoords {
        s2: (index / BASE_S1_CELLS) as u64,
        s1: (index % BASE_S1_CELLS) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_grid_is_cached() {
        let a = base_grid() as *const BaseGrid;
        let b = base_grid() as *const BaseGrid;
        assert_eq!(a, b);
        assert_eq!(base_grid().len(), 576);
        assert_eq!(base_grid().rotations().len(), 576);
    }

    #[test]
    fn index_decomposition_matches_cells() {
        let grid = base_grid();
        for i in 0..grid.len() {
            assert_eq!(base_index_to_coords(i), grid.cell(i).coords);
        }
        assert_eq!(base_index_to_coords(13), GridCoords { s2: 1, s1: 1 });
        assert_eq!(base_index_to_coords(575), GridCoords { s2: 47, s1: 11 });
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        base_index_to_coords(576);
    }
}
