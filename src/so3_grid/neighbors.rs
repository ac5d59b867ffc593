//! Refinement neighborhoods.

use super::{healpix, s1_angle, s1_cells, s2_cells, GridCell, GridCoords, NUM_NEIGHBORS};

/// The 8 children of `cell` at refinement `level`.
///
/// `cell` lives on the grid of resolution `level` (level 1 = the base grid),
/// and the children live on resolution `level + 1`, so every level halves
/// the angular cell size. Ordering: S2 children `4·s2 + 0..4` outer,
/// S1 children `2·s1 + 0..2` inner.
///
/// The children depend only on `cell.coords` and `level`. Panics when
/// `level == 0` or the coordinates are out of range for resolution `level`.
pub fn neighbors(cell: &GridCell, level: u32) -> [GridCell; NUM_NEIGHBORS] {
    assert!(level >= 1, "refinement levels start at 1");
    let GridCoords { s2, s1 } = cell.coords;
    assert!(
        s2 < s2_cells(level) && s1 < s1_cells(level),
        "coordinates ({s2}, {s1}) out of range for resolution {level}"
    );

    let child_res = level + 1;
    let mut out = [*cell; NUM_NEIGHBORS];
    let mut k = 0;
    for s2_child in 4 * s2..4 * s2 + 4 {
        let (theta, phi) = healpix::pix2ang_nest(child_res, s2_child);
        for s1_child in [2 * s1, 2 * s1 + 1] {
            let psi = s1_angle(child_res, s1_child);
            out[k] = GridCell {
                quat: super::hopf_to_quat(theta, phi, psi),
                coords: GridCoords {
                    s2: s2_child,
                    s1: s1_child,
                },
            };
            k += 1;
        }
    }
    out
}
