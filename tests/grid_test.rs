//! Geometric properties of the hierarchical SO(3) grid and the quaternion
//! conversion: orthonormality, antipodal equivalence, determinism and nesting.

use cryopose::so3_grid::{uniform_grid, GridCell, NUM_NEIGHBORS};
use cryopose::{base_grid, neighbors, quaternion_to_rotation, quaternions_to_rotations, Matrix3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

const TOL: f32 = 1e-5;

fn assert_orthonormal(r: &Matrix3) {
    let err = (r.transpose() * r - Matrix3::identity()).abs().max();
    assert!(err < TOL, "RᵀR deviates from I by {err}:\n{r}");
    let det = r.determinant();
    assert!((det - 1.0).abs() < TOL, "det = {det}");
}

#[test]
fn base_grid_rotations_are_orthonormal() {
    for r in base_grid().rotations() {
        assert_orthonormal(r);
    }
}

#[test]
fn neighbor_rotations_are_orthonormal() {
    for index in (0..base_grid().len()).step_by(37) {
        let mut cell = base_grid().cell(index);
        for level in 1..=6 {
            let kids = neighbors(&cell, level);
            assert_eq!(kids.len(), NUM_NEIGHBORS);
            for kid in &kids {
                assert_orthonormal(&kid.rotation().unwrap());
            }
            cell = kids[(index + level as usize) % NUM_NEIGHBORS];
        }
    }
}

#[test]
fn antipodal_quaternions_give_the_same_rotation() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let q: [f32; 4] = std::array::from_fn(|_| StandardNormal.sample(&mut rng));
        let neg = q.map(|c| -c);
        let a = quaternion_to_rotation(&q).unwrap();
        let b = quaternion_to_rotation(&neg).unwrap();
        assert!((a - b).abs().max() < TOL);
        assert_orthonormal(&a);
    }
    for q in base_grid().quaternions() {
        let a = quaternion_to_rotation(q).unwrap();
        let b = quaternion_to_rotation(&q.map(|c| -c)).unwrap();
        assert!((a - b).abs().max() < TOL);
    }
}

#[test]
fn conversion_is_continuous() {
    let q = [0.3f32, -0.5, 0.7, 0.2];
    let r = quaternion_to_rotation(&q).unwrap();
    let nudged = quaternion_to_rotation(&[0.3 + 1e-4, -0.5, 0.7, 0.2]).unwrap();
    assert!((r - nudged).abs().max() < 1e-3);
}

#[test]
fn base_grid_is_reproducible() {
    let rebuilt = uniform_grid(1);
    assert_eq!(rebuilt.as_slice(), base_grid().cells());
    let rotations =
        quaternions_to_rotations(&rebuilt.iter().map(|c| c.quat).collect::<Vec<_>>()).unwrap();
    assert_eq!(rotations.as_slice(), base_grid().rotations());
}

#[test]
fn base_grid_rotations_are_distinct() {
    let rots = base_grid().rotations();
    for i in 0..rots.len() {
        for j in (i + 1)..rots.len() {
            assert!((rots[i] - rots[j]).abs().max() > 1e-3, "{i} and {j} coincide");
        }
    }
}

#[test]
fn level_one_neighbors_are_resolution_two_cells() {
    let fine = uniform_grid(2);
    let s1_cells = 24;
    for cell in base_grid().cells() {
        for kid in neighbors(cell, 1) {
            let flat = kid.coords.s2 as usize * s1_cells + kid.coords.s1 as usize;
            assert_eq!(kid, fine[flat]);
        }
    }
}

#[test]
fn every_fine_cell_has_exactly_one_parent() {
    // The 576 base cells' children tile the 4608-cell resolution-2 grid.
    let mut seen = vec![0u8; uniform_grid(2).len()];
    for cell in base_grid().cells() {
        for kid in GridCell::children(cell, 1) {
            seen[kid.coords.s2 as usize * 24 + kid.coords.s1 as usize] += 1;
        }
    }
    assert!(seen.iter().all(|&n| n == 1));
}
