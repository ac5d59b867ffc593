//! # cryopose
//!
//! Branch-and-bound **orientation search** for cryo-EM particle images against
//! a learned, continuous volumetric model.
//!
//! Given a batch of 2D images and a model that can render the projection of a
//! 3D density at any rotation (optionally conditioned on a per-image latent
//! conformation), `cryopose` finds, for every image, the rotation whose
//! rendering has the smallest squared reconstruction error, without a dense
//! rotation grid at the target resolution.
//!
//! ## Example
//!
//! ```no_run
//! use cryopose::{
//!     HomogeneousSearch, ImageBatch, ModelMode, RenderOracle, SearchConfig, Vector3,
//!     VolumeModel,
//! };
//!
//! struct Blob;
//!
//! impl VolumeModel for Blob {
//!     fn mode(&self) -> ModelMode {
//!         ModelMode::Inference
//!     }
//!     fn render(&self, coords: &[Vector3], _z: Option<&[f32]>) -> anyhow::Result<Vec<f32>> {
//!         Ok(coords.iter().map(|c| (-(c - Vector3::new(0.3, 0.0, 0.1)).norm_squared()).exp()).collect())
//!     }
//! }
//!
//! let (ny, nx) = (16, 16);
//! let oracle = RenderOracle::new(Blob, ny, nx);
//! let pixels: Vec<f32> = vec![0.0; 4 * ny * nx]; // four images
//! let images = ImageBatch::new(&pixels, ny, nx).unwrap();
//!
//! let poses = HomogeneousSearch::new(SearchConfig::new(5))
//!     .run(&oracle, images)
//!     .unwrap();
//! for pose in &poses {
//!     println!("error {:.3} at resolution {}:\n{}", pose.error, pose.resolution, pose.rotation);
//! }
//! ```
//!
//! ## Algorithm overview
//!
//! 1. **Base grid**: 576 rotations: 48 HEALPix viewing directions × 12
//!    in-plane angles, combined through the Hopf fibration
//! 2. **Base evaluation**: score every image against all 576 rotations and
//!    keep the argmin (lowest index on ties)
//! 3. **Refinement**: for each level, score only the 8 children (4 directions
//!    × 2 in-plane angles) of the current cell and descend into the best one;
//!    each level halves the angular step
//! 4. **Result**: the best cell seen along the descent, as a quaternion and
//!    a rotation matrix
//!
//! The heterogeneous variant conditions each call on a per-image latent
//! vector and scores the base grid in chunks bounded by a pixel budget.

mod batch;
pub mod error;
pub mod lattice;
pub mod oracle;
pub mod rotation;
pub mod search;
pub mod so3_grid;

pub use batch::{ImageBatch, LatentBatch};
pub use error::{Result, SearchError};
pub use lattice::Lattice;
pub use oracle::{ModelMode, RenderOracle, ScoringOracle, VolumeModel};
pub use rotation::{quaternion_to_rotation, quaternions_to_rotations};
pub use search::{
    HeterogeneousSearch, HomogeneousSearch, PoseEstimate, SearchConfig, SearchState,
};
pub use so3_grid::{base_grid, base_index_to_coords, neighbors, BaseGrid, GridCell, GridCoords};

// Commonly used types
// Rendering and scoring work in 32-bit floats; grid angles are computed in
// 64-bit and rounded once.
pub type Matrix3 = nalgebra::Matrix3<f32>;
pub type Vector3 = nalgebra::Vector3<f32>;
