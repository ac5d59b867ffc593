//! Branch-and-bound orientation search.
//!
//! Both searches run the same state machine over a batch of images:
//!
//! 1. **Init**: check the inference-mode precondition and batch shapes.
//! 2. **BaseEval**: score every image against the 576-cell base grid and keep
//!    the first-occurrence argmin cell per image.
//! 3. **Refine(level)**: for `level = 1..=niter`, score the 8 children of each
//!    image's current cell and descend into the argmin child. Each level halves
//!    the angular cell size.
//! 4. **Done**: report, per image, the best cell seen along its descent.
//!
//! All images advance in lockstep, but their selections are independent:
//! output `i` depends only on image `i` (and latent `i`).
//!
//! [`HomogeneousSearch`] scores against one shared density. [`HeterogeneousSearch`]
//! conditions every oracle call on a per-image latent vector and evaluates the
//! base grid in memory-bounded chunks.

pub mod heterogeneous;
pub mod homogeneous;
pub mod scoring;

pub use heterogeneous::HeterogeneousSearch;
pub use homogeneous::HomogeneousSearch;

use rayon::prelude::*;
use tracing::debug;

use crate::batch::{ImageBatch, LatentBatch};
use crate::error::{Result, SearchError};
use crate::oracle::{ModelMode, ScoringOracle};
use crate::so3_grid::{
    base_grid, base_index_to_coords, GridCell, GridCoords, MAX_LEVEL, NUM_NEIGHBORS,
};
use crate::Matrix3;

use scoring::{argmin_rows, check_shape};

// ── Configuration ───────────────────────────────────────────────────────────

/// Parameters shared by both searches.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of refinement levels after the base grid. `0` returns the
    /// base-grid selection. At most `MAX_LEVEL - 1`. Default 5.
    pub niter: u32,
    /// Maximum number of pixels rendered per base-grid chunk in the
    /// heterogeneous search. Chunk size is `memory_budget_px / (ny * nx)`
    /// images. Default 9000.
    pub memory_budget_px: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            niter: 5,
            memory_budget_px: 9000,
        }
    }
}

impl SearchConfig {
    /// Configuration with the given number of refinement levels.
    pub fn new(niter: u32) -> Self {
        Self {
            niter,
            ..Default::default()
        }
    }
}

// ── Search state and results ────────────────────────────────────────────────

/// Per-image state between levels: the selected cell and the error that selected it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    pub cell: GridCell,
    /// Grid resolution of `cell` (1 = base grid).
    pub resolution: u32,
    pub error: f32,
}

/// Final orientation estimate for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseEstimate {
    /// Best `(w, x, y, z)` grid quaternion.
    pub quat: [f32; 4],
    /// Rotation matrix of `quat`.
    pub rotation: Matrix3,
    /// Hierarchical coordinates of the best cell.
    pub coords: GridCoords,
    /// Grid resolution of the best cell (1 = base grid). Lower than
    /// `niter + 1` when no deeper cell on the descent improved the error.
    pub resolution: u32,
    /// Reconstruction error of the best cell.
    pub error: f32,
    /// Reconstruction error of the base-grid selection.
    pub base_error: f32,
}

// ── Shared steps ────────────────────────────────────────────────────────────

/// Fail fast unless the oracle's model is in inference mode.
fn require_inference<O: ScoringOracle + ?Sized>(oracle: &O) -> Result<()> {
    match oracle.mode() {
        ModelMode::Inference => Ok(()),
        ModelMode::Training => Err(SearchError::TrainingMode),
    }
}

/// Reject refinement depths the grid cannot address.
fn check_levels(config: &SearchConfig) -> Result<()> {
    let max = MAX_LEVEL - 1;
    if config.niter > max {
        return Err(SearchError::TooManyLevels {
            niter: config.niter,
            max,
        });
    }
    Ok(())
}

/// Turn base-grid argmins into initial search states.
fn base_states(picks: &[(usize, f32)]) -> Vec<SearchState> {
    let grid = base_grid();
    picks
        .iter()
        .map(|&(index, error)| {
            let cell = grid.cell(index);
            debug_assert_eq!(cell.coords, base_index_to_coords(index));
            SearchState {
                cell,
                resolution: crate::so3_grid::BASE_RESOLUTION,
                error,
            }
        })
        .collect()
}

/// One refinement level: score the 8 children of every frontier cell and
/// descend into each image's argmin child.
fn refine_level<O: ScoringOracle + ?Sized>(
    oracle: &O,
    images: ImageBatch<'_>,
    latents: Option<LatentBatch<'_>>,
    frontier: &[SearchState],
    level: u32,
) -> Result<Vec<SearchState>> {
    let children: Vec<[GridCell; NUM_NEIGHBORS]> = frontier
        .par_iter()
        .map(|state| state.cell.children(level))
        .collect();
    let rotations: Vec<Matrix3> = children
        .par_iter()
        .flat_map_iter(|kids| kids.iter().map(GridCell::rotation))
        .collect::<Result<_>>()?;

    let errors = oracle.score_neighbors(images, &rotations, latents)?;
    check_shape(&errors, frontier.len(), NUM_NEIGHBORS)?;
    let picks = argmin_rows(&errors)?;

    Ok(children
        .iter()
        .zip(picks)
        .map(|(kids, (k, error))| SearchState {
            cell: kids[k],
            resolution: level + 1,
            error,
        })
        .collect())
}

/// Run levels `1..=niter` from the base selections and assemble the estimates.
///
/// Descent always follows the argmin child; the reported cell is the best seen
/// on the way down (strict improvement only), so a reported error never
/// exceeds the base-grid error.
fn descend<O: ScoringOracle + ?Sized>(
    oracle: &O,
    images: ImageBatch<'_>,
    latents: Option<LatentBatch<'_>>,
    base: Vec<SearchState>,
    niter: u32,
) -> Result<Vec<PoseEstimate>> {
    let mut best = base.clone();
    let mut frontier = base.clone();

    for level in 1..=niter {
        frontier = refine_level(oracle, images, latents, &frontier, level)?;
        let mut improved = 0usize;
        for (b, f) in best.iter_mut().zip(&frontier) {
            if f.error < b.error {
                *b = *f;
                improved += 1;
            }
        }
        debug!(
            "Level {}: {} of {} images improved, mean error {:.4e}",
            level,
            improved,
            frontier.len(),
            mean_error(&frontier)
        );
    }

    best.iter()
        .zip(&base)
        .map(|(b, s)| {
            Ok(PoseEstimate {
                quat: b.cell.quat,
                rotation: b.cell.rotation()?,
                coords: b.cell.coords,
                resolution: b.resolution,
                error: b.error,
                base_error: s.error,
            })
        })
        .collect()
}

fn mean_error(states: &[SearchState]) -> f64 {
    if states.is_empty() {
        return 0.0;
    }
    states.iter().map(|s| s.error as f64).sum::<f64>() / states.len() as f64
}
