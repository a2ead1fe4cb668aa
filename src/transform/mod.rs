//! Georeferencing transform: solving and applying the image-to-geographic map.

mod affine;
mod solver;

pub use affine::{AffineTransform, COEFFICIENT_COUNT};
pub use solver::{AffineSolver, REQUIRED_CONTROL_POINTS, SolveError, solve_affine};
