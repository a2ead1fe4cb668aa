//! Affine solve from three control points.

use nalgebra::{Matrix3, Matrix3x2, Vector2};
use thiserror::Error;

use super::affine::AffineTransform;
use crate::constants::solver::DEFAULT_SINGULAR_EPSILON;
use crate::model::ControlPoint;

/// Number of control points an affine solve needs.
pub const REQUIRED_CONTROL_POINTS: usize = 3;

/// Errors that can occur while solving for an affine transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The three image points are (numerically) collinear
    #[error(
        "Control points are collinear or too close together (triangle shape {determinant:e}), pick three points spread over the map"
    )]
    Singular {
        /// Sine of the smallest angle of the image-point triangle, signed by orientation
        determinant: f64,
    },

    /// A control point coordinate is NaN or infinite
    #[error("Control point {index} has a non-finite coordinate")]
    NonFinite {
        /// Index of the offending control point
        index: usize,
    },
}

/// Solves the 3-point affine system `A · X = B`.
///
/// `A` has rows `(x_i, y_i, 1)` built from the image points and `B` has rows
/// `(lon_i, lat_i)`. The system is solved with a full-pivot LU decomposition
/// and the resulting 3×2 matrix is transposed into the forward transform.
#[derive(Debug, Clone, Copy)]
pub struct AffineSolver {
    epsilon: f64,
}

impl AffineSolver {
    /// Create a solver with the default singularity threshold.
    pub fn new() -> Self {
        Self {
            epsilon: DEFAULT_SINGULAR_EPSILON,
        }
    }

    /// Set the threshold under which the triangle shape measure is treated
    /// as singular.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    /// The singularity threshold in use.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Derive the transform mapping each image point onto its geographic point.
    pub fn solve(
        &self,
        points: &[ControlPoint; REQUIRED_CONTROL_POINTS],
    ) -> Result<AffineTransform, SolveError> {
        if let Some(index) = points
            .iter()
            .position(|p| !p.image.is_finite() || !p.geo.is_finite())
        {
            return Err(SolveError::NonFinite { index });
        }

        let [p0, p1, p2] = points;
        #[rustfmt::skip]
        let a = Matrix3::new(
            p0.image.x(), p0.image.y(), 1.0,
            p1.image.x(), p1.image.y(), 1.0,
            p2.image.x(), p2.image.y(), 1.0,
        );
        #[rustfmt::skip]
        let b = Matrix3x2::new(
            p0.geo.lon(), p0.geo.lat(),
            p1.geo.lon(), p1.geo.lat(),
            p2.geo.lon(), p2.geo.lat(),
        );

        let determinant = triangle_shape(points);
        if determinant.abs() < self.epsilon {
            log::debug!(
                "Degenerate control point triangle (shape {:e})",
                determinant
            );
            return Err(SolveError::Singular { determinant });
        }

        let coefficients = a
            .full_piv_lu()
            .solve(&b)
            .ok_or(SolveError::Singular { determinant })?;
        let transform = AffineTransform::from_matrix(coefficients.transpose());
        if !transform.is_finite() {
            return Err(SolveError::Singular { determinant });
        }

        log::debug!("Solved affine transform: {:?}", transform.coefficients());
        Ok(transform)
    }
}

impl Default for AffineSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Solve with the default singularity threshold.
pub fn solve_affine(
    points: &[ControlPoint; REQUIRED_CONTROL_POINTS],
) -> Result<AffineTransform, SolveError> {
    AffineSolver::new().solve(points)
}

/// Shape measure of the image-point triangle.
///
/// `det A` equals the cross product of two triangle edges, so twice the
/// signed area is divided by the product of the two longest edges. The result
/// is the sine of the smallest angle: it does not change when the triangle is
/// moved or scaled, and it is `0` for degenerate triangles.
fn triangle_shape(points: &[ControlPoint; REQUIRED_CONTROL_POINTS]) -> f64 {
    let [p0, p1, p2] = points.map(|p| Vector2::new(p.image.x(), p.image.y()));
    let (e01, e02, e12) = (p1 - p0, p2 - p0, p2 - p1);

    let mut lengths = [e01.norm(), e02.norm(), e12.norm()];
    lengths.sort_by(f64::total_cmp);
    let bound = lengths[1] * lengths[2];
    if bound > 0.0 {
        e01.perp(&e02) / bound
    } else {
        0.0
    }
}
