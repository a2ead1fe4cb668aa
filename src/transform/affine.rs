//! Affine image-to-geographic transform.

use nalgebra::{Matrix2x3, Vector3};

use crate::model::{GeoPoint, ImagePoint};

/// Number of coefficients of an affine transform (and lines of a world file).
pub const COEFFICIENT_COUNT: usize = 6;

/// A 2×3 affine map from image pixels to geographic coordinates.
///
/// ```text
/// | lon |   | a00 a01 a02 |   | x |
/// |     | = |             | · | y |
/// | lat |   | a10 a11 a12 |   | 1 |
/// ```
///
/// A transform is never edited in place: georeferencing again produces a new
/// one that replaces the old.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    matrix: Matrix2x3<f64>,
}

impl AffineTransform {
    /// Wrap an already solved 2×3 matrix.
    pub fn from_matrix(matrix: Matrix2x3<f64>) -> Self {
        Self { matrix }
    }

    /// Build a transform from coefficients in world-file order
    /// `[a00, a10, a01, a11, a02, a12]`.
    pub fn from_coefficients(c: [f64; COEFFICIENT_COUNT]) -> Self {
        Self {
            matrix: Matrix2x3::new(c[0], c[2], c[4], c[1], c[3], c[5]),
        }
    }

    /// Coefficients in world-file order `[a00, a10, a01, a11, a02, a12]`.
    pub fn coefficients(&self) -> [f64; COEFFICIENT_COUNT] {
        let m = &self.matrix;
        [
            m[(0, 0)],
            m[(1, 0)],
            m[(0, 1)],
            m[(1, 1)],
            m[(0, 2)],
            m[(1, 2)],
        ]
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &Matrix2x3<f64> {
        &self.matrix
    }

    /// Map an image pixel to its geographic position.
    pub fn apply(&self, p: ImagePoint) -> GeoPoint {
        let geo = self.matrix * Vector3::new(p.x(), p.y(), 1.0);
        GeoPoint::new(geo[0], geo[1])
    }

    /// Longitude change per pixel along x.
    pub fn x_scale(&self) -> f64 {
        self.matrix[(0, 0)]
    }

    /// Latitude change per pixel along y (negative for north-up maps).
    pub fn y_scale(&self) -> f64 {
        self.matrix[(1, 1)]
    }

    /// Geographic position of pixel `(0, 0)`.
    pub fn origin(&self) -> GeoPoint {
        GeoPoint::new(self.matrix[(0, 2)], self.matrix[(1, 2)])
    }

    /// Whether every coefficient is a finite number.
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }

    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &AffineTransform, tolerance: f64) -> bool {
        self.matrix
            .iter()
            .zip(other.matrix.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
