//! Projective transforms on homogeneous 2D coordinates.
//!
//! A transform holds nine coefficients laid out row by row:
//!
//! ```text
//! | α1 β1 γ1 |   | x |
//! | α2 β2 γ2 | · | y |
//! | α3 β3 γ3 |   | 1 |
//! ```
//!
//! so that `x' = (α1·x + β1·y + γ1) / (α3·x + β3·y + γ3)` and likewise for
//! `y'`. Composition is plain 3×3 matrix multiplication: `a.compose(&b)`
//! applies `b` first, then `a`.

use std::fmt;
use std::ops::Mul;

use glam::{DMat3, DVec2, DVec3};
use nalgebra::{SMatrix, SVector};

use crate::errors::{LayoutError, Result};

/// Minimum sine of the angle at the first correspondence point below which
/// the triangle is considered collinear.
const COLLINEAR_EPSILON: f64 = 1e-10;

/// A 3×3 homogeneous transform
#[derive(Clone, Copy, PartialEq)]
pub struct ProjectiveTransform {
    mat: DMat3,
}

impl Default for ProjectiveTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for ProjectiveTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a1, b1, g1, a2, b2, g2, a3, b3, g3] = self.coefficients();
        f.debug_struct("ProjectiveTransform")
            .field("row1", &[a1, b1, g1])
            .field("row2", &[a2, b2, g2])
            .field("row3", &[a3, b3, g3])
            .finish()
    }
}

impl ProjectiveTransform {
    pub const IDENTITY: ProjectiveTransform = ProjectiveTransform {
        mat: DMat3::IDENTITY,
    };

    /// Build from coefficients in row order `(α1,β1,γ1, α2,β2,γ2, α3,β3,γ3)`
    pub fn from_coefficients(c: [f64; 9]) -> Self {
        let [a1, b1, g1, a2, b2, g2, a3, b3, g3] = c;
        ProjectiveTransform {
            mat: DMat3::from_cols(
                DVec3::new(a1, a2, a3),
                DVec3::new(b1, b2, b3),
                DVec3::new(g1, g2, g3),
            ),
        }
    }

    /// Affine transform: bottom row fixed at `(0, 0, 1)`
    pub fn affine(a1: f64, b1: f64, g1: f64, a2: f64, b2: f64, g2: f64) -> Self {
        Self::from_coefficients([a1, b1, g1, a2, b2, g2, 0.0, 0.0, 1.0])
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self::affine(1.0, 0.0, dx, 0.0, 1.0, dy)
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::affine(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Counter-clockwise rotation about the origin
    pub fn rotation_degrees(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::affine(c, -s, 0.0, s, c, 0.0)
    }

    /// Coefficients in row order `(α1,β1,γ1, α2,β2,γ2, α3,β3,γ3)`
    pub fn coefficients(&self) -> [f64; 9] {
        self.mat.transpose().to_cols_array()
    }

    pub fn matrix(&self) -> DMat3 {
        self.mat
    }

    pub fn is_affine(&self) -> bool {
        self.mat.row(2) == DVec3::Z
    }

    /// `self · other`: applies `other` first, then `self`
    pub fn compose(&self, other: &ProjectiveTransform) -> ProjectiveTransform {
        ProjectiveTransform {
            mat: self.mat * other.mat,
        }
    }

    /// Map a point, failing if the homogeneous denominator is exactly zero
    pub fn apply(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let h = self.mat * DVec3::new(x, y, 1.0);
        if h.z == 0.0 {
            return Err(LayoutError::DivisionByZero { x, y });
        }
        Ok((h.x / h.z, h.y / h.z))
    }

    pub fn apply_point(&self, p: DVec2) -> Result<DVec2> {
        let (x, y) = self.apply(p.x, p.y)?;
        Ok(DVec2::new(x, y))
    }

    /// Element-wise comparison within `tolerance`
    pub fn approx_eq(&self, other: &ProjectiveTransform, tolerance: f64) -> bool {
        self.mat.abs_diff_eq(other.mat, tolerance)
    }

    /// The affine transform mapping `src[i]` onto `dst[i]` for `i = 0..3`.
    ///
    /// Two equations per point pair give a 6×6 system in
    /// `(α1, β1, γ1, α2, β2, γ2)`. The source points must span a triangle;
    /// collinear sources have no unique solution and are rejected.
    pub fn from_three_point_correspondence(src: [DVec2; 3], dst: [DVec2; 3]) -> Result<Self> {
        let [p1, p2, p3] = src;
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let spread = e1.length() * e2.length();
        if spread.is_nan() || spread == 0.0 || (e1.perp_dot(e2) / spread).abs() < COLLINEAR_EPSILON {
            return Err(LayoutError::degenerate(format!(
                "source points ({}, {}), ({}, {}), ({}, {}) are collinear",
                p1.x, p1.y, p2.x, p2.y, p3.x, p3.y
            )));
        }

        #[rustfmt::skip]
        let system = SMatrix::<f64, 6, 6>::from_row_slice(&[
            p1.x, p1.y, 1.0,  0.0,  0.0, 0.0,
            0.0,  0.0,  0.0,  p1.x, p1.y, 1.0,
            p2.x, p2.y, 1.0,  0.0,  0.0, 0.0,
            0.0,  0.0,  0.0,  p2.x, p2.y, 1.0,
            p3.x, p3.y, 1.0,  0.0,  0.0, 0.0,
            0.0,  0.0,  0.0,  p3.x, p3.y, 1.0,
        ]);
        let rhs = SVector::<f64, 6>::from_column_slice(&[
            dst[0].x, dst[0].y, dst[1].x, dst[1].y, dst[2].x, dst[2].y,
        ]);

        let v = system
            .lu()
            .solve(&rhs)
            .ok_or_else(|| LayoutError::degenerate("correspondence matrix is singular"))?;

        Ok(Self::affine(v[0], v[1], v[2], v[3], v[4], v[5]))
    }
}

impl Mul for ProjectiveTransform {
    type Output = ProjectiveTransform;

    fn mul(self, rhs: ProjectiveTransform) -> ProjectiveTransform {
        self.compose(&rhs)
    }
}
