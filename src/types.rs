//! Validated numeric primitives shared across the layout pipeline.
//!
//! Raw `f64` values coming from callers (page dimensions, parameter domains)
//! are checked once here; the rest of the crate can then rely on them being
//! finite.

use std::fmt;

use glam::{DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

#[inline]
fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Accept only finite, strictly positive values
#[inline]
pub fn positive(val: f64) -> Result<f64, NumericError> {
    let val = check_finite(val)?;
    if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// Target page rectangle, in the same length unit the axes are drawn in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaperSize {
    width: f64,
    height: f64,
}

impl PaperSize {
    /// Create a paper size with validation (rejects NaN, infinite, zero, negative)
    pub fn try_new(width: f64, height: f64) -> Result<Self, NumericError> {
        Ok(PaperSize {
            width: positive(width)?,
            height: positive(height)?,
        })
    }

    #[inline]
    pub fn width(self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(self) -> f64 {
        self.height
    }

    /// Width divided by height
    #[inline]
    pub fn aspect(self) -> f64 {
        self.width / self.height
    }
}

impl Default for PaperSize {
    fn default() -> Self {
        PaperSize {
            width: crate::defaults::PAPER_WIDTH,
            height: crate::defaults::PAPER_HEIGHT,
        }
    }
}

/// Parameter interval `[min, max]` of an axis.
///
/// `min > max` is allowed: an axis may be drawn against its natural direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    /// Create a domain with validation (rejects NaN/infinite bounds)
    pub fn try_new(min: f64, max: f64) -> Result<Self, NumericError> {
        Ok(Domain {
            min: check_finite(min)?,
            max: check_finite(max)?,
        })
    }

    /// `n` evenly spaced parameter values from `min` to `max`, both included.
    ///
    /// `n` below 2 is treated as 2.
    pub fn steps(self, n: usize) -> impl Iterator<Item = f64> {
        let n = n.max(2);
        let span = self.max - self.min;
        (0..n).map(move |i| {
            if i + 1 == n {
                self.max
            } else {
                self.min + span * i as f64 / (n - 1) as f64
            }
        })
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for BBox {
    fn default() -> Self {
        Self::new()
    }
}

impl BBox {
    /// Create an empty bounding box (will expand on first point)
    pub fn new() -> Self {
        BBox {
            min: dvec2(f64::MAX, f64::MAX),
            max: dvec2(f64::MIN, f64::MIN),
        }
    }

    /// Bounding box of a set of points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DVec2>) -> Self {
        let mut bbox = BBox::new();
        for p in points {
            bbox.expand_point(*p);
        }
        bbox
    }

    /// Check if the bbox is empty (never expanded)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Expand to include a point
    pub fn expand_point(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// True if `other` lies inside this box, widened by `tolerance` on every side
    pub fn contains_box(&self, other: &BBox, tolerance: f64) -> bool {
        other.min.x >= self.min.x - tolerance
            && other.min.y >= self.min.y - tolerance
            && other.max.x <= self.max.x + tolerance
            && other.max.y <= self.max.y + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_size_rejects_bad_dimensions() {
        assert_eq!(PaperSize::try_new(0.0, 1.0), Err(NumericError::Zero));
        assert_eq!(PaperSize::try_new(1.0, -2.0), Err(NumericError::Negative));
        assert_eq!(PaperSize::try_new(f64::NAN, 1.0), Err(NumericError::NaN));
        assert_eq!(
            PaperSize::try_new(1.0, f64::INFINITY),
            Err(NumericError::Infinite)
        );
    }

    #[test]
    fn paper_size_aspect() {
        let paper = PaperSize::try_new(40.0, 20.0).unwrap();
        assert_eq!(paper.aspect(), 2.0);
    }

    #[test]
    fn domain_allows_reversed_bounds() {
        let d = Domain::try_new(10.0, 1.0).unwrap();
        let steps: Vec<f64> = d.steps(4).collect();
        assert_eq!(steps, vec![10.0, 7.0, 4.0, 1.0]);
    }

    #[test]
    fn domain_steps_hit_both_ends() {
        let d = Domain::try_new(0.1, 0.7).unwrap();
        let steps: Vec<f64> = d.steps(7).collect();
        assert_eq!(steps.len(), 7);
        assert_eq!(steps[0], 0.1);
        assert_eq!(steps[6], 0.7);
    }

    #[test]
    fn domain_steps_minimum_two() {
        let d = Domain::try_new(0.0, 1.0).unwrap();
        assert_eq!(d.steps(0).count(), 2);
    }

    #[test]
    fn bbox_expand_and_measure() {
        let pts = [dvec2(1.0, 2.0), dvec2(-1.0, 5.0), dvec2(3.0, 0.0)];
        let bbox = BBox::from_points(&pts);
        assert_eq!(bbox.min, dvec2(-1.0, 0.0));
        assert_eq!(bbox.max, dvec2(3.0, 5.0));
        assert_eq!(bbox.width(), 4.0);
        assert_eq!(bbox.height(), 5.0);
        assert_eq!(bbox.center(), dvec2(1.0, 2.5));
    }

    #[test]
    fn bbox_new_is_empty() {
        assert!(BBox::new().is_empty());
    }
}
