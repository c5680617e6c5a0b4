//! A single axis: a parametric curve under the owning block's transform.

use std::fmt;
use std::rc::Rc;

use glam::{DVec2, dvec2};

use crate::errors::{LayoutError, Result};
use crate::params::{AtomParams, Tag};
use crate::transform::ProjectiveTransform;
use crate::types::Domain;

/// Raw coordinate function of the axis parameter
pub type CurveFn = Rc<dyn Fn(f64) -> f64>;

/// One axis of a nomogram.
///
/// `f(u)` and `g(u)` give the raw x/y coordinates, optionally multiplied by a
/// raw scale that block shapes set while sizing their axes. The current
/// transform is applied on every evaluation. The transform is owned conceptually by the
/// block: it is replaced wholesale whenever the block's stack changes.
#[derive(Clone)]
pub struct Atom {
    f: CurveFn,
    g: CurveFn,
    raw_scale: DVec2,
    domain: Domain,
    transform: ProjectiveTransform,
    params: AtomParams,
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("title", &self.params.title)
            .field("tag", &self.params.tag)
            .field("domain", &self.domain)
            .field("raw_scale", &self.raw_scale)
            .field("transform", &self.transform)
            .finish_non_exhaustive()
    }
}

impl Atom {
    /// Create an atom from its raw coordinate functions.
    ///
    /// Fails only if the configured domain bounds are not finite.
    pub fn new(
        f: impl Fn(f64) -> f64 + 'static,
        g: impl Fn(f64) -> f64 + 'static,
        params: AtomParams,
    ) -> Result<Self> {
        let domain = params.domain().map_err(LayoutError::invalid("axis domain"))?;
        Ok(Atom {
            f: Rc::new(f),
            g: Rc::new(g),
            raw_scale: DVec2::ONE,
            domain,
            transform: ProjectiveTransform::IDENTITY,
            params,
        })
    }

    pub fn params(&self) -> &AtomParams {
        &self.params
    }

    pub fn tag(&self) -> &Tag {
        &self.params.tag
    }

    pub fn title(&self) -> &str {
        &self.params.title
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn u_min(&self) -> f64 {
        self.domain.min
    }

    pub fn u_max(&self) -> f64 {
        self.domain.max
    }

    pub fn transform(&self) -> &ProjectiveTransform {
        &self.transform
    }

    /// Replace the current transform. No composition happens here.
    pub fn set_transform(&mut self, transform: ProjectiveTransform) {
        self.transform = transform;
    }

    /// Untransformed `(f(u), g(u))`, raw scale included
    pub fn raw_point(&self, u: f64) -> DVec2 {
        self.curve_point(u) * self.raw_scale
    }

    /// `(f(u), g(u))` exactly as given at construction
    pub fn curve_point(&self, u: f64) -> DVec2 {
        dvec2((self.f)(u), (self.g)(u))
    }

    /// Transformed point at parameter `u` (no clamping to the domain)
    pub fn point(&self, u: f64) -> Result<DVec2> {
        self.transform.apply_point(self.raw_point(u))
    }

    pub fn evaluate_x(&self, u: f64) -> Result<f64> {
        Ok(self.point(u)?.x)
    }

    pub fn evaluate_y(&self, u: f64) -> Result<f64> {
        Ok(self.point(u)?.y)
    }

    /// Transformed points at `n` evenly spaced parameters across the domain
    pub fn sample(&self, n: usize) -> Result<Vec<DVec2>> {
        self.domain.steps(n).map(|u| self.point(u)).collect()
    }

    pub fn raw_scale(&self) -> DVec2 {
        self.raw_scale
    }

    /// Set the factors applied to `f` and `g`.
    ///
    /// The scale is absolute: it always applies to the functions given at
    /// construction, so repeated calls never compound.
    pub fn set_raw_scale(&mut self, sx: f64, sy: f64) {
        self.raw_scale = dvec2(sx, sy);
    }

    /// Largest `g(u)` over the domain, sampled, ignoring the raw scale
    pub fn highest_point(&self, samples: usize) -> f64 {
        self.domain
            .steps(samples)
            .map(|u| (self.g)(u))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest `g(u)` over the domain, sampled, ignoring the raw scale
    pub fn lowest_point(&self, samples: usize) -> f64 {
        self.domain
            .steps(samples)
            .map(|u| (self.g)(u))
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical(x: f64) -> Atom {
        Atom::new(move |_| x, |u| u, AtomParams::default().with_domain(0.0, 4.0)).unwrap()
    }

    #[test]
    fn evaluation_applies_current_transform() {
        let mut atom = vertical(1.0);
        assert_eq!(atom.point(2.0).unwrap(), dvec2(1.0, 2.0));
        atom.set_transform(ProjectiveTransform::translation(10.0, -1.0));
        assert_eq!(atom.evaluate_x(2.0).unwrap(), 11.0);
        assert_eq!(atom.evaluate_y(2.0).unwrap(), 1.0);
        // raw functions are untouched
        assert_eq!(atom.raw_point(2.0), dvec2(1.0, 2.0));
    }

    #[test]
    fn set_transform_replaces_instead_of_composing() {
        let mut atom = vertical(0.0);
        atom.set_transform(ProjectiveTransform::translation(5.0, 0.0));
        atom.set_transform(ProjectiveTransform::translation(1.0, 0.0));
        assert_eq!(atom.evaluate_x(0.0).unwrap(), 1.0);
    }

    #[test]
    fn evaluation_outside_domain_is_not_clamped() {
        let atom = vertical(0.0);
        assert_eq!(atom.evaluate_y(-3.0).unwrap(), -3.0);
    }

    #[test]
    fn evaluation_propagates_division_by_zero() {
        let mut atom = vertical(-1.0);
        atom.set_transform(ProjectiveTransform::from_coefficients([
            1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0,
        ]));
        assert!(matches!(
            atom.evaluate_x(0.5),
            Err(LayoutError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn raw_scale_multiplies_raw_functions() {
        let mut atom = vertical(2.0);
        atom.set_raw_scale(3.0, -0.5);
        assert_eq!(atom.raw_point(4.0), dvec2(6.0, -2.0));
        assert_eq!(atom.curve_point(4.0), dvec2(2.0, 4.0));
        // extents read the curve as constructed
        assert_eq!(atom.highest_point(5), 4.0);
        assert_eq!(atom.lowest_point(5), 0.0);
    }

    #[test]
    fn raw_scale_does_not_compound() {
        let mut atom = vertical(2.0);
        atom.set_raw_scale(3.0, 3.0);
        atom.set_raw_scale(3.0, 3.0);
        assert_eq!(atom.raw_point(1.0), dvec2(6.0, 3.0));
    }

    #[test]
    fn sample_covers_domain_ends() {
        let atom = vertical(0.0);
        let pts = atom.sample(3).unwrap();
        assert_eq!(pts, vec![dvec2(0.0, 0.0), dvec2(0.0, 2.0), dvec2(0.0, 4.0)]);
    }

    #[test]
    fn non_finite_domain_is_rejected() {
        let err = Atom::new(|u| u, |u| u, AtomParams::default().with_domain(0.0, f64::NAN)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidNumber { what: "axis domain", .. }));
    }
}
