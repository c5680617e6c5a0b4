//! Page fitting: the final transform that places the assembled layout on
//! the page.
//!
//! The wrapper never computes this transform itself. It hands a list of
//! [`AxisDescriptor`]s to an injected [`PageFitter`] together with the chosen
//! [`FitMethod`] and installs whatever transform comes back. [`AxesFitter`]
//! is the fitter shipped with the crate: it samples every axis into a point
//! cloud and lets the method's strategy work on that cloud.

use std::fmt;

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use crate::atom::Atom;
use crate::defaults;
use crate::errors::{LayoutError, Result};
use crate::log::{debug, warn};
use crate::transform::ProjectiveTransform;
use crate::types::{BBox, PaperSize};

/// One axis as seen by a page fitter.
///
/// Evaluates the atom under its block's alignment transforms only. The
/// current page fit is left out, so every fit is computed from the same
/// aligned layout no matter how many fits came before.
#[derive(Clone, Copy)]
pub struct AxisDescriptor<'a> {
    atom: &'a Atom,
    base: ProjectiveTransform,
}

impl fmt::Debug for AxisDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisDescriptor")
            .field("title", &self.atom.title())
            .field("u_min", &self.u_min())
            .field("u_max", &self.u_max())
            .finish()
    }
}

impl<'a> AxisDescriptor<'a> {
    pub fn new(atom: &'a Atom, base: ProjectiveTransform) -> Self {
        AxisDescriptor { atom, base }
    }

    pub fn atom(&self) -> &'a Atom {
        self.atom
    }

    pub fn base(&self) -> &ProjectiveTransform {
        &self.base
    }

    pub fn point(&self, u: f64) -> Result<DVec2> {
        self.base.apply_point(self.atom.raw_point(u))
    }

    pub fn evaluate_x(&self, u: f64) -> Result<f64> {
        Ok(self.point(u)?.x)
    }

    pub fn evaluate_y(&self, u: f64) -> Result<f64> {
        Ok(self.point(u)?.y)
    }

    pub fn u_min(&self) -> f64 {
        self.atom.u_min()
    }

    pub fn u_max(&self) -> f64 {
        self.atom.u_max()
    }

    pub fn sample(&self, n: usize) -> Result<Vec<DVec2>> {
        self.atom.domain().steps(n).map(|u| self.point(u)).collect()
    }
}

/// The page-fitting service contract
pub trait PageFitter {
    /// Find the global transform for `axes` on `paper` using `method`
    fn fit(
        &self,
        method: &FitMethod,
        axes: &[AxisDescriptor<'_>],
        paper: PaperSize,
    ) -> Result<ProjectiveTransform>;
}

/// A fitting strategy working on a sampled point cloud
#[enum_dispatch]
pub trait FitStrategy {
    /// Identifier used in logs and diagnostics
    fn name(&self) -> &'static str;

    /// Global transform for a non-empty point cloud
    fn find_transform(&self, points: &[DVec2], paper: PaperSize) -> ProjectiveTransform;
}

/// Scale (independently in x and y) and translate so the layout exactly
/// fills the page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScaleToCanvas;

/// Rigid rotation about the origin, counter-clockwise, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotate {
    pub degrees: f64,
}

/// Rotate so that the convex hull's tightest bounding box is axis aligned,
/// then scale to the page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polygon;

/// Search the rotation whose bounding box best matches the page aspect,
/// then scale to the page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Optimize;

/// The closed set of page-fit methods
#[enum_dispatch(FitStrategy)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitMethod {
    ScaleToCanvas(ScaleToCanvas),
    Rotate(Rotate),
    Polygon(Polygon),
    Optimize(Optimize),
}

impl FitMethod {
    pub fn rotate(degrees: f64) -> Self {
        FitMethod::Rotate(Rotate { degrees })
    }

    /// Parse a method by name. `param` is the rotation angle for `rotate`
    /// and ignored otherwise.
    pub fn from_name(name: &str, param: Option<f64>) -> Result<Self> {
        match name {
            "scale paper" | "scale_to_canvas" => Ok(ScaleToCanvas.into()),
            "rotate" => param.map(FitMethod::rotate).ok_or(LayoutError::MissingParameter {
                method: "rotate",
                parameter: "degrees",
            }),
            "polygon" => Ok(Polygon.into()),
            "optimize" => Ok(Optimize.into()),
            other => Err(LayoutError::UnknownMethod {
                name: other.to_string(),
            }),
        }
    }
}

impl Default for FitMethod {
    fn default() -> Self {
        ScaleToCanvas.into()
    }
}

impl FitStrategy for ScaleToCanvas {
    fn name(&self) -> &'static str {
        "scale_to_canvas"
    }

    fn find_transform(&self, points: &[DVec2], paper: PaperSize) -> ProjectiveTransform {
        fit_box(&BBox::from_points(points), paper)
    }
}

impl FitStrategy for Rotate {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn find_transform(&self, _points: &[DVec2], _paper: PaperSize) -> ProjectiveTransform {
        ProjectiveTransform::rotation_degrees(self.degrees)
    }
}

impl FitStrategy for Polygon {
    fn name(&self) -> &'static str {
        "polygon"
    }

    fn find_transform(&self, points: &[DVec2], paper: PaperSize) -> ProjectiveTransform {
        let hull = convex_hull(points);
        let mut best: Option<(f64, f64)> = None;
        for (i, a) in hull.iter().enumerate() {
            let edge = hull[(i + 1) % hull.len()] - *a;
            if edge == DVec2::ZERO {
                continue;
            }
            let degrees = -edge.y.atan2(edge.x).to_degrees();
            let area = rotated_bbox(&hull, degrees).area();
            if best.is_none_or(|(_, best_area)| area < best_area) {
                best = Some((degrees, area));
            }
        }
        let degrees = best.map_or(0.0, |(degrees, _)| degrees);
        debug!(degrees, hull = hull.len(), "polygon fit rotation");
        rotate_then_fit(points, degrees, paper)
    }
}

impl FitStrategy for Optimize {
    fn name(&self) -> &'static str {
        "optimize"
    }

    fn find_transform(&self, points: &[DVec2], paper: PaperSize) -> ProjectiveTransform {
        let hull = convex_hull(points);
        let target = paper.aspect().ln();
        let score = |degrees: f64| {
            let bbox = rotated_bbox(&hull, degrees);
            if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
                return f64::INFINITY;
            }
            ((bbox.width() / bbox.height()).ln() - target).abs()
        };

        let mut best = (0.0, score(0.0));
        for step in 1..180 {
            let degrees = step as f64;
            let s = score(degrees);
            if s < best.1 {
                best = (degrees, s);
            }
        }
        let center = best.0;
        for step in -20..=20 {
            let degrees = center + step as f64 * 0.05;
            let s = score(degrees);
            if s < best.1 {
                best = (degrees, s);
            }
        }
        debug!(degrees = best.0, mismatch = best.1, "optimized fit rotation");
        rotate_then_fit(points, best.0, paper)
    }
}

/// Scale and translate `bbox` onto `[0, w] × [0, h]`.
/// A direction with no extent keeps unit scale and is centred instead.
fn fit_box(bbox: &BBox, paper: PaperSize) -> ProjectiveTransform {
    let (sx, tx) = fit_interval(bbox.min.x, bbox.max.x, paper.width());
    let (sy, ty) = fit_interval(bbox.min.y, bbox.max.y, paper.height());
    ProjectiveTransform::affine(sx, 0.0, tx, 0.0, sy, ty)
}

fn fit_interval(lo: f64, hi: f64, extent: f64) -> (f64, f64) {
    let span = hi - lo;
    let magnitude = lo.abs().max(hi.abs()).max(1.0);
    if span > magnitude * 1e-12 {
        let scale = extent / span;
        (scale, -scale * lo)
    } else {
        (1.0, extent / 2.0 - (lo + hi) / 2.0)
    }
}

fn rotated_bbox(points: &[DVec2], degrees: f64) -> BBox {
    let rot = DVec2::from_angle(degrees.to_radians());
    let mut bbox = BBox::new();
    for p in points {
        bbox.expand_point(rot.rotate(*p));
    }
    bbox
}

fn rotate_then_fit(points: &[DVec2], degrees: f64, paper: PaperSize) -> ProjectiveTransform {
    let rotation = ProjectiveTransform::rotation_degrees(degrees);
    fit_box(&rotated_bbox(points, degrees), paper).compose(&rotation)
}

/// Convex hull in counter-clockwise order (Andrew's monotone chain)
pub(crate) fn convex_hull(points: &[DVec2]) -> Vec<DVec2> {
    let mut pts: Vec<DVec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let cross = |o: DVec2, a: DVec2, b: DVec2| (a - o).perp_dot(b - o);
    let mut hull: Vec<DVec2> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// The page fitter shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxesFitter {
    samples: usize,
}

impl Default for AxesFitter {
    fn default() -> Self {
        AxesFitter {
            samples: defaults::FIT_SAMPLES,
        }
    }
}

impl AxesFitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points sampled per axis (at least 2)
    pub fn with_samples(samples: usize) -> Self {
        AxesFitter {
            samples: samples.max(2),
        }
    }
}

impl PageFitter for AxesFitter {
    fn fit(
        &self,
        method: &FitMethod,
        axes: &[AxisDescriptor<'_>],
        paper: PaperSize,
    ) -> Result<ProjectiveTransform> {
        let mut points = Vec::with_capacity(axes.len() * self.samples);
        for axis in axes {
            points.extend(axis.sample(self.samples)?);
        }
        if points.is_empty() {
            return Err(LayoutError::EmptyLayout);
        }
        let sampled = points.len();
        points.retain(|p| p.is_finite());
        if points.len() < sampled {
            warn!(
                dropped = sampled - points.len(),
                "ignoring non-finite axis samples"
            );
        }
        if points.is_empty() {
            return Err(LayoutError::degenerate("every axis sample is non-finite"));
        }
        debug!(
            method = method.name(),
            axes = axes.len(),
            points = points.len(),
            "fitting layout to page"
        );
        Ok(method.find_transform(&points, paper))
    }
}
