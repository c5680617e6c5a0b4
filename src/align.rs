//! Alignment of one atom onto another.
//!
//! Two atoms sharing a tag represent the same variable drawn in two blocks.
//! Aligning them means finding the affine transform that lays the second
//! atom's segment exactly over the first one's. Both atoms are measured
//! through their block's alignment layers only: the resulting layer sits
//! beneath the page fit, which both blocks share. Only the two endpoints carry
//! meaning; a third point, offset perpendicular to the segment, keeps the
//! correspondence triangle non-degenerate.

use glam::{DVec2, dvec2};

use crate::defaults;
use crate::errors::{LayoutError, Result};
use crate::fit::AxisDescriptor;
use crate::log::trace;
use crate::transform::ProjectiveTransform;

/// `P1`, `P2` and the synthetic `P3 = P1 + k·rot(P2 - P1)` with rot(x, y) = (y, -x)
fn endpoint_triangle(axis: &AxisDescriptor<'_>, u_start: f64, u_stop: f64) -> Result<[DVec2; 3]> {
    let p1 = axis.point(u_start)?;
    let p2 = axis.point(u_stop)?;
    let d = p2 - p1;
    let p3 = p1 + dvec2(d.y, -d.x) * defaults::ALIGN_OFFSET;
    Ok([p1, p2, p3])
}

/// Transform that, applied after `moving`'s base transform, lays it on top
/// of `reference` in `reference`'s base space.
///
/// Both axes are evaluated at the reference's domain ends: the shared
/// variable is the reference's.
pub fn alignment_transform(
    reference: &AxisDescriptor<'_>,
    moving: &AxisDescriptor<'_>,
) -> Result<ProjectiveTransform> {
    let (u_start, u_stop) = (reference.u_min(), reference.u_max());
    let target = endpoint_triangle(reference, u_start, u_stop)?;
    if target[0] == target[1] {
        return Err(LayoutError::degenerate(format!(
            "axis `{}` has zero length and cannot anchor an alignment",
            reference.atom().title()
        )));
    }
    let source = endpoint_triangle(moving, u_start, u_stop)?;
    trace!(?source, ?target, tag = %reference.atom().tag(), "alignment correspondence");
    ProjectiveTransform::from_three_point_correspondence(source, target)
}
