//! Blocks: groups of atoms sharing one composed transform.
//!
//! A block keeps an ordered list of alignment layers (never empty, seeded
//! with identity) and a separate slot for the page-fit transform. The
//! composed transform applies the mirror reflection `M` first, then the
//! layers in push order, each new layer more outward than the previous one,
//! and the page fit last:
//!
//! ```text
//! composed = G · Lₙ₋₁ · … · L₁ · L₀ · M
//! ```

use crate::atom::Atom;
use crate::defaults;
use crate::errors::{LayoutError, Result};
use crate::log::debug;
use crate::params::{AtomParams, BlockParams};
use crate::transform::ProjectiveTransform;
use crate::types::{PaperSize, positive};

/// One nomogram piece
#[derive(Debug, Clone)]
pub struct Block {
    atoms: Vec<Atom>,
    params: BlockParams,
    layers: Vec<ProjectiveTransform>,
    global_fit: Option<ProjectiveTransform>,
    aligned: ProjectiveTransform,
    composed: ProjectiveTransform,
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl Block {
    pub fn new() -> Self {
        Block {
            atoms: Vec::new(),
            params: BlockParams::default(),
            layers: vec![ProjectiveTransform::IDENTITY],
            global_fit: None,
            aligned: ProjectiveTransform::IDENTITY,
            composed: ProjectiveTransform::IDENTITY,
        }
    }

    /// Replace the block configuration; mirror flags take effect at once
    pub fn with_params(mut self, params: BlockParams) -> Self {
        self.params = params;
        self.refresh();
        self
    }

    pub fn params(&self) -> &BlockParams {
        &self.params
    }

    /// Append an atom. It immediately takes the block's current transform.
    pub fn add_atom(&mut self, mut atom: Atom) {
        atom.set_transform(self.composed);
        self.atoms.push(atom);
    }

    pub fn with_atom(mut self, atom: Atom) -> Self {
        self.add_atom(atom);
        self
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Alignment layers, first pushed first
    pub fn layers(&self) -> &[ProjectiveTransform] {
        &self.layers
    }

    pub fn global_fit(&self) -> Option<&ProjectiveTransform> {
        self.global_fit.as_ref()
    }

    /// The whole stack, innermost first, page fit (if any) last
    pub fn stack(&self) -> Vec<ProjectiveTransform> {
        self.layers.iter().copied().chain(self.global_fit).collect()
    }

    /// Composition of the mirror reflection and the alignment layers,
    /// without the page fit
    pub fn aligned(&self) -> &ProjectiveTransform {
        &self.aligned
    }

    pub fn composed(&self) -> &ProjectiveTransform {
        &self.composed
    }

    /// Add an outward alignment layer
    pub fn push_transform(&mut self, transform: ProjectiveTransform) {
        self.layers.push(transform);
        self.refresh();
    }

    /// Replace the outermost entry of the stack.
    ///
    /// That is the page-fit slot once it exists, otherwise the last
    /// alignment layer. Everything beneath is preserved.
    pub fn replace_last_transform(&mut self, transform: ProjectiveTransform) {
        match self.global_fit.as_mut() {
            Some(fit) => *fit = transform,
            None => {
                // layers always holds at least the identity seed
                if let Some(last) = self.layers.last_mut() {
                    *last = transform;
                }
            }
        }
        self.refresh();
    }

    /// Install the page-fit transform, replacing any previous one
    pub fn set_global_fit(&mut self, transform: ProjectiveTransform) {
        self.global_fit = Some(transform);
        self.refresh();
    }

    /// Make sure the page-fit slot exists, starting it at identity
    pub fn reserve_global_fit(&mut self) {
        if self.global_fit.is_none() {
            self.set_global_fit(ProjectiveTransform::IDENTITY);
        }
    }

    fn refresh(&mut self) {
        self.aligned = self
            .layers
            .iter()
            .fold(self.params.reflection(), |acc, layer| layer.compose(&acc));
        self.composed = match &self.global_fit {
            Some(fit) => fit.compose(&self.aligned),
            None => self.aligned,
        };
        debug!(
            layers = self.layers.len(),
            fitted = self.global_fit.is_some(),
            atoms = self.atoms.len(),
            "block transform updated"
        );
        for atom in &mut self.atoms {
            atom.set_transform(self.composed);
        }
    }
}

type AxisFn = Box<dyn Fn(f64) -> f64>;

/// Builder for the three-axis block of `F1(u) + F2(v) = F3(w)`.
///
/// Raw placement puts F1 on `x = -1`, F2 on `x = 0` (at half scale, flipped)
/// and F3 on `x = 1` (flipped), so that the three values of a solution are
/// collinear.
#[derive(Default)]
pub struct SumBlockBuilder {
    params: BlockParams,
    f1: Option<(AxisFn, AtomParams)>,
    f2: Option<(AxisFn, AtomParams)>,
    f3: Option<(AxisFn, AtomParams)>,
}

impl SumBlockBuilder {
    pub fn params(mut self, params: BlockParams) -> Self {
        self.params = params;
        self
    }

    pub fn f1(mut self, function: impl Fn(f64) -> f64 + 'static, params: AtomParams) -> Self {
        self.f1 = Some((Box::new(function), params));
        self
    }

    pub fn f2(mut self, function: impl Fn(f64) -> f64 + 'static, params: AtomParams) -> Self {
        self.f2 = Some((Box::new(function), params));
        self
    }

    pub fn f3(mut self, function: impl Fn(f64) -> f64 + 'static, params: AtomParams) -> Self {
        self.f3 = Some((Box::new(function), params));
        self
    }

    pub fn build(self) -> Result<SumBlock> {
        let (f1, p1) = self.f1.ok_or(LayoutError::MissingFunction { name: "F1" })?;
        let (f2, p2) = self.f2.ok_or(LayoutError::MissingFunction { name: "F2" })?;
        let (f3, p3) = self.f3.ok_or(LayoutError::MissingFunction { name: "F3" })?;

        let mut block = Block::new().with_params(self.params);
        block.add_atom(Atom::new(|_| -1.0, f1, p1)?);
        block.add_atom(Atom::new(|_| 0.0, move |v| -0.5 * f2(v), p2)?);
        block.add_atom(Atom::new(|_| 1.0, move |w| -f3(w), p3)?);
        Ok(SumBlock { block })
    }
}

/// Block for `F1 + F2 = F3` with atoms in the order F1, F2, F3
#[derive(Debug, Clone)]
pub struct SumBlock {
    block: Block,
}

impl SumBlock {
    pub fn builder() -> SumBlockBuilder {
        SumBlockBuilder::default()
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn into_block(self) -> Block {
        self.block
    }

    /// Resize the raw axes to span `width × height` before any transform.
    ///
    /// `proportion` is the ratio of the F1–F2 distance to the F2–F3
    /// distance. Scales are chosen so that solutions stay collinear. Sizing
    /// always starts from the functions given to the builder, so calling
    /// this again simply resizes.
    pub fn set_width_height_proportion(
        &mut self,
        width: f64,
        height: f64,
        proportion: f64,
    ) -> Result<()> {
        let size = PaperSize::try_new(width, height).map_err(LayoutError::invalid("block size"))?;
        let p = positive(proportion).map_err(LayoutError::invalid("block proportion"))?;
        let delta_1 = p * size.width() / (1.0 + p);
        let delta_3 = size.width() / (1.0 + p);

        let n = defaults::EXTENT_SAMPLES;
        let [a1, a2, a3] = &self.block.atoms[..] else {
            unreachable!("sum block always holds three atoms")
        };
        // provisional scales mu_1 = p, mu_3 = 1
        let k2 = 2.0 * p / (p + 1.0);
        let highs = [p * a1.highest_point(n), k2 * a2.highest_point(n), a3.highest_point(n)];
        let lows = [p * a1.lowest_point(n), k2 * a2.lowest_point(n), a3.lowest_point(n)];
        let max_y = highs.into_iter().fold(f64::NEG_INFINITY, f64::max);
        let min_y = lows.into_iter().fold(f64::INFINITY, f64::min);
        let y_distance = max_y - min_y;
        if !y_distance.is_finite() || y_distance == 0.0 {
            return Err(LayoutError::degenerate("sum block axes have no vertical extent"));
        }

        let multiplier = size.height() / y_distance;
        let mu_1 = p * multiplier;
        let mu_3 = multiplier;
        debug!(delta_1, delta_3, mu_1, mu_3, "sizing sum block");

        let atoms = &mut self.block.atoms;
        atoms[0].set_raw_scale(delta_1, mu_1);
        atoms[1].set_raw_scale(1.0, 2.0 * mu_1 * mu_3 / (mu_1 + mu_3));
        atoms[2].set_raw_scale(delta_3, mu_3);
        Ok(())
    }
}

impl From<SumBlock> for Block {
    fn from(sum: SumBlock) -> Self {
        sum.into_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    const TOL: f64 = 1e-9;

    fn line_atom(y: f64) -> Atom {
        Atom::new(|u| u, move |_| y, AtomParams::default().with_domain(0.0, 1.0)).unwrap()
    }

    #[test]
    fn new_block_has_identity_seed() {
        let block = Block::new();
        assert_eq!(block.layers(), &[ProjectiveTransform::IDENTITY]);
        assert!(block.global_fit().is_none());
        assert_eq!(block.stack().len(), 1);
    }

    #[test]
    fn push_propagates_to_atoms() {
        let mut block = Block::new().with_atom(line_atom(0.0));
        block.push_transform(ProjectiveTransform::translation(2.0, 3.0));
        let p = block.atoms()[0].point(1.0).unwrap();
        assert_eq!(p, dvec2(3.0, 3.0));
    }

    #[test]
    fn atoms_added_late_take_current_transform() {
        let mut block = Block::new();
        block.push_transform(ProjectiveTransform::translation(0.0, 1.0));
        block.add_atom(line_atom(0.0));
        assert_eq!(block.atoms()[0].evaluate_y(0.5).unwrap(), 1.0);
    }

    #[test]
    fn later_layers_apply_outward() {
        let mut block = Block::new().with_atom(line_atom(0.0));
        block.push_transform(ProjectiveTransform::translation(1.0, 0.0));
        block.push_transform(ProjectiveTransform::scaling(2.0, 2.0));
        // (0,0) -> shift -> (1,0) -> scale -> (2,0)
        assert_eq!(block.atoms()[0].evaluate_x(0.0).unwrap(), 2.0);
    }

    #[test]
    fn replace_last_preserves_lower_layers() {
        let t1 = ProjectiveTransform::rotation_degrees(30.0);
        let t2 = ProjectiveTransform::translation(4.0, -1.0);
        let t3 = ProjectiveTransform::affine(2.0, 0.1, 0.0, -0.3, 1.5, 7.0);

        let mut replaced = Block::new();
        replaced.push_transform(t1);
        replaced.push_transform(t2);
        replaced.replace_last_transform(t3);

        let mut direct = Block::new();
        direct.push_transform(t1);
        direct.push_transform(t3);

        assert!(replaced.composed().approx_eq(direct.composed(), TOL));
        assert_eq!(replaced.layers().len(), 3);
    }

    #[test]
    fn replace_last_targets_global_fit_once_reserved() {
        let mut block = Block::new();
        let align = ProjectiveTransform::translation(1.0, 1.0);
        block.push_transform(align);
        block.reserve_global_fit();
        block.replace_last_transform(ProjectiveTransform::scaling(3.0, 3.0));
        assert_eq!(block.layers().last(), Some(&align));
        assert_eq!(
            block.global_fit(),
            Some(&ProjectiveTransform::scaling(3.0, 3.0))
        );
    }

    #[test]
    fn global_fit_is_replaced_not_composed() {
        let mut block = Block::new().with_atom(line_atom(0.0));
        block.set_global_fit(ProjectiveTransform::translation(5.0, 0.0));
        block.set_global_fit(ProjectiveTransform::translation(1.0, 0.0));
        assert_eq!(block.atoms()[0].evaluate_x(0.0).unwrap(), 1.0);
        assert_eq!(block.aligned(), &ProjectiveTransform::IDENTITY);
    }

    #[test]
    fn reserve_keeps_existing_fit() {
        let mut block = Block::new();
        let fit = ProjectiveTransform::scaling(2.0, 1.0);
        block.set_global_fit(fit);
        block.reserve_global_fit();
        assert_eq!(block.global_fit(), Some(&fit));
    }

    #[test]
    fn empty_block_accepts_transforms() {
        let mut block = Block::new();
        block.push_transform(ProjectiveTransform::scaling(2.0, 2.0));
        block.replace_last_transform(ProjectiveTransform::IDENTITY);
        assert!(block.atoms().is_empty());
        assert_eq!(block.composed(), &ProjectiveTransform::IDENTITY);
    }

    #[test]
    fn sum_block_requires_all_functions() {
        let err = SumBlock::builder()
            .f1(|u| u, AtomParams::default())
            .f3(|w| w, AtomParams::default())
            .build()
            .unwrap_err();
        assert_eq!(err, LayoutError::MissingFunction { name: "F2" });
    }

    #[test]
    fn sum_block_raw_solution_is_collinear() {
        let sum = SumBlock::builder()
            .f1(|u| u, AtomParams::default())
            .f2(|v| v, AtomParams::default())
            .f3(|w| w, AtomParams::default())
            .build()
            .unwrap();
        let atoms = sum.block().atoms();
        // 0.3 + 0.5 = 0.8
        let a = atoms[0].point(0.3).unwrap();
        let b = atoms[1].point(0.5).unwrap();
        let c = atoms[2].point(0.8).unwrap();
        assert!((b - a).perp_dot(c - a).abs() < TOL);
    }

    #[test]
    fn sum_block_sizing_spans_requested_box() {
        let params = AtomParams::default().with_domain(0.0, 10.0);
        let mut sum = SumBlock::builder()
            .f1(|u| u, params.clone())
            .f2(|v| v, params.clone())
            .f3(|w| w, params.clone().with_domain(0.0, 20.0))
            .build()
            .unwrap();
        sum.set_width_height_proportion(8.0, 6.0, 1.0).unwrap();
        let atoms = sum.block().atoms();
        assert!((atoms[0].raw_point(0.0).x + 4.0).abs() < TOL);
        assert!((atoms[2].raw_point(0.0).x - 4.0).abs() < TOL);

        let mut ys = Vec::new();
        for atom in atoms {
            ys.extend(atom.sample(50).unwrap().into_iter().map(|p| p.y));
        }
        let top = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bottom = ys.iter().copied().fold(f64::INFINITY, f64::min);
        assert!((top - bottom - 6.0).abs() < 1e-6);

        let a = atoms[0].point(4.0).unwrap();
        let b = atoms[1].point(7.0).unwrap();
        let c = atoms[2].point(11.0).unwrap();
        assert!((b - a).perp_dot(c - a).abs() < 1e-6);
    }

    #[test]
    fn sum_block_resizing_does_not_compound() {
        let params = AtomParams::default().with_domain(0.0, 10.0);
        let mut sum = SumBlock::builder()
            .f1(|u| u, params.clone())
            .f2(|v| v, params.clone())
            .f3(|w| w, params.with_domain(0.0, 20.0))
            .build()
            .unwrap();
        sum.set_width_height_proportion(10.0, 10.0, 2.0).unwrap();
        let once: Vec<_> = sum.block().atoms().iter().map(Atom::raw_scale).collect();
        sum.set_width_height_proportion(10.0, 10.0, 2.0).unwrap();
        let twice: Vec<_> = sum.block().atoms().iter().map(Atom::raw_scale).collect();
        assert_eq!(once, twice);

        let atoms = sum.block().atoms();
        assert!((atoms[0].raw_point(0.0).x + 20.0 / 3.0).abs() < TOL);
        // 3 + 4 = 7
        let a = atoms[0].point(3.0).unwrap();
        let b = atoms[1].point(4.0).unwrap();
        let c = atoms[2].point(7.0).unwrap();
        assert!((b - a).perp_dot(c - a).abs() < 1e-6);
    }

    #[test]
    fn mirror_applies_beneath_alignment_layers() {
        let mut block = Block::new()
            .with_params(BlockParams::default().with_mirror(true, false))
            .with_atom(line_atom(1.0));
        // (1, 1) -> mirror -> (-1, 1) -> shift -> (9, 1)
        assert_eq!(block.atoms()[0].point(1.0).unwrap(), dvec2(-1.0, 1.0));
        block.push_transform(ProjectiveTransform::translation(10.0, 0.0));
        assert_eq!(block.atoms()[0].point(1.0).unwrap(), dvec2(9.0, 1.0));
        // replacing the last layer keeps the reflection
        block.replace_last_transform(ProjectiveTransform::IDENTITY);
        assert_eq!(block.atoms()[0].point(1.0).unwrap(), dvec2(-1.0, 1.0));
    }

    #[test]
    fn mirrored_sum_block_keeps_solutions_collinear() {
        let sum = SumBlock::builder()
            .params(BlockParams::default().with_mirror(false, true))
            .f1(|u| u, AtomParams::default())
            .f2(|v| v, AtomParams::default())
            .f3(|w| w, AtomParams::default())
            .build()
            .unwrap();
        let atoms = sum.block().atoms();
        let a = atoms[0].point(0.3).unwrap();
        assert!((a.y + 0.3).abs() < TOL);
        let b = atoms[1].point(0.5).unwrap();
        let c = atoms[2].point(0.8).unwrap();
        assert!((b - a).perp_dot(c - a).abs() < TOL);
    }

    #[test]
    fn sum_block_rejects_flat_axes() {
        let mut sum = SumBlock::builder()
            .f1(|_| 0.0, AtomParams::default())
            .f2(|_| 0.0, AtomParams::default())
            .f3(|_| 0.0, AtomParams::default())
            .build()
            .unwrap();
        let err = sum.set_width_height_proportion(10.0, 10.0, 1.0).unwrap_err();
        assert!(matches!(err, LayoutError::DegenerateGeometry { .. }));
    }
}
