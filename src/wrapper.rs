//! The nomogram as a whole: blocks, their alignment, and the page fit.

use crate::align::alignment_transform;
use crate::block::Block;
use crate::defaults;
use crate::errors::{LayoutError, Result};
use crate::fit::{AxisDescriptor, FitMethod, PageFitter};
use crate::log::{debug, warn};
use crate::params::WrapperParams;
use crate::render::AxisRenderer;
use crate::types::PaperSize;

/// Owns the blocks of one nomogram and drives the layout pipeline:
///
/// 1. [`Wrapper::align_blocks`] lays tagged axes of later blocks over the
///    matching axes of earlier blocks;
/// 2. [`Wrapper::do_transformation`] fits the aligned layout to the page
///    through an injected [`PageFitter`];
/// 3. [`Wrapper::draw`] hands every axis to a renderer.
#[derive(Debug, Clone)]
pub struct Wrapper {
    blocks: Vec<Block>,
    paper: PaperSize,
    output: String,
    params: WrapperParams,
}

impl Default for Wrapper {
    fn default() -> Self {
        Self::new(PaperSize::default())
    }
}

impl Wrapper {
    pub fn new(paper: PaperSize) -> Self {
        Wrapper {
            blocks: Vec::new(),
            paper,
            output: defaults::OUTPUT.to_string(),
            params: WrapperParams::for_paper(paper),
        }
    }

    /// Wrapper for a `width × height` page
    pub fn try_new(width: f64, height: f64) -> Result<Self> {
        let paper = PaperSize::try_new(width, height).map_err(LayoutError::invalid("paper size"))?;
        Ok(Self::new(paper))
    }

    pub fn with_params(self, params: WrapperParams) -> Self {
        Self { params, ..self }
    }

    /// Output target, passed through untouched to whoever writes the result
    pub fn with_output(self, output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..self
        }
    }

    pub fn add_block(&mut self, block: impl Into<Block>) {
        self.blocks.push(block.into());
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn paper(&self) -> PaperSize {
        self.paper
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn params(&self) -> &WrapperParams {
        &self.params
    }

    /// Align blocks to each other through their atoms' tags.
    ///
    /// For each block pair `i < j` and each atom pair with matching tags,
    /// block `j` receives the transform laying its atom over block `i`'s.
    /// Pairs are visited in registration order, then atom order; every match
    /// adds a layer. Afterwards each block has its page-fit slot reserved.
    ///
    /// Atoms are measured without the page fit, so aligning after a fit
    /// still makes tagged axes coincide. On error no block is touched.
    pub fn align_blocks(&mut self) -> Result<()> {
        let mut blocks = self.blocks.clone();
        for i in 0..blocks.len() {
            for j in (i + 1)..blocks.len() {
                for a in 0..blocks[i].atoms().len() {
                    for b in 0..blocks[j].atoms().len() {
                        let (earlier, later) = (&blocks[i], &blocks[j]);
                        let reference = AxisDescriptor::new(&earlier.atoms()[a], *earlier.aligned());
                        let moving = AxisDescriptor::new(&later.atoms()[b], *later.aligned());
                        if !reference.atom().tag().aligns_with(moving.atom().tag()) {
                            continue;
                        }
                        debug!(
                            tag = %reference.atom().tag(),
                            reference_block = i,
                            moving_block = j,
                            "aligning tagged axes"
                        );
                        let transform = alignment_transform(&reference, &moving)?;
                        blocks[j].push_transform(transform);
                    }
                }
            }
        }
        for block in &mut blocks {
            block.reserve_global_fit();
        }
        self.blocks = blocks;
        Ok(())
    }

    /// Every axis of every block, in block order then atom order, evaluated
    /// without the current page fit
    pub fn collect_axes(&self) -> Vec<AxisDescriptor<'_>> {
        self.blocks
            .iter()
            .flat_map(|block| {
                let base = *block.aligned();
                block
                    .atoms()
                    .iter()
                    .map(move |atom| AxisDescriptor::new(atom, base))
            })
            .collect()
    }

    /// Fit the layout to the page and install the result in every block.
    ///
    /// The new transform replaces the previous page fit; consecutive calls
    /// do not compose. On error no block is touched.
    pub fn do_transformation(&mut self, fitter: &dyn PageFitter, method: &FitMethod) -> Result<()> {
        let axes = self.collect_axes();
        let transform = fitter.fit(method, &axes, self.paper)?;
        debug!(?method, ?transform, "installing page fit");
        for block in &mut self.blocks {
            if block.atoms().is_empty() {
                warn!("page fit applied to a block without atoms");
            }
            block.set_global_fit(transform);
        }
        Ok(())
    }

    /// Like [`Wrapper::do_transformation`], selecting the method by name.
    /// Unknown names are rejected before anything else happens.
    pub fn do_named_transformation(
        &mut self,
        fitter: &dyn PageFitter,
        name: &str,
        param: Option<f64>,
    ) -> Result<()> {
        let method = FitMethod::from_name(name, param)?;
        self.do_transformation(fitter, &method)
    }

    /// Hand every axis to `renderer`, then the title
    pub fn draw(&self, renderer: &mut dyn AxisRenderer) -> Result<()> {
        for block in &self.blocks {
            for atom in block.atoms() {
                renderer.draw_axis(atom)?;
            }
        }
        renderer.draw_title(&self.params)
    }
}
