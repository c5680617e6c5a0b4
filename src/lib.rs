//! Layout engine for nomograms.
//!
//! A nomogram is built from [`Atom`]s (parametric axes) grouped into
//! [`Block`]s. Each block composes a stack of projective transforms and
//! pushes the result into its atoms. A [`Wrapper`] aligns blocks through
//! tagged axes and finally fits the whole layout onto the page with an
//! injected [`PageFitter`].
//!
//! ```
//! use nomoru::{AtomParams, AxesFitter, Block, FitMethod, SumBlock, Wrapper};
//!
//! # fn main() -> Result<(), nomoru::LayoutError> {
//! let params = AtomParams::default().with_domain(0.0, 10.0);
//! let mut sum = SumBlock::builder()
//!     .f1(|u| u, params.clone().with_title("u"))
//!     .f2(|v| v, params.clone().with_title("v"))
//!     .f3(|w| w, params.with_domain(0.0, 20.0).with_title("w"))
//!     .build()?;
//! sum.set_width_height_proportion(10.0, 10.0, 1.0)?;
//!
//! let mut wrapper = Wrapper::try_new(20.0, 15.0)?;
//! wrapper.add_block(sum);
//! wrapper.align_blocks()?;
//! wrapper.do_transformation(&AxesFitter::new(), &FitMethod::default())?;
//!
//! let block: &Block = &wrapper.blocks()[0];
//! let top = block.atoms()[0].evaluate_y(10.0)?;
//! assert!((top - 15.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod atom;
pub mod block;
pub mod defaults;
pub mod errors;
pub mod fit;
pub mod log;
pub mod params;
pub mod render;
pub mod transform;
pub mod types;
pub mod wrapper;

pub use atom::Atom;
pub use block::{Block, SumBlock, SumBlockBuilder};
pub use errors::{LayoutError, Result};
pub use fit::{AxesFitter, AxisDescriptor, FitMethod, FitStrategy, PageFitter};
pub use params::{AtomParams, BlockParams, ScaleType, Tag, TickSide, WrapperParams};
pub use render::{AxisRenderer, PolylineCollector};
pub use transform::ProjectiveTransform;
pub use types::{BBox, Domain, PaperSize};
pub use wrapper::Wrapper;
