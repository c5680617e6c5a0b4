//! Hand-off to the drawing component.
//!
//! Drawing ticks, labels and curves is not done here. A renderer receives
//! every atom in block order, evaluates it through `Atom::point` (which
//! already includes alignment and page fit) and reads the display metadata
//! from `Atom::params`.

use glam::DVec2;

use crate::atom::Atom;
use crate::errors::Result;
use crate::params::WrapperParams;

/// Contract for the external axis-drawing component
pub trait AxisRenderer {
    fn draw_axis(&mut self, atom: &Atom) -> Result<()>;

    /// Called once after all axes, with the nomogram title settings
    fn draw_title(&mut self, _params: &WrapperParams) -> Result<()> {
        Ok(())
    }
}

/// One sampled axis
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub title: String,
    pub points: Vec<DVec2>,
}

/// Renderer that only samples each axis into a polyline.
///
/// Useful for previews and for checking a layout without a drawing backend.
#[derive(Debug, Clone, Default)]
pub struct PolylineCollector {
    samples: usize,
    pub polylines: Vec<Polyline>,
    pub title: Option<String>,
}

impl PolylineCollector {
    pub fn new(samples: usize) -> Self {
        PolylineCollector {
            samples,
            ..Default::default()
        }
    }
}

impl AxisRenderer for PolylineCollector {
    fn draw_axis(&mut self, atom: &Atom) -> Result<()> {
        self.polylines.push(Polyline {
            title: atom.title().to_string(),
            points: atom.sample(self.samples)?,
        });
        Ok(())
    }

    fn draw_title(&mut self, params: &WrapperParams) -> Result<()> {
        if !params.title_str.is_empty() {
            self.title = Some(params.title_str.clone());
        }
        Ok(())
    }
}
