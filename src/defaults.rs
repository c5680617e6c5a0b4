//! Default parameter values (mirroring the classic nomogram builder)

pub const U_MIN: f64 = 0.1;
pub const U_MAX: f64 = 1.0;
pub const TITLE: &str = "f1";
pub const TITLE_X_SHIFT: f64 = 0.0;
pub const TITLE_Y_SHIFT: f64 = 0.25;
pub const TICK_LEVELS: u32 = 10;
pub const TICK_TEXT_LEVELS: u32 = 10;
/// Tag value meaning "never align this atom"
pub const TAG_NONE: &str = "none";

pub const PAPER_WIDTH: f64 = 10.0;
pub const PAPER_HEIGHT: f64 = 10.0;
pub const OUTPUT: &str = "dummy.pdf";
/// Title box width as a fraction of the paper width
pub const TITLE_BOX_WIDTH_RATIO: f64 = 1.0 / 2.2;

/// Perpendicular offset of the synthetic third point used for alignment
pub const ALIGN_OFFSET: f64 = 0.01;
/// Samples per axis when measuring the layout for page fitting
pub const FIT_SAMPLES: usize = 200;
/// Samples per axis when measuring raw curve extents for shape sizing
pub const EXTENT_SAMPLES: usize = 500;
