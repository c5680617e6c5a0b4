//! Immutable configuration values for atoms and wrappers.
//!
//! Every field has a documented default (see [`crate::defaults`]). Callers
//! override what they need with struct-update syntax or the `with_*`
//! builders, both of which produce a new value and leave the input untouched.

use std::fmt;
use std::str::FromStr;

use crate::defaults;
use crate::transform::ProjectiveTransform;
use crate::types::{Domain, PaperSize};

/// How ticks are distributed along an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleType {
    #[default]
    Linear,
    Log,
    ManualPoint,
    ManualLine,
}

impl FromStr for ScaleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(ScaleType::Linear),
            "log" => Ok(ScaleType::Log),
            "manual point" => Ok(ScaleType::ManualPoint),
            "manual line" => Ok(ScaleType::ManualLine),
            other => Err(format!("unknown scale type `{other}`")),
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScaleType::Linear => "linear",
            ScaleType::Log => "log",
            ScaleType::ManualPoint => "manual point",
            ScaleType::ManualLine => "manual line",
        })
    }
}

/// Side of the axis the tick labels go to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickSide {
    Left,
    #[default]
    Right,
}

impl FromStr for TickSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(TickSide::Left),
            "right" => Ok(TickSide::Right),
            other => Err(format!("unknown tick side `{other}`")),
        }
    }
}

/// Alignment key shared by atoms of different blocks that must coincide.
///
/// The sentinel `"none"` never matches anything, itself included.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Tag(Option<String>);

impl Tag {
    pub const NONE: Tag = Tag(None);

    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        if label == defaults::TAG_NONE {
            Tag(None)
        } else {
            Tag(Some(label))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or(defaults::TAG_NONE)
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// True when both tags carry the same label and neither is the sentinel
    pub fn aligns_with(&self, other: &Tag) -> bool {
        matches!((&self.0, &other.0), (Some(a), Some(b)) if a == b)
    }
}

impl From<&str> for Tag {
    fn from(label: &str) -> Self {
        Tag::new(label)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-axis configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AtomParams {
    pub u_min: f64,
    pub u_max: f64,
    pub title: String,
    pub title_x_shift: f64,
    pub title_y_shift: f64,
    pub scale_type: ScaleType,
    pub tick_levels: u32,
    pub tick_text_levels: u32,
    pub tick_side: TickSide,
    pub tag: Tag,
}

impl Default for AtomParams {
    fn default() -> Self {
        Self {
            u_min: defaults::U_MIN,
            u_max: defaults::U_MAX,
            title: defaults::TITLE.to_string(),
            title_x_shift: defaults::TITLE_X_SHIFT,
            title_y_shift: defaults::TITLE_Y_SHIFT,
            scale_type: ScaleType::default(),
            tick_levels: defaults::TICK_LEVELS,
            tick_text_levels: defaults::TICK_TEXT_LEVELS,
            tick_side: TickSide::default(),
            tag: Tag::NONE,
        }
    }
}

impl AtomParams {
    pub fn with_domain(self, u_min: f64, u_max: f64) -> Self {
        Self { u_min, u_max, ..self }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    pub fn with_tag(self, tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            ..self
        }
    }

    pub fn with_scale_type(self, scale_type: ScaleType) -> Self {
        Self { scale_type, ..self }
    }

    pub fn with_tick_side(self, tick_side: TickSide) -> Self {
        Self { tick_side, ..self }
    }

    /// Domain as a validated interval
    pub fn domain(&self) -> Result<Domain, crate::types::NumericError> {
        Domain::try_new(self.u_min, self.u_max)
    }
}

/// Per-block configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockParams {
    /// Reflect the block's raw geometry across the y axis (`x ↦ -x`)
    pub mirror_x: bool,
    /// Reflect the block's raw geometry across the x axis (`y ↦ -y`)
    pub mirror_y: bool,
}

impl BlockParams {
    pub fn with_mirror(self, mirror_x: bool, mirror_y: bool) -> Self {
        Self { mirror_x, mirror_y }
    }

    /// Reflection applied beneath every other transform of the block
    pub fn reflection(&self) -> ProjectiveTransform {
        let sign = |mirrored: bool| if mirrored { -1.0 } else { 1.0 };
        ProjectiveTransform::scaling(sign(self.mirror_x), sign(self.mirror_y))
    }
}

/// Nomogram-wide configuration. Title placement defaults depend on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperParams {
    pub title_str: String,
    pub title_x: f64,
    pub title_y: f64,
    pub title_box_width: f64,
}

impl WrapperParams {
    /// Defaults for a given page: title centred at the top edge
    pub fn for_paper(paper: PaperSize) -> Self {
        Self {
            title_str: String::new(),
            title_x: paper.width() / 2.0,
            title_y: paper.height(),
            title_box_width: paper.width() * defaults::TITLE_BOX_WIDTH_RATIO,
        }
    }

    pub fn with_title(self, title_str: impl Into<String>) -> Self {
        Self {
            title_str: title_str.into(),
            ..self
        }
    }
}

impl Default for WrapperParams {
    fn default() -> Self {
        Self::for_paper(PaperSize::default())
    }
}
