//! Error types with diagnostics using miette
//!
//! Every failure in the layout pipeline is local and synchronous: it is
//! returned at the point of computation and never retried.

use miette::Diagnostic;
use thiserror::Error;

use crate::types::NumericError;

/// Result alias used throughout the crate
pub type Result<T, E = LayoutError> = std::result::Result<T, E>;

/// Errors raised while building, aligning or fitting a nomogram
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("degenerate geometry: {reason}")]
    #[diagnostic(
        code(nomoru::transform::degenerate_geometry),
        help("aligned axes need a non-zero length and correspondence points must not be collinear")
    )]
    DegenerateGeometry { reason: String },

    #[error("division by zero while transforming ({x}, {y})")]
    #[diagnostic(
        code(nomoru::transform::division_by_zero),
        help("the projective denominator vanishes here; choose scales that keep it away from zero")
    )]
    DivisionByZero { x: f64, y: f64 },

    #[error("unknown page-fit method `{name}`")]
    #[diagnostic(
        code(nomoru::fit::unknown_method),
        help("expected one of: scale paper, scale_to_canvas, rotate, polygon, optimize")
    )]
    UnknownMethod { name: String },

    #[error("page-fit method `{method}` requires parameter `{parameter}`")]
    #[diagnostic(code(nomoru::fit::missing_parameter))]
    MissingParameter {
        method: &'static str,
        parameter: &'static str,
    },

    #[error("block is missing required function `{name}`")]
    #[diagnostic(code(nomoru::config::missing_function))]
    MissingFunction { name: &'static str },

    #[error("invalid {what}: {source}")]
    #[diagnostic(code(nomoru::config::invalid_number))]
    InvalidNumber {
        what: &'static str,
        #[source]
        source: NumericError,
    },

    #[error("nothing to fit: the layout has no axes")]
    #[diagnostic(
        code(nomoru::fit::empty_layout),
        help("add at least one block with atoms before fitting to the page")
    )]
    EmptyLayout,
}

impl LayoutError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        LayoutError::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(what: &'static str) -> impl FnOnce(NumericError) -> Self {
        move |source| LayoutError::InvalidNumber { what, source }
    }
}
