//! Error types for funnel execution.

use thiserror::Error;

/// Boxed error returned by fallible batch converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while running a funnel.
///
/// `run` stops at the first lane that fails; lanes registered after it are
/// never converted and no partial output is returned.
#[derive(Debug, Error)]
pub enum FunnelError {
    /// A converter broke the one-output-per-input contract.
    #[error(
        "lane {lane} ({converter}) expected to return {expected} elements for input {inputs}, \
         but got {results} of size {}{actual}",
        size_qualifier(.expected, .actual)
    )]
    SizeMismatch {
        lane: usize,
        converter: &'static str,
        expected: usize,
        /// Results are read up to `expected + 1`, so any `actual` above
        /// `expected` is a lower bound.
        actual: usize,
        /// `Debug` rendering of the inputs handed to the converter.
        inputs: String,
        /// `Debug` rendering of what the converter returned.
        results: String,
    },

    #[error("lane {lane} ({converter}) failed: {source}")]
    Conversion {
        lane: usize,
        converter: &'static str,
        #[source]
        source: BoxError,
    },

    /// An output slot was never written. Every accepted element owns exactly
    /// one slot, so this indicates a broken invariant rather than bad input.
    #[error("output slot {index} was never filled")]
    MissingOutput { index: usize },
}

fn size_qualifier(expected: &usize, actual: &usize) -> &'static str {
    if actual > expected {
        "at least "
    } else {
        ""
    }
}

impl FunnelError {
    /// The lane that failed, if the error is attributable to one.
    pub fn lane(&self) -> Option<usize> {
        match self {
            Self::SizeMismatch { lane, .. } | Self::Conversion { lane, .. } => Some(*lane),
            Self::MissingOutput { .. } => None,
        }
    }
}
