use derive_more::{Display, Error};

/// Errors raised by the lava simulation and its render sinks
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LavaError {
    /// Segment index outside the configured length table
    #[display("segment {segment} out of range ({count} segments configured)")]
    InvalidSegment { segment: usize, count: usize },
    /// Segment lengths do not add up to the strip length
    #[display("segment lengths sum to {actual} pixels, strip has {expected}")]
    LayoutMismatch { expected: usize, actual: usize },
    /// A segment was configured with zero pixels
    #[display("segment {segment} has no pixels")]
    EmptySegment { segment: usize },
    /// Phase configuration outside its valid domain
    #[display("invalid phase configuration: {_0}")]
    InvalidConfig(#[error(not(source))] String),
    /// The render device rejected or failed a frame
    #[display("render failed: {_0}")]
    Render(#[error(not(source))] String),
}
