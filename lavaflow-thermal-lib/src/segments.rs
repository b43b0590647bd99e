use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::LavaError;

/// Ordered list of sub-strip lengths partitioning the whole strip.
///
/// Segment `i` covers the half-open pixel range
/// `[sum(lengths[..i]), sum(lengths[..=i]))`, so consecutive segments touch
/// without overlapping and together cover every pixel exactly once. Bounds are
/// recomputed on every lookup; the table is tiny and fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentLayout {
    lengths: Vec<usize>,
}

impl Default for SegmentLayout {
    /// Reference installation: five sub-strips totalling 1200 pixels.
    ///
    /// The tail segment holds 598 pixels so the table sums to the strip length.
    fn default() -> Self {
        Self::new(vec![2, 100, 300, 200, 598])
    }
}

impl SegmentLayout {
    #[must_use]
    pub fn new(lengths: Vec<usize>) -> Self {
        Self { lengths }
    }

    /// Number of segments in the layout
    #[must_use]
    pub fn count(&self) -> usize {
        self.lengths.len()
    }

    /// Total pixel count covered by all segments
    #[must_use]
    pub fn total_pixels(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Pixel count of one segment
    pub fn segment_len(&self, segment: usize) -> Result<usize, LavaError> {
        self.lengths
            .get(segment)
            .copied()
            .ok_or(LavaError::InvalidSegment {
                segment,
                count: self.lengths.len(),
            })
    }

    /// First pixel index of a segment (0 for the first segment)
    pub fn start(&self, segment: usize) -> Result<usize, LavaError> {
        self.segment_len(segment)?;
        Ok(self.lengths[..segment].iter().sum())
    }

    /// Exclusive upper bound of a segment, equal to the next segment's start
    pub fn end(&self, segment: usize) -> Result<usize, LavaError> {
        Ok(self.start(segment)? + self.segment_len(segment)?)
    }

    /// Half-open pixel range of a segment
    pub fn range(&self, segment: usize) -> Result<Range<usize>, LavaError> {
        let start = self.start(segment)?;
        Ok(start..start + self.lengths[segment])
    }

    /// Iterate over every segment's pixel range in strip order
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.lengths.iter().scan(0, |start, &len| {
            let range = *start..*start + len;
            *start += len;
            Some(range)
        })
    }

    /// Check the layout against the configured strip length.
    ///
    /// This is a startup contract: every segment must hold at least one pixel
    /// and the lengths must add up to `total_pixels`.
    pub fn validate(&self, total_pixels: usize) -> Result<(), LavaError> {
        if let Some(segment) = self.lengths.iter().position(|&len| len == 0) {
            return Err(LavaError::EmptySegment { segment });
        }
        let actual = self.total_pixels();
        if actual != total_pixels {
            return Err(LavaError::LayoutMismatch {
                expected: total_pixels,
                actual,
            });
        }
        Ok(())
    }
}
