use std::ops::Range;

use crate::OFF_TEMP_C;

/// Per-pixel temperatures for the whole strip.
///
/// `current` is what gets rendered. `previous` holds the snapshot taken when a
/// transition starts and is the blend source for every later sub-step of that
/// transition. Both buffers are sized once and only ever mutated in place.
/// Values are plain degrees Celsius and are not clamped here.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureField {
    current: Vec<f32>,
    previous: Vec<f32>,
}

impl TemperatureField {
    /// Create a field of `len` dark pixels
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self::filled(len, OFF_TEMP_C)
    }

    /// Create a field with every pixel (current and previous) at `deg_c`
    #[must_use]
    pub fn filled(len: usize, deg_c: f32) -> Self {
        Self {
            current: vec![deg_c; len],
            previous: vec![deg_c; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    #[must_use]
    pub fn read(&self, pixel: usize) -> f32 {
        self.current[pixel]
    }

    pub fn write(&mut self, pixel: usize, deg_c: f32) {
        self.current[pixel] = deg_c;
    }

    #[must_use]
    pub fn read_previous(&self, pixel: usize) -> f32 {
        self.previous[pixel]
    }

    pub fn write_previous(&mut self, pixel: usize, deg_c: f32) {
        self.previous[pixel] = deg_c;
    }

    /// Copy current into previous for exactly `range`
    pub fn snapshot(&mut self, range: Range<usize>) {
        self.previous[range.clone()].copy_from_slice(&self.current[range]);
    }

    /// Set every current pixel to `deg_c`, leaving snapshots untouched
    pub fn fill(&mut self, deg_c: f32) {
        self.current.fill(deg_c);
    }

    /// The temperatures to render
    #[must_use]
    pub fn current(&self) -> &[f32] {
        &self.current
    }

    #[must_use]
    pub fn previous(&self) -> &[f32] {
        &self.previous
    }

    /// Both buffers at once, for primitives that read one and write the other
    pub(crate) fn buffers_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.current, &mut self.previous)
    }
}
