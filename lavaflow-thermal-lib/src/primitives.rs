//! Animation primitives acting on one segment of the temperature field
//!
//! Every primitive takes a blend factor `f` that a phase sweeps upward across
//! the sub-steps of one transition. `f == 0` marks the start of a transition
//! and is where the primitive takes its snapshot (or rerolls its targets);
//! later calls blend from that snapshot, so they depend only on `f` and not on
//! how many sub-steps came before.

use std::ops::Range;

use crate::{LavaError, SegmentLayout, TargetSource, TempRange, TemperatureField};

/// Whether `blend` marks the first sub-step of a transition
#[inline]
fn starts_transition(blend: f32) -> bool {
    blend <= 0.0
}

#[inline]
fn mix(from: f32, to: f32, blend: f32) -> f32 {
    from * (1.0 - blend) + to * blend
}

/// Ease each pixel toward its own random flicker target.
///
/// On the first sub-step every pixel in `range` rerolls its target from
/// `flicker` into the snapshot buffer; every call then moves the current value
/// toward that target by `blend`.
pub fn shimmer<T: TargetSource + ?Sized>(
    field: &mut TemperatureField,
    range: Range<usize>,
    blend: f32,
    flicker: TempRange,
    targets: &mut T,
) {
    let (current, previous) = field.buffers_mut();
    if starts_transition(blend) {
        for target in &mut previous[range.clone()] {
            *target = targets.roll(flicker);
        }
    }
    for (now, &target) in current[range.clone()].iter_mut().zip(&previous[range]) {
        *now = mix(*now, target, blend);
    }
}

/// Heat (or cool) a range uniformly from its pre-transition values to `target_deg_c`
pub fn build(field: &mut TemperatureField, range: Range<usize>, blend: f32, target_deg_c: f32) {
    if starts_transition(blend) {
        field.snapshot(range.clone());
    }
    let (current, previous) = field.buffers_mut();
    for (now, &before) in current[range.clone()].iter_mut().zip(&previous[range]) {
        *now = mix(before, target_deg_c, blend);
    }
}

/// Let lava flow from the head of `range` toward its tail.
///
/// - `f == 0`: snapshot the range, nothing moves.
/// - `0 < f < 1`: every pixel eases from its snapshot toward its upstream
///   neighbour's snapshot; the head pixel, which has no upstream neighbour,
///   eases toward `inflow_deg_c`. One full transition moves the flow one pixel.
/// - `f >= 1`: `f` (truncated) whole-pixel shifts of the current values toward
///   the tail, then the first `f` pixels are set to `inflow_deg_c`. The step
///   count is capped at the range length so nothing outside the range is
///   touched.
pub fn downhill(field: &mut TemperatureField, range: Range<usize>, blend: f32, inflow_deg_c: f32) {
    if range.is_empty() {
        return;
    }
    if starts_transition(blend) {
        field.snapshot(range);
        return;
    }

    let (current, previous) = field.buffers_mut();
    let current = &mut current[range.clone()];
    let previous = &previous[range];

    if blend < 1.0 {
        for i in (1..current.len()).rev() {
            current[i] = mix(previous[i], previous[i - 1], blend);
        }
        current[0] = mix(previous[0], inflow_deg_c, blend);
    } else {
        // blend >= 1 here, truncation toward zero is the intended step count
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (blend as usize).min(current.len());
        let len = current.len();
        current.copy_within(..len - steps, steps);
        current[..steps].fill(inflow_deg_c);
    }
}

/// The temperature field together with the segment layout that addresses it
#[derive(Debug, Clone)]
pub struct LavaStrip {
    layout: SegmentLayout,
    field: TemperatureField,
}

impl LavaStrip {
    /// A dark strip sized to cover every segment of `layout`
    #[must_use]
    pub fn new(layout: SegmentLayout) -> Self {
        let field = TemperatureField::new(layout.total_pixels());
        Self { layout, field }
    }

    #[must_use]
    pub fn layout(&self) -> &SegmentLayout {
        &self.layout
    }

    #[must_use]
    pub fn field(&self) -> &TemperatureField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut TemperatureField {
        &mut self.field
    }

    /// [`shimmer`] over one segment
    pub fn shimmer<T: TargetSource + ?Sized>(
        &mut self,
        segment: usize,
        blend: f32,
        flicker: TempRange,
        targets: &mut T,
    ) -> Result<(), LavaError> {
        let range = self.layout.range(segment)?;
        shimmer(&mut self.field, range, blend, flicker, targets);
        Ok(())
    }

    /// [`build`] over one segment
    pub fn build(&mut self, segment: usize, blend: f32, target_deg_c: f32) -> Result<(), LavaError> {
        let range = self.layout.range(segment)?;
        build(&mut self.field, range, blend, target_deg_c);
        Ok(())
    }

    /// [`downhill`] over one segment
    pub fn downhill(&mut self, segment: usize, blend: f32, inflow_deg_c: f32) -> Result<(), LavaError> {
        let range = self.layout.range(segment)?;
        downhill(&mut self.field, range, blend, inflow_deg_c);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    /// Hands out a fixed cycle of targets and records the requested ranges
    struct Scripted {
        values: Vec<f32>,
        requested: Vec<TempRange>,
    }

    impl Scripted {
        fn new(values: &[f32]) -> Self {
            Self {
                values: values.to_vec(),
                requested: Vec::new(),
            }
        }
    }

    impl TargetSource for Scripted {
        fn roll(&mut self, range: TempRange) -> f32 {
            let value = self.values[self.requested.len() % self.values.len()];
            self.requested.push(range);
            value
        }
    }

    fn ramp(len: usize) -> TemperatureField {
        let mut field = TemperatureField::new(len);
        for i in 0..len {
            field.write(i, 600.0 + 10.0 * i as f32);
        }
        field
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    /// Test that build with f=0 then f=1 lands exactly on the target
    #[test]
    fn test_build_reaches_target() {
        let mut field = ramp(8);
        field.write(7, 5000.0);
        build(&mut field, 2..6, 0.0, 1200.0);
        build(&mut field, 2..6, 1.0, 1200.0);
        for i in 2..6 {
            assert_eq!(field.read(i), 1200.0);
        }
        // Outside the range is untouched
        assert_eq!(field.read(1), 610.0);
        assert_eq!(field.read(7), 5000.0);
    }

    /// Test that intermediate build steps blend from the snapshot, not the last step
    #[test]
    fn test_build_blends_from_snapshot() {
        let mut field = TemperatureField::filled(3, 700.0);
        build(&mut field, 0..3, 0.0, 1200.0);
        build(&mut field, 0..3, 0.2, 1200.0);
        build(&mut field, 0..3, 0.6, 1200.0);
        assert_close(field.read(1), 700.0 * 0.4 + 1200.0 * 0.6);
        assert_eq!(field.read_previous(1), 700.0);
    }

    /// Test that shimmer rerolls every pixel at f=0 and reaches the roll at f=1
    #[test]
    fn test_shimmer_reroll_and_settle() {
        let mut field = ramp(6);
        let mut targets = crate::RandomTargets::from_seed(3);
        let flicker = TempRange::new(625, 650);
        shimmer(&mut field, 1..5, 0.0, flicker, &mut targets);
        for i in 1..5 {
            assert!(flicker.contains(field.read_previous(i)));
            // f = 0 leaves the current value alone
            assert_eq!(field.read(i), 600.0 + 10.0 * i as f32);
        }
        let rolled: Vec<f32> = field.previous()[1..5].to_vec();
        shimmer(&mut field, 1..5, 0.4, flicker, &mut targets);
        shimmer(&mut field, 1..5, 1.0, flicker, &mut targets);
        assert_eq!(&field.current()[1..5], rolled.as_slice());
        assert_eq!(field.read(0), 600.0);
        assert_eq!(field.read(5), 650.0);
    }

    /// Test that shimmer only rolls on the first sub-step
    #[test]
    fn test_shimmer_rolls_once_per_transition() {
        let mut field = TemperatureField::new(4);
        let mut targets = Scripted::new(&[630.0, 640.0]);
        let flicker = TempRange::new(625, 650);
        for step in 0..5 {
            shimmer(&mut field, 0..4, step as f32 / 5.0, flicker, &mut targets);
        }
        assert_eq!(targets.requested, vec![flicker; 4]);
        assert_eq!(field.previous(), &[630.0, 640.0, 630.0, 640.0]);
    }

    /// Test the smoothed downhill step against its per-pixel formula
    #[test]
    fn test_downhill_smoothed_step() {
        let mut field = ramp(10);
        let before: Vec<f32> = field.current().to_vec();
        let range = 2..8;
        downhill(&mut field, range.clone(), 0.0, 1000.0);
        assert_eq!(field.current(), before.as_slice());

        let f = 0.4;
        downhill(&mut field, range.clone(), f, 1000.0);
        assert_close(field.read(2), before[2] * (1.0 - f) + 1000.0 * f);
        for i in 3..8 {
            assert_close(field.read(i), before[i] * (1.0 - f) + before[i - 1] * f);
        }
        assert_eq!(field.read(1), before[1]);
        assert_eq!(field.read(8), before[8]);

        // A later sub-step of the same transition still blends from the snapshot
        let f = 0.8;
        downhill(&mut field, range, f, 1000.0);
        assert_close(field.read(5), before[5] * (1.0 - f) + before[4] * f);
    }

    /// Test whole-pixel downhill shifts
    #[test]
    fn test_downhill_integer_shift() {
        for steps in 1..=6usize {
            let mut field = ramp(8);
            let before: Vec<f32> = field.current().to_vec();
            downhill(&mut field, 1..7, steps as f32, 999.0);
            for i in 1..7 {
                let offset = i - 1;
                let expected = if offset < steps {
                    999.0
                } else {
                    before[i - steps]
                };
                assert_eq!(field.read(i), expected, "steps={steps} pixel={i}");
            }
            assert_eq!(field.read(0), before[0]);
            assert_eq!(field.read(7), before[7]);
        }
    }

    /// Test that shifting further than the segment never leaks past it
    #[test]
    fn test_downhill_shift_clamped_to_segment() {
        let mut field = ramp(6);
        downhill(&mut field, 0..3, 10.0, 777.0);
        assert_eq!(&field.current()[..3], &[777.0, 777.0, 777.0]);
        assert_eq!(field.read(3), 630.0);
    }

    /// Test a single-pixel segment follows the inflow
    #[test]
    fn test_downhill_single_pixel() {
        let mut field = TemperatureField::filled(1, 600.0);
        downhill(&mut field, 0..1, 0.0, 700.0);
        downhill(&mut field, 0..1, 0.5, 700.0);
        assert_close(field.read(0), 650.0);
        downhill(&mut field, 0..1, 1.0, 700.0);
        assert_eq!(field.read(0), 700.0);
    }

    /// Test segment-addressed wrappers and their errors
    #[test]
    fn test_strip_segment_addressing() {
        let mut strip = LavaStrip::new(SegmentLayout::new(vec![2, 4]));
        assert_eq!(strip.field().len(), 6);
        strip.build(1, 0.0, 800.0).expect("segment 1");
        strip.build(1, 1.0, 800.0).expect("segment 1");
        assert_eq!(strip.field().current(), &[0.0, 0.0, 800.0, 800.0, 800.0, 800.0]);

        let err = Err(LavaError::InvalidSegment {
            segment: 2,
            count: 2,
        });
        assert_eq!(strip.downhill(2, 0.5, 650.0), err);
        assert_eq!(strip.build(2, 0.5, 650.0), err);
        let mut targets = Scripted::new(&[640.0]);
        assert_eq!(
            strip.shimmer(2, 0.0, TempRange::new(625, 650), &mut targets),
            err
        );
        assert!(targets.requested.is_empty());
    }
}
