//! Phase state machine driving the lava animation
//!
//! The lamp cycles `Idle → Building → Flowing → Ending → Idle`. Each call to
//! [`LavaLamp::tick`] runs the active phase's full sequence of sub-steps,
//! rendering after every sub-step, and then decides the phase for the next
//! tick from the time elapsed since the start of the current cycle. That
//! origin is only reset when `Ending` hands back to `Idle`.

use std::time::Duration;

use derive_more::Display;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{LavaError, LavaStrip, RenderSink, SegmentLayout, TargetSource, TempRange, OFF_TEMP_C};

/// Animation phase of the lamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Gentle drift toward a warm resting temperature
    #[default]
    Idle,
    /// Heat segment ramps up while the flow segment shimmers
    Building,
    /// Lava runs down the flow segment
    Flowing,
    /// Both segments drain toward a cooler temperature
    Ending,
}

/// Timing, segment and temperature parameters of the phase cycle.
///
/// Defaults reproduce the reference installation. Times are seconds measured
/// from the start of the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Segment that heats up while building
    pub heat_segment: usize,
    /// Segment the lava flows down
    pub flow_segment: usize,
    /// Sub-steps per transition; downhill sweeps run one extra to reach `f = 1`
    pub transition_steps: u32,
    /// Idle hands over to building once the cycle is older than this
    pub idle_dwell_secs: f32,
    /// Flowing hands over to ending once the cycle is older than this
    pub flow_secs: f32,
    /// Ending hands over to idle (and restarts the cycle) after this
    pub cycle_secs: f32,
    /// Pixels the flow advances per tick
    pub flow_speed: f32,
    pub idle_target: TempRange,
    pub build_target_deg_c: f32,
    pub flow_target: TempRange,
    pub ending_target: TempRange,
    /// Flicker range rerolled by shimmer
    pub shimmer_target: TempRange,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            heat_segment: 0,
            flow_segment: 1,
            transition_steps: 5,
            idle_dwell_secs: 2.0,
            flow_secs: 20.0,
            cycle_secs: 40.0,
            flow_speed: 1.0,
            idle_target: TempRange::new(625, 650),
            build_target_deg_c: 1200.0,
            flow_target: TempRange::new(700, 1100),
            ending_target: TempRange::new(605, 625),
            shimmer_target: TempRange::new(625, 650),
        }
    }
}

impl PhaseConfig {
    /// Check the configuration against the segment layout it will animate
    pub fn validate(&self, layout: &SegmentLayout) -> Result<(), LavaError> {
        layout.segment_len(self.heat_segment)?;
        layout.segment_len(self.flow_segment)?;

        if self.transition_steps == 0 {
            return Err(LavaError::InvalidConfig(
                "transition_steps must be at least 1".to_string(),
            ));
        }
        if !(self.flow_speed.is_finite() && self.flow_speed > 0.0) {
            return Err(LavaError::InvalidConfig(format!(
                "flow_speed must be positive, got {}",
                self.flow_speed
            )));
        }
        for (name, secs) in [
            ("idle_dwell_secs", self.idle_dwell_secs),
            ("flow_secs", self.flow_secs),
            ("cycle_secs", self.cycle_secs),
        ] {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(LavaError::InvalidConfig(format!(
                    "{name} must be a non-negative number of seconds, got {secs}"
                )));
            }
        }
        for (name, range) in [
            ("idle_target", self.idle_target),
            ("flow_target", self.flow_target),
            ("ending_target", self.ending_target),
            ("shimmer_target", self.shimmer_target),
        ] {
            if !range.is_valid() {
                return Err(LavaError::InvalidConfig(format!(
                    "{name} low bound {} exceeds high bound {}",
                    range.low, range.high
                )));
            }
        }
        Ok(())
    }

    /// Segments swept by phases that run downhill over both, without repeats
    fn downhill_segments(&self) -> impl Iterator<Item = usize> {
        let second = (self.flow_segment != self.heat_segment).then_some(self.flow_segment);
        std::iter::once(self.heat_segment).chain(second)
    }
}

/// The lava lamp: a strip, its phase configuration and the cycle clock
#[derive(Debug, Clone)]
pub struct LavaLamp {
    strip: LavaStrip,
    config: PhaseConfig,
    phase: Phase,
    cycle_start: Duration,
    ticks: u64,
}

impl LavaLamp {
    /// Start a lamp in [`Phase::Idle`] with the cycle beginning at `now`
    pub fn new(strip: LavaStrip, config: PhaseConfig, now: Duration) -> Result<Self, LavaError> {
        config.validate(strip.layout())?;
        Ok(Self {
            strip,
            config,
            phase: Phase::Idle,
            cycle_start: now,
            ticks: 0,
        })
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn strip(&self) -> &LavaStrip {
        &self.strip
    }

    #[must_use]
    pub fn config(&self) -> &PhaseConfig {
        &self.config
    }

    /// Ticks run since the lamp was created
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Time since the current cycle began
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.cycle_start)
    }

    /// Run one tick of the active phase and return the phase for the next one.
    ///
    /// `now` is any monotonic timestamp on the same clock passed to
    /// [`LavaLamp::new`]. Render failures abort the tick and are returned as is.
    pub fn tick<S, T>(&mut self, now: Duration, sink: &mut S, targets: &mut T) -> Result<Phase, LavaError>
    where
        S: RenderSink + ?Sized,
        T: TargetSource + ?Sized,
    {
        let elapsed = self.elapsed(now).as_secs_f32();

        let next = match self.phase {
            Phase::Idle => {
                let target = targets.roll(self.config.idle_target);
                self.downhill_sweep(target, sink)?;
                if elapsed > self.config.idle_dwell_secs {
                    Phase::Building
                } else {
                    Phase::Idle
                }
            }
            Phase::Building => {
                self.build_up(sink, targets)?;
                Phase::Flowing
            }
            Phase::Flowing => {
                let target = targets.roll(self.config.flow_target);
                self.flow(target, sink)?;
                if elapsed > self.config.flow_secs {
                    Phase::Ending
                } else {
                    Phase::Flowing
                }
            }
            Phase::Ending => {
                let target = targets.roll(self.config.ending_target);
                self.downhill_sweep(target, sink)?;
                if elapsed > self.config.cycle_secs {
                    debug!("Cycle complete after {elapsed:.1}s, restarting clock");
                    self.cycle_start = now;
                    Phase::Idle
                } else {
                    Phase::Ending
                }
            }
        };

        if next != self.phase {
            info!("Phase {} -> {next} at {elapsed:.1}s", self.phase);
        }
        self.phase = next;
        self.ticks += 1;
        Ok(next)
    }

    /// Switch every pixel off and render once
    pub fn blackout<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), LavaError> {
        self.strip.field_mut().fill(OFF_TEMP_C);
        sink.render(self.strip.field().current())
    }

    fn render<S: RenderSink + ?Sized>(&self, sink: &mut S) -> Result<(), LavaError> {
        sink.render(self.strip.field().current())
    }

    #[allow(clippy::cast_precision_loss)]
    fn blend(&self, step: u32) -> f32 {
        step as f32 / self.config.transition_steps as f32
    }

    /// Downhill over the heat and flow segments, `f` from 0 through 1
    fn downhill_sweep<S: RenderSink + ?Sized>(&mut self, inflow_deg_c: f32, sink: &mut S) -> Result<(), LavaError> {
        for step in 0..=self.config.transition_steps {
            let blend = self.blend(step);
            for segment in self.config.downhill_segments() {
                self.strip.downhill(segment, blend, inflow_deg_c)?;
            }
            self.render(sink)?;
        }
        Ok(())
    }

    /// Heat the heat segment and shimmer the flow segment, `f` from 0 up to
    /// one step short of 1
    fn build_up<S, T>(&mut self, sink: &mut S, targets: &mut T) -> Result<(), LavaError>
    where
        S: RenderSink + ?Sized,
        T: TargetSource + ?Sized,
    {
        let (heat, flow) = (self.config.heat_segment, self.config.flow_segment);
        for step in 0..self.config.transition_steps {
            let blend = self.blend(step);
            self.strip.build(heat, blend, self.config.build_target_deg_c)?;
            self.strip.shimmer(flow, blend, self.config.shimmer_target, targets)?;
            self.render(sink)?;
        }
        Ok(())
    }

    /// Advance the flow segment by `flow_speed` pixels.
    ///
    /// Up to one pixel per tick the step is split into `ceil(speed) + 1`
    /// sub-steps with `f = k * speed`: a snapshot, then a partial or full
    /// one-pixel move. Faster flows jump in a single whole-pixel downhill call.
    fn flow<S: RenderSink + ?Sized>(&mut self, inflow_deg_c: f32, sink: &mut S) -> Result<(), LavaError> {
        let speed = self.config.flow_speed;
        let segment = self.config.flow_segment;
        if speed <= 1.0 {
            // speed is in (0, 1] after validation
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let sub_steps = speed.ceil() as u32 + 1;
            for step in 0..sub_steps {
                #[allow(clippy::cast_precision_loss)]
                let blend = step as f32 * speed;
                self.strip.downhill(segment, blend, inflow_deg_c)?;
                self.render(sink)?;
            }
        } else {
            self.strip.downhill(segment, speed, inflow_deg_c)?;
            self.render(sink)?;
        }
        Ok(())
    }
}
