//! Lava-flow rendering logic for addressable LED strips
//!
//! This library simulates a per-pixel temperature field along a strip that is
//! split into contiguous segments, evolves it through a small cycle of
//! animation phases (idle shimmer, heating, downhill flow, cooling) and maps
//! each temperature to a lava color. It is hardware-agnostic: frames are handed
//! to a [`RenderSink`], which for real strips is any
//! [`smart_leds::SmartLedsWrite`] driver wrapped in a [`LedStripSink`].
//!
//! ```text
//!   PhaseConfig ──► LavaLamp::tick ──► primitives ──► TemperatureField
//!                        │                                   │
//!                        └──────────── RenderSink ◄──────────┘
//!                                   (ColorMapper → RGB8)
//! ```

mod color;
mod error;
mod field;
mod phase;
mod primitives;
mod segments;
mod sink;
mod targets;

pub use color::{color_for, ColorMapper, LAVA_RGB, MAX_LAVA_TEMP_C, VISIBLE_MIN_TEMP_C};
pub use error::LavaError;
pub use field::TemperatureField;
pub use phase::{LavaLamp, Phase, PhaseConfig};
pub use primitives::{build, downhill, shimmer, LavaStrip};
pub use rgb::RGB8;
pub use segments::SegmentLayout;
pub use sink::{LedStripSink, RenderSink};
pub use targets::{RandomTargets, TargetSource, TempRange};

/// Temperature written to every pixel when the strip is blanked.
pub const OFF_TEMP_C: f32 = 0.0;
