use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lavaflow_thermal_lib::{PhaseConfig, SegmentLayout};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Configurable log level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

const fn default_led_count() -> usize {
    1200
}

const fn default_max_brightness() -> u8 {
    255
}

/// Minimum milliseconds between frames, close to the wire time of 1200 WS2812 pixels
const fn default_frame_interval_ms() -> u64 {
    30
}

/// Startup configuration, read from a JSON file.
///
/// Every field is optional in the file and falls back to the reference
/// installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_led_count")]
    pub led_count: usize,
    /// Global strip brightness (0-255)
    #[serde(default = "default_max_brightness")]
    pub max_brightness: u8,
    /// Sub-strip lengths, in strip order
    #[serde(default)]
    pub segments: SegmentLayout,
    #[serde(default)]
    pub phases: PhaseConfig,
    /// Minimum time between frames pushed to the strip
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            led_count: default_led_count(),
            max_brightness: default_max_brightness(),
            segments: SegmentLayout::default(),
            phases: PhaseConfig::default(),
            frame_interval_ms: default_frame_interval_ms(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load from `path`, or use the defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Check the startup contract: segments cover the strip and the phases
    /// only reference existing segments
    pub fn validate(&self) -> Result<()> {
        self.segments
            .validate(self.led_count)
            .context("Segment layout does not match led_count")?;
        self.phases
            .validate(&self.segments)
            .context("Invalid phase configuration")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lavaflow_thermal_lib::{LavaError, TempRange};

    /// Test that the defaults describe the reference installation
    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.led_count, 1200);
        assert_eq!(config.max_brightness, 255);
        assert_eq!(config.segments, SegmentLayout::new(vec![2, 100, 300, 200, 598]));
        assert!(config.validate().is_ok());
    }

    /// Test that an empty file falls back to every default
    #[test]
    fn test_empty_json_uses_defaults() {
        let config = Config::from_json("{}").expect("parse");
        assert_eq!(config.led_count, 1200);
        assert_eq!(config.frame_interval_ms, 30);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.phases, PhaseConfig::default());
    }

    /// Test a partial file overriding a few fields
    #[test]
    fn test_partial_json() {
        let config = Config::from_json(
            r#"{
                "led_count": 30,
                "segments": [5, 25],
                "log_level": "debug",
                "phases": { "flow_speed": 2.0, "ending_target": { "low": 600, "high": 610 } }
            }"#,
        )
        .expect("parse");
        assert_eq!(config.led_count, 30);
        assert_eq!(config.segments.total_pixels(), 30);
        assert_eq!(config.log_level.as_level_filter(), LevelFilter::Debug);
        assert_eq!(config.phases.flow_speed, 2.0);
        assert_eq!(config.phases.ending_target, TempRange::new(600, 610));
        assert_eq!(config.phases.transition_steps, 5);
        assert!(config.validate().is_ok());
    }

    /// Test that a layout not summing to the LED count is rejected
    #[test]
    fn test_layout_mismatch_rejected() {
        let config = Config::from_json(r#"{ "led_count": 31, "segments": [5, 25] }"#).expect("parse");
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.downcast_ref::<LavaError>(),
            Some(&LavaError::LayoutMismatch {
                expected: 31,
                actual: 30
            })
        );
    }

    /// Test that phases referencing missing segments are rejected
    #[test]
    fn test_phase_segment_out_of_range() {
        let config = Config::from_json(
            r#"{ "led_count": 10, "segments": [10], "phases": { "flow_segment": 1 } }"#,
        )
        .expect("parse");
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LavaError>(),
            Some(LavaError::InvalidSegment { segment: 1, count: 1 })
        ));
    }

    /// Test that malformed JSON fails to parse
    #[test]
    fn test_malformed_json() {
        assert!(Config::from_json(r#"{ "led_count": "many" }"#).is_err());
        assert!(Config::load(Some(Path::new("/nonexistent/lavaflow.json"))).is_err());
        assert!(Config::load(None).is_ok());
    }
}
