use rgb::RGB8;
use serde::{Deserialize, Serialize};

/// Coolest temperature that still glows
pub const VISIBLE_MIN_TEMP_C: f32 = 600.0;

/// Hottest temperature the strip displays; anything above is dark
pub const MAX_LAVA_TEMP_C: f32 = 1200.0;

/// Channel weights of fully heated lava at maximum brightness
pub const LAVA_RGB: RGB8 = RGB8 { r: 252, g: 90, b: 3 };

/// Maps a temperature to a lava color.
///
/// Inside `[visible_min_deg_c, max_deg_c]` the temperature is normalized to
/// `n` in `[0, 1]` and each channel of [`LAVA_RGB`] is scaled by
/// `n * 255 / max_brightness`; green is scaled by `n` once more so hotter lava
/// shifts from deep red toward orange. Outside that window (including NaN) the
/// pixel is off, on both sides.
///
/// `max_brightness` compensates for the global brightness the strip driver
/// applies, so with the reference value of 255 the division is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMapper {
    pub visible_min_deg_c: f32,
    pub max_deg_c: f32,
    pub max_brightness: u8,
    pub lava: RGB8,
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self {
            visible_min_deg_c: VISIBLE_MIN_TEMP_C,
            max_deg_c: MAX_LAVA_TEMP_C,
            max_brightness: u8::MAX,
            lava: LAVA_RGB,
        }
    }
}

impl ColorMapper {
    /// Mapper for a strip driven at `max_brightness`
    #[must_use]
    pub fn with_max_brightness(max_brightness: u8) -> Self {
        Self {
            max_brightness,
            ..Self::default()
        }
    }

    /// Color of a single pixel at `deg_c`
    #[must_use]
    pub fn color_for(&self, deg_c: f32) -> RGB8 {
        if !(self.visible_min_deg_c..=self.max_deg_c).contains(&deg_c) || self.max_brightness == 0 {
            return RGB8::default();
        }
        let span = self.max_deg_c - self.visible_min_deg_c;
        let normalized = if span > 0.0 {
            (deg_c - self.visible_min_deg_c) / span
        } else {
            1.0
        };
        let scale = normalized * 255.0 / f32::from(self.max_brightness);

        RGB8::new(
            channel(self.lava.r, scale),
            channel(self.lava.g, scale * normalized),
            channel(self.lava.b, scale),
        )
    }

    /// Colors for a whole strip of temperatures, index for index
    #[must_use]
    pub fn map_strip(&self, temperatures: &[f32]) -> Vec<RGB8> {
        temperatures.iter().map(|&t| self.color_for(t)).collect()
    }
}

/// Color of `deg_c` under the reference configuration (maximum brightness 255)
#[must_use]
pub fn color_for(deg_c: f32) -> RGB8 {
    ColorMapper::default().color_for(deg_c)
}

#[inline]
fn channel(weight: u8, scale: f32) -> u8 {
    // scale is non-negative inside the visible window; saturate when a reduced
    // max_brightness pushes the product past 255
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let value = (f32::from(weight) * scale).round().clamp(0.0, 255.0) as u8;
    value
}
