use std::fmt::Debug;

use smart_leds::{brightness, SmartLedsWrite, RGB8};

use crate::{ColorMapper, LavaError};

/// Consumer of full-strip temperature frames.
///
/// Every call carries exactly one temperature per pixel; there are no partial
/// updates. Retries, if any, are the sink's business.
pub trait RenderSink {
    fn render(&mut self, temperatures: &[f32]) -> Result<(), LavaError>;
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn render(&mut self, temperatures: &[f32]) -> Result<(), LavaError> {
        (**self).render(temperatures)
    }
}

/// Renders temperature frames onto any `smart-leds` strip driver.
///
/// Temperatures go through the [`ColorMapper`], then the driver-level
/// brightness is applied with [`smart_leds::brightness`] before the frame is
/// written in one go.
pub struct LedStripSink<W> {
    driver: W,
    mapper: ColorMapper,
    brightness: u8,
    pixel_count: usize,
    frame: Vec<RGB8>,
}

impl<W> LedStripSink<W>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: Debug,
{
    /// Sink for a strip of `pixel_count` LEDs driven at `max_brightness`
    pub fn new(driver: W, pixel_count: usize, max_brightness: u8) -> Self {
        Self {
            driver,
            mapper: ColorMapper::with_max_brightness(max_brightness),
            brightness: max_brightness,
            pixel_count,
            frame: Vec::with_capacity(pixel_count),
        }
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    /// Colors of the last frame written, before driver brightness
    #[must_use]
    pub fn last_frame(&self) -> &[RGB8] {
        &self.frame
    }

    pub fn driver_mut(&mut self) -> &mut W {
        &mut self.driver
    }

    pub fn into_inner(self) -> W {
        self.driver
    }
}

impl<W> RenderSink for LedStripSink<W>
where
    W: SmartLedsWrite<Color = RGB8>,
    W::Error: Debug,
{
    fn render(&mut self, temperatures: &[f32]) -> Result<(), LavaError> {
        if temperatures.len() != self.pixel_count {
            return Err(LavaError::Render(format!(
                "frame has {} pixels, strip has {}",
                temperatures.len(),
                self.pixel_count
            )));
        }
        self.frame.clear();
        self.frame
            .extend(temperatures.iter().map(|&t| self.mapper.color_for(t)));
        self.driver
            .write(brightness(self.frame.iter().copied(), self.brightness))
            .map_err(|e| LavaError::Render(format!("{e:?}")))
    }
}
