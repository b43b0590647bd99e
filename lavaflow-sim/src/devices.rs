//! Host-side strip devices
//!
//! These stand in for a physical WS2812 strip: a terminal preview, a headless
//! frame counter, and a pacing wrapper that reproduces the time a real strip
//! spends shifting a frame out.

use std::convert::Infallible;
use std::io::{self, Stdout, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};

use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use log::{debug, trace, LevelFilter};
use smart_leds::{SmartLedsWrite, RGB8};

/// Lowers the global log level while alive, restoring it on drop
struct LogCeiling {
    previous: LevelFilter,
}

impl LogCeiling {
    fn new(ceiling: LevelFilter) -> Self {
        let previous = log::max_level();
        log::set_max_level(previous.min(ceiling));
        Self { previous }
    }
}

impl Drop for LogCeiling {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}

/// Draws the strip as rows of colored blocks, wrapping at the terminal width.
///
/// Logging is capped at `warn` while the preview holds the alternate screen.
pub struct TerminalStrip {
    out: Stdout,
    _quiet: LogCeiling,
}

impl TerminalStrip {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        Ok(Self {
            out,
            _quiet: LogCeiling::new(LevelFilter::Warn),
        })
    }
}

impl Drop for TerminalStrip {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
    }
}

impl SmartLedsWrite for TerminalStrip {
    type Error = io::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let columns = usize::from(terminal::size().map_or(80, |(w, _)| w.max(1)));
        queue!(self.out, BeginSynchronizedUpdate, cursor::MoveTo(0, 0))?;

        let mut last: Option<RGB8> = None;
        for (i, color) in iterator.into_iter().enumerate() {
            let color: RGB8 = color.into();
            if i > 0 && i % columns == 0 {
                queue!(self.out, cursor::MoveToNextLine(1))?;
            }
            if last != Some(color) {
                queue!(
                    self.out,
                    SetForegroundColor(Color::Rgb {
                        r: color.r,
                        g: color.g,
                        b: color.b,
                    })
                )?;
                last = Some(color);
            }
            queue!(self.out, Print('█'))?;
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()
    }
}

/// Discards frames, logging how many pixels were lit
#[derive(Debug, Default)]
pub struct HeadlessStrip {
    frames: u64,
}

/// Frames between headless progress reports
const HEADLESS_REPORT_EVERY: u64 = 100;

impl Drop for HeadlessStrip {
    fn drop(&mut self) {
        debug!("Headless strip closed after {} frames", self.frames);
    }
}

impl SmartLedsWrite for HeadlessStrip {
    type Error = Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let mut pixels = 0usize;
        let mut lit = 0usize;
        for color in iterator {
            let color: RGB8 = color.into();
            pixels += 1;
            if color != RGB8::default() {
                lit += 1;
            }
        }
        self.frames += 1;
        trace!("Frame {}: {lit}/{pixels} pixels lit", self.frames);
        if self.frames % HEADLESS_REPORT_EVERY == 0 {
            debug!("{} frames rendered, {lit}/{pixels} pixels lit", self.frames);
        }
        Ok(())
    }
}

/// Holds each frame back until `interval` has passed since the previous one
pub struct Paced<W> {
    inner: W,
    interval: Duration,
    last_frame: Option<Instant>,
}

impl<W> Paced<W> {
    pub fn new(inner: W, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last_frame: None,
        }
    }
}

impl<W: SmartLedsWrite> SmartLedsWrite for Paced<W> {
    type Error = W::Error;
    type Color = W::Color;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        if let Some(last) = self.last_frame {
            let since = last.elapsed();
            if since < self.interval {
                sleep(self.interval - since);
            }
        }
        let result = self.inner.write(iterator);
        self.last_frame = Some(Instant::now());
        result
    }
}
