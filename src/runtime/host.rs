use crate::config::show::ShowConfig;
use crate::foundation::clock::Clock;
use crate::foundation::color::Color;
use crate::foundation::core::Canvas;
use crate::surface::display_list::Surface;
use crate::timing::bus::{TimingBand, TimingBus};
use crate::timing::driver::{FrameDriver, FrameTick};
use crate::timing::timers::Timers;

/// Process-wide context: one clock, surface, timing bus, frame driver and timer queue.
///
/// Built once and handed to scenes by reference. Every field is a shared handle, so
/// cloning a component out of the host is cheap and stays connected.
#[derive(Debug)]
pub struct Host {
    clock: Clock,
    surface: Surface,
    timing: TimingBus,
    driver: FrameDriver,
    timers: Timers,
    seed: u64,
}

impl Host {
    /// Host with the default timing bands.
    pub fn new(clock: Clock, canvas: Canvas, background: Color) -> Self {
        Self::with_bands(clock, canvas, background, &TimingBand::defaults(), 0)
    }

    pub fn from_config(clock: Clock, config: &ShowConfig) -> Self {
        Self::with_bands(
            clock,
            config.canvas,
            config.background,
            &config.timing,
            config.seed,
        )
    }

    fn with_bands(
        clock: Clock,
        canvas: Canvas,
        background: Color,
        bands: &[TimingBand],
        seed: u64,
    ) -> Self {
        let surface = Surface::new(canvas, background);
        let timing = TimingBus::with_bands(&clock, bands);
        let driver = FrameDriver::new(&clock, &timing);
        let timers = Timers::new(&clock);
        Self {
            clock,
            surface,
            timing,
            driver,
            timers,
            seed,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn timing(&self) -> &TimingBus {
        &self.timing
    }

    pub fn driver(&self) -> &FrameDriver {
        &self.driver
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Seed scenes derive their random streams from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run one frame: due delayed callbacks, then the timing bus, then tickers.
    pub fn step(&self) -> FrameTick {
        self.timers.pump(self.clock.now_ms());
        self.driver.tick()
    }
}
