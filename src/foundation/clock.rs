use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Source of "now" in milliseconds.
///
/// Only differences between readings are meaningful; the origin is source-defined.
pub trait TimeSource {
    /// Current time in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Shared handle to the time source every time-dependent component reads from.
///
/// The timing bus, frame driver, delayed timers and glow decorators never look at the
/// system clock directly, so a [`ManualClock`] makes all of them deterministic.
#[derive(Clone)]
pub struct Clock {
    source: Rc<dyn TimeSource>,
}

impl Clock {
    /// Clock backed by a monotonic [`Instant`] captured now.
    pub fn system() -> Self {
        Self::from_source(SystemTimeSource::new())
    }

    /// Clock backed by an arbitrary source.
    pub fn from_source(source: impl TimeSource + 'static) -> Self {
        Self {
            source: Rc::new(source),
        }
    }

    /// Current time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.source.now_ms()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("now_ms", &self.now_ms())
            .finish()
    }
}

impl From<ManualClock> for Clock {
    fn from(manual: ManualClock) -> Self {
        Self::from_source(manual)
    }
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Settable clock for tests and headless rendering.
///
/// Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Clock reading `start_ms`.
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    /// Move forward by `delta_ms`.
    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }

    /// Shared [`Clock`] handle reading this clock.
    pub fn clock(&self) -> Clock {
        Clock::from(self.clone())
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
