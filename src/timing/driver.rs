use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::foundation::clock::Clock;
use crate::timing::bus::TimingBus;

/// Frame length that `delta_time == 1.0` corresponds to.
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Longest gap between frames passed on to simulations.
pub const MAX_DELTA_MS: f64 = 100.0;

/// Per-frame timing handed to tickers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// 0-based count of ticks since the driver was created.
    pub frame: u64,
    pub now_ms: f64,
    /// Time since the previous tick, `0` on the first and capped at [`MAX_DELTA_MS`].
    pub delta_ms: f64,
    /// `delta_ms` in units of a 60 fps frame.
    pub delta_time: f64,
}

/// Handle for [`FrameDriver::remove`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickerId(u64);

type TickCallback = Rc<RefCell<dyn FnMut(&FrameTick)>>;

#[derive(Default)]
struct DriverState {
    tickers: Vec<(TickerId, TickCallback)>,
    next_id: u64,
    frame: u64,
    last_ms: Option<f64>,
}

/// Runs the timing bus and then every per-frame callback, once per [`tick`](Self::tick).
#[derive(Clone)]
pub struct FrameDriver {
    inner: Rc<RefCell<DriverState>>,
    clock: Clock,
    bus: TimingBus,
}

impl FrameDriver {
    pub fn new(clock: &Clock, bus: &TimingBus) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DriverState::default())),
            clock: clock.clone(),
            bus: bus.clone(),
        }
    }

    /// Register a per-frame callback; callbacks run in registration order.
    pub fn add(&self, callback: impl FnMut(&FrameTick) + 'static) -> TickerId {
        let mut st = self.inner.borrow_mut();
        let id = TickerId(st.next_id);
        st.next_id += 1;
        st.tickers.push((id, Rc::new(RefCell::new(callback))));
        id
    }

    pub fn remove(&self, id: TickerId) -> bool {
        let mut st = self.inner.borrow_mut();
        let before = st.tickers.len();
        st.tickers.retain(|(t, _)| *t != id);
        st.tickers.len() != before
    }

    pub fn ticker_count(&self) -> usize {
        self.inner.borrow().tickers.len()
    }

    /// Advance one frame at the clock's current reading.
    pub fn tick(&self) -> FrameTick {
        let now_ms = self.clock.now_ms();
        let (tick, tickers) = {
            let mut st = self.inner.borrow_mut();
            let delta_ms = st
                .last_ms
                .map_or(0.0, |last| (now_ms - last).clamp(0.0, MAX_DELTA_MS));
            let tick = FrameTick {
                frame: st.frame,
                now_ms,
                delta_ms,
                delta_time: delta_ms / REFERENCE_FRAME_MS,
            };
            st.frame += 1;
            st.last_ms = Some(now_ms);
            (tick, st.tickers.clone())
        };

        self.bus.pump(now_ms);

        for (id, callback) in tickers {
            let live = self.inner.borrow().tickers.iter().any(|(t, _)| *t == id);
            if live {
                (&mut *callback.borrow_mut())(&tick);
            }
        }
        tick
    }
}

impl fmt::Debug for FrameDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.inner.borrow();
        f.debug_struct("FrameDriver")
            .field("frame", &st.frame)
            .field("tickers", &st.tickers.len())
            .finish()
    }
}
