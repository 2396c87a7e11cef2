use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::foundation::clock::Clock;
use crate::foundation::error::{KineticaError, KineticaResult};

/// A named periodic band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingBand {
    pub name: String,
    pub interval_ms: f64,
}

impl TimingBand {
    pub fn new(name: impl Into<String>, interval_ms: f64) -> Self {
        Self {
            name: name.into(),
            interval_ms,
        }
    }

    /// `tick` 16 ms, `beat` 500 ms, `measure` 2000 ms, `phrase` 8000 ms.
    pub fn defaults() -> Vec<TimingBand> {
        vec![
            Self::new("tick", 16.0),
            Self::new("beat", 500.0),
            Self::new("measure", 2000.0),
            Self::new("phrase", 8000.0),
        ]
    }
}

/// Payload handed to band subscribers.
#[derive(Clone, Debug, PartialEq)]
pub struct TimingFire {
    pub name: String,
    /// Frame time at which the band fired.
    pub now_ms: f64,
    /// Time since the bus was started.
    pub elapsed_ms: f64,
}

type SharedCallback = Rc<RefCell<dyn FnMut(&TimingFire)>>;

struct TimingEvent {
    name: String,
    interval_ms: f64,
    last_fired_ms: f64,
    subscribers: BTreeMap<u64, SharedCallback>,
}

#[derive(Default)]
struct BusState {
    events: Vec<TimingEvent>,
    running: bool,
    started_ms: f64,
    next_subscriber: u64,
}

impl BusState {
    fn event(&self, name: &str) -> Option<&TimingEvent> {
        self.events.iter().find(|e| e.name == name)
    }

    fn event_mut(&mut self, name: &str) -> Option<&mut TimingEvent> {
        self.events.iter_mut().find(|e| e.name == name)
    }

    fn is_subscribed(&self, name: &str, id: u64) -> bool {
        self.event(name)
            .is_some_and(|e| e.subscribers.contains_key(&id))
    }
}

/// Named periodic signals multiplexed off one frame driver.
///
/// Registrations outlive [`stop`](Self::stop), so bands are declared once per host and
/// reused across scenes. Each scene must drain its own subscriptions on teardown.
#[derive(Clone)]
pub struct TimingBus {
    inner: Rc<RefCell<BusState>>,
    clock: Clock,
}

impl TimingBus {
    /// Bus with no bands registered.
    pub fn new(clock: &Clock) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusState::default())),
            clock: clock.clone(),
        }
    }

    /// Bus with `bands` registered in order.
    pub fn with_bands(clock: &Clock, bands: &[TimingBand]) -> Self {
        let bus = Self::new(clock);
        for band in bands {
            bus.register(&band.name, band.interval_ms);
        }
        bus
    }

    /// Declare a band. Returns `false` (and changes nothing) if `name` already exists.
    pub fn register(&self, name: &str, interval_ms: f64) -> bool {
        let mut st = self.inner.borrow_mut();
        if st.event(name).is_some() {
            return false;
        }
        let last_fired_ms = self.clock.now_ms();
        st.events.push(TimingEvent {
            name: name.to_owned(),
            interval_ms,
            last_fired_ms,
            subscribers: BTreeMap::new(),
        });
        true
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.borrow().event(name).is_some()
    }

    pub fn interval_ms(&self, name: &str) -> Option<f64> {
        self.inner.borrow().event(name).map(|e| e.interval_ms)
    }

    /// Registered band names in registration order.
    pub fn band_names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .events
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Subscribe to `name`, which must already be registered.
    pub fn on(
        &self,
        name: &str,
        callback: impl FnMut(&TimingFire) + 'static,
    ) -> KineticaResult<Subscription> {
        let mut st = self.inner.borrow_mut();
        let id = st.next_subscriber;
        let event = st
            .event_mut(name)
            .ok_or_else(|| KineticaError::unknown_signal(name))?;
        event
            .subscribers
            .insert(id, Rc::new(RefCell::new(callback)));
        st.next_subscriber += 1;
        Ok(Subscription {
            bus: Rc::downgrade(&self.inner),
            name: name.to_owned(),
            id,
        })
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.inner
            .borrow()
            .event(name)
            .map_or(0, |e| e.subscribers.len())
    }

    /// Start driving; resets every band's last fire to now. No-op while running.
    pub fn start(&self) {
        let now = self.clock.now_ms();
        let mut st = self.inner.borrow_mut();
        if st.running {
            return;
        }
        st.running = true;
        st.started_ms = now;
        for event in &mut st.events {
            event.last_fired_ms = now;
        }
        tracing::debug!(now_ms = now, bands = st.events.len(), "timing bus started");
    }

    /// Stop driving. Registrations and subscribers are kept.
    pub fn stop(&self) {
        let mut st = self.inner.borrow_mut();
        if st.running {
            st.running = false;
            tracing::debug!("timing bus stopped");
        }
    }

    /// Stop and forget every band and subscriber.
    pub fn clear(&self) {
        let mut st = self.inner.borrow_mut();
        st.running = false;
        st.events.clear();
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    /// Fire every band due at `now_ms`; returns how many bands fired.
    ///
    /// A due band fires once even if several intervals passed, and its last fire
    /// becomes `now_ms`. Subscribers removed by an earlier callback in the same pump
    /// are skipped.
    pub fn pump(&self, now_ms: f64) -> usize {
        let batches: Vec<(TimingFire, Vec<(u64, SharedCallback)>)> = {
            let mut st = self.inner.borrow_mut();
            if !st.running {
                return 0;
            }
            let elapsed_ms = now_ms - st.started_ms;
            st.events
                .iter_mut()
                .filter(|e| now_ms - e.last_fired_ms >= e.interval_ms)
                .map(|e| {
                    e.last_fired_ms = now_ms;
                    let fire = TimingFire {
                        name: e.name.clone(),
                        now_ms,
                        elapsed_ms,
                    };
                    let subs = e
                        .subscribers
                        .iter()
                        .map(|(id, cb)| (*id, Rc::clone(cb)))
                        .collect();
                    (fire, subs)
                })
                .collect()
        };

        let fired = batches.len();
        for (fire, subs) in batches {
            for (id, callback) in subs {
                if !self.inner.borrow().is_subscribed(&fire.name, id) {
                    continue;
                }
                (&mut *callback.borrow_mut())(&fire);
            }
        }
        fired
    }
}

impl fmt::Debug for TimingBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.inner.borrow();
        f.debug_struct("TimingBus")
            .field("running", &st.running)
            .field(
                "bands",
                &st.events
                    .iter()
                    .map(|e| (&e.name, e.interval_ms, e.subscribers.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Handle returned by [`TimingBus::on`].
#[must_use = "keep the subscription to be able to unsubscribe"]
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<RefCell<BusState>>,
    name: String,
    id: u64,
}

impl Subscription {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detach the callback. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let mut st = bus.borrow_mut();
        st.event_mut(&self.name)
            .is_some_and(|e| e.subscribers.remove(&self.id).is_some())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/bus.rs"]
mod tests;
