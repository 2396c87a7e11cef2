use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::foundation::clock::Clock;

/// Handle for cancelling one delayed callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Group of delayed callbacks cancelled together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerScope(u64);

struct Pending {
    id: TimerId,
    scope: Option<TimerScope>,
    due_ms: f64,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct TimersState {
    pending: Vec<Pending>,
    next_id: u64,
    next_scope: u64,
}

/// Fire-once delayed callbacks, independent of the frame driver.
#[derive(Clone)]
pub struct Timers {
    inner: Rc<RefCell<TimersState>>,
    clock: Clock,
}

impl Timers {
    pub fn new(clock: &Clock) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TimersState::default())),
            clock: clock.clone(),
        }
    }

    /// Run `callback` once, `delay_ms` from now.
    pub fn schedule(&self, delay_ms: f64, callback: impl FnOnce() + 'static) -> TimerId {
        self.push(None, delay_ms, Box::new(callback))
    }

    /// Like [`schedule`](Self::schedule), cancelled along with `scope`.
    pub fn schedule_in(
        &self,
        scope: TimerScope,
        delay_ms: f64,
        callback: impl FnOnce() + 'static,
    ) -> TimerId {
        self.push(Some(scope), delay_ms, Box::new(callback))
    }

    fn push(
        &self,
        scope: Option<TimerScope>,
        delay_ms: f64,
        callback: Box<dyn FnOnce()>,
    ) -> TimerId {
        let due_ms = self.clock.now_ms() + delay_ms.max(0.0);
        let mut st = self.inner.borrow_mut();
        let id = TimerId(st.next_id);
        st.next_id += 1;
        st.pending.push(Pending {
            id,
            scope,
            due_ms,
            callback,
        });
        id
    }

    pub fn new_scope(&self) -> TimerScope {
        let mut st = self.inner.borrow_mut();
        let scope = TimerScope(st.next_scope);
        st.next_scope += 1;
        scope
    }

    /// Cancel everything still pending in `scope`; returns how many were dropped.
    pub fn cancel_scope(&self, scope: TimerScope) -> usize {
        let mut st = self.inner.borrow_mut();
        let before = st.pending.len();
        st.pending.retain(|p| p.scope != Some(scope));
        before - st.pending.len()
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Run every callback due by `now_ms`, earliest first; returns how many ran.
    ///
    /// Callbacks scheduled from inside a callback wait for the next pump.
    pub fn pump(&self, now_ms: f64) -> usize {
        let mut due: Vec<Pending> = {
            let mut st = self.inner.borrow_mut();
            let (due, rest): (Vec<Pending>, Vec<Pending>) = std::mem::take(&mut st.pending)
                .into_iter()
                .partition(|p| p.due_ms <= now_ms);
            st.pending = rest;
            due
        };
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)));

        let ran = due.len();
        for p in due {
            (p.callback)();
        }
        ran
    }
}

impl fmt::Debug for Timers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timers")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Schedules into one fixed [`TimerScope`].
#[derive(Clone, Debug)]
pub struct Scheduler {
    timers: Timers,
    scope: TimerScope,
}

impl Scheduler {
    pub fn new(timers: &Timers, scope: TimerScope) -> Self {
        Self {
            timers: timers.clone(),
            scope,
        }
    }

    pub fn scope(&self) -> TimerScope {
        self.scope
    }

    pub fn after(&self, delay_ms: f64, callback: impl FnOnce() + 'static) -> TimerId {
        self.timers.schedule_in(self.scope, delay_ms, callback)
    }

    pub fn cancel_all(&self) -> usize {
        self.timers.cancel_scope(self.scope)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/timers.rs"]
mod tests;
