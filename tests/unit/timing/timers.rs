use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::foundation::clock::ManualClock;

fn timers() -> (Timers, ManualClock) {
    let manual = ManualClock::new(0.0);
    (Timers::new(&manual.clock()), manual)
}

fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&log);
    let make = move |tag: &'static str| -> Box<dyn FnOnce()> {
        let l = Rc::clone(&l);
        Box::new(move || l.borrow_mut().push(tag))
    };
    (log, make)
}

#[test]
fn fires_once_when_due_in_due_order() {
    let (timers, clock) = timers();
    let (log, make) = recorder();
    timers.schedule(300.0, make("late"));
    timers.schedule(100.0, make("early"));
    timers.schedule(100.0, make("early-second"));

    assert_eq!(timers.pump(99.0), 0);
    clock.set(500.0);
    assert_eq!(timers.pump(500.0), 3);
    assert_eq!(*log.borrow(), vec!["early", "early-second", "late"]);

    assert_eq!(timers.pump(10_000.0), 0);
    assert_eq!(timers.pending(), 0);
}

#[test]
fn delay_is_relative_to_the_clock() {
    let (timers, clock) = timers();
    let (log, make) = recorder();
    clock.set(1000.0);
    timers.schedule(50.0, make("x"));
    assert_eq!(timers.pump(1049.0), 0);
    assert_eq!(timers.pump(1050.0), 1);
    assert_eq!(*log.borrow(), vec!["x"]);
}

#[test]
fn cancel_by_scope() {
    let (timers, _clock) = timers();
    let (log, make) = recorder();
    let scope = timers.new_scope();
    let other = timers.new_scope();

    timers.schedule(10.0, make("lone"));
    timers.schedule_in(scope, 10.0, make("scoped-a"));
    timers.schedule_in(scope, 20.0, make("scoped-b"));
    timers.schedule_in(other, 30.0, make("other"));

    assert_eq!(timers.cancel_scope(scope), 2);
    assert_eq!(timers.cancel_scope(scope), 0);
    assert_eq!(timers.pending(), 2);

    timers.pump(100.0);
    assert_eq!(*log.borrow(), vec!["lone", "other"]);
}

#[test]
fn callbacks_scheduled_while_pumping_wait_for_next_pump() {
    let (timers, _clock) = timers();
    let (log, make) = recorder();
    let t = timers.clone();
    let chained = make("chained");
    timers.schedule(0.0, move || {
        t.schedule(0.0, chained);
    });

    assert_eq!(timers.pump(0.0), 1);
    assert!(log.borrow().is_empty());
    assert_eq!(timers.pump(0.0), 1);
    assert_eq!(*log.borrow(), vec!["chained"]);
}

#[test]
fn scheduler_uses_its_scope() {
    let (timers, _clock) = timers();
    let (log, make) = recorder();
    let scheduler = Scheduler::new(&timers, timers.new_scope());
    scheduler.after(5.0, make("a"));
    scheduler.after(6.0, make("b"));
    timers.schedule(7.0, make("free"));

    assert_eq!(scheduler.cancel_all(), 2);
    timers.pump(100.0);
    assert_eq!(*log.borrow(), vec!["free"]);
}
