use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::foundation::clock::ManualClock;
use crate::foundation::color::Color;
use crate::surface::graphic::Graphic;

#[derive(Default)]
struct Probe {
    frames: Rc<Cell<u32>>,
    beats: Rc<Cell<u32>>,
    delayed: Rc<Cell<u32>>,
    destroyed: Rc<Cell<bool>>,
    band: Option<&'static str>,
    events: Rc<RefCell<Vec<&'static str>>>,
}

impl Composition for Probe {
    fn on_setup(&mut self, cx: &mut SceneCx<'_>) -> KineticaResult<()> {
        self.events.borrow_mut().push("setup");
        let frames = Rc::clone(&self.frames);
        cx.add_ticker(move |_| frames.set(frames.get() + 1));

        let beats = Rc::clone(&self.beats);
        cx.on_timing(self.band.unwrap_or("beat"), move |_| {
            beats.set(beats.get() + 1)
        })?;

        let delayed = Rc::clone(&self.delayed);
        cx.scheduler()
            .after(1000.0, move || delayed.set(delayed.get() + 1));
        Ok(())
    }

    fn on_destroy(&mut self) {
        self.events.borrow_mut().push("destroy");
        self.destroyed.set(true);
    }
}

fn host() -> (Host, ManualClock) {
    let manual = ManualClock::new(0.0);
    (
        Host::new(manual.clock(), Canvas::new(64, 64), Color::BLACK),
        manual,
    )
}

#[test]
fn setup_clears_surface_starts_bus_and_registers_callbacks() {
    let (host, clock) = host();
    host.surface().add_child(&Graphic::new());

    let probe = Probe::default();
    let (frames, beats) = (Rc::clone(&probe.frames), Rc::clone(&probe.beats));
    let mut scene = Scene::new("probe", probe);
    scene.setup(&host).unwrap();

    assert!(scene.is_active());
    assert_eq!(host.surface().child_count(), 0);
    assert!(host.timing().is_running());
    assert_eq!(host.driver().ticker_count(), 1);
    assert_eq!(host.timing().subscriber_count("beat"), 1);

    host.step();
    clock.set(500.0);
    host.step();
    assert_eq!(frames.get(), 2);
    assert_eq!(beats.get(), 1);
}

#[test]
fn destroy_detaches_everything_exactly_once() {
    let (host, clock) = host();
    let probe = Probe::default();
    let frames = Rc::clone(&probe.frames);
    let delayed = Rc::clone(&probe.delayed);
    let events = Rc::clone(&probe.events);
    let mut scene = Scene::new("probe", probe);
    scene.setup(&host).unwrap();
    host.surface().add_child(&Graphic::new());

    scene.destroy();
    assert_eq!(scene.state(), SceneState::Destroyed);
    assert_eq!(host.driver().ticker_count(), 0);
    assert_eq!(host.timing().subscriber_count("beat"), 0);
    assert!(!host.timing().is_running());
    assert_eq!(host.surface().child_count(), 0);
    assert_eq!(host.timers().pending(), 0);
    // Bands survive scene teardown.
    assert!(host.timing().is_registered("beat"));

    clock.set(5000.0);
    host.step();
    assert_eq!(frames.get(), 0);
    assert_eq!(delayed.get(), 0);

    scene.destroy();
    assert_eq!(*events.borrow(), vec!["setup", "destroy"]);
}

#[test]
fn setup_is_only_allowed_once() {
    let (host, _clock) = host();
    let mut scene = Scene::new("probe", Probe::default());
    scene.setup(&host).unwrap();
    let err = scene.setup(&host).unwrap_err();
    assert!(matches!(err, KineticaError::Lifecycle(_)));

    scene.destroy();
    assert!(scene.setup(&host).is_err());
}

#[test]
fn failed_setup_tears_down() {
    let (host, _clock) = host();
    let probe = Probe {
        band: Some("bleat"),
        ..Probe::default()
    };
    let destroyed = Rc::clone(&probe.destroyed);
    let mut scene = Scene::new("probe", probe);

    let err = scene.setup(&host).unwrap_err();
    assert!(matches!(err, KineticaError::UnknownSignal(ref n) if n == "bleat"));
    assert_eq!(scene.state(), SceneState::Destroyed);
    assert_eq!(host.driver().ticker_count(), 0);
    assert!(!host.timing().is_running());
    assert!(destroyed.get());
}

#[test]
fn destroying_an_uninitialized_scene_skips_teardown_hook() {
    let probe = Probe::default();
    let destroyed = Rc::clone(&probe.destroyed);
    let mut scene = Scene::new("probe", probe);
    scene.destroy();
    assert_eq!(scene.state(), SceneState::Destroyed);
    assert!(!destroyed.get());
}

#[test]
fn dropping_an_active_scene_destroys_it() {
    let (host, _clock) = host();
    let probe = Probe::default();
    let destroyed = Rc::clone(&probe.destroyed);
    {
        let mut scene = Scene::new("probe", probe);
        scene.setup(&host).unwrap();
    }
    assert!(destroyed.get());
    assert_eq!(host.driver().ticker_count(), 0);
}

#[test]
fn delayed_callbacks_fire_while_active() {
    let (host, clock) = host();
    let probe = Probe::default();
    let delayed = Rc::clone(&probe.delayed);
    let mut scene = Scene::new("probe", probe);
    scene.setup(&host).unwrap();

    clock.set(1000.0);
    host.step();
    assert_eq!(delayed.get(), 1);
}
