use rand::SeedableRng;

use super::*;
use crate::foundation::clock::ManualClock;
use crate::runtime::host::Host;
use crate::scene::lifecycle::Scene;
use crate::timing::timers::Timers;

fn grid(canvas: Canvas) -> (HexState, Surface, ManualClock) {
    let manual = ManualClock::new(0.0);
    let surface = Surface::new(canvas, Color(0x1a1a2e));
    let mut state = HexState::new(
        HexGridConfig::default(),
        &surface,
        &manual.clock(),
        SmallRng::seed_from_u64(1),
    );
    state.build(canvas);
    (state, surface, manual)
}

fn glow_count(state: &HexState) -> usize {
    state
        .cells()
        .iter()
        .filter(|c| {
            state.arena()[c.id]
                .find_decorator(DecoratorKind::Glow)
                .is_some()
        })
        .count()
}

#[test]
fn tiles_canvas_with_margin() {
    let (state, surface, _clock) = grid(Canvas::new(1280, 720));
    // ceil(1280 / 173.2) + 2 columns, ceil(720 / 150) + 2 rows.
    assert_eq!(state.cells().len(), 10 * 7);
    assert_eq!(surface.child_count(), 70);

    let cell = state.cells()[10 + 1];
    assert_eq!((cell.col, cell.row), (1, 1));
    let hex_w = 3f64.sqrt() * 100.0;
    let pos = state.arena()[cell.id].position;
    assert!((pos.x - (hex_w + hex_w / 2.0)).abs() < 1e-9);
    assert!((pos.y - 150.0).abs() < 1e-9);
    assert_eq!(state.arena()[cell.id].bounding_radius(), 99.0);
}

#[test]
fn initial_fill_and_border() {
    let (state, _surface, _clock) = grid(Canvas::new(400, 300));
    for cell in state.cells() {
        let ctx = state.arena()[cell.id].compute_context();
        assert_eq!(ctx.fill, PALETTE[((cell.col + cell.row) as usize) % 5]);
        assert_eq!(ctx.stroke, Some(Color(0x111122)));
        assert_eq!(ctx.stroke_width, 1.0);
    }
}

#[test]
fn wave_color_interpolates_and_wraps() {
    assert_eq!(HexState::wave_color(0, 0, 0.0), PALETTE[0]);
    assert_eq!(HexState::wave_color(0, 0, 1.0), PALETTE[1]);
    assert_eq!(
        HexState::wave_color(1, 0, 0.0),
        PALETTE[0].lerp(PALETTE[1], 0.3)
    );
    assert_eq!(HexState::wave_color(0, 0, 4.5), PALETTE[4].lerp(PALETTE[0], 0.5));
    assert_eq!(HexState::wave_color(2, 3, 5.0), HexState::wave_color(2, 3, 0.0));
}

#[test]
fn step_advances_wave_and_drops_fill_overrides() {
    let (mut state, _surface, _clock) = grid(Canvas::new(400, 300));
    let first = state.cells()[0];
    state
        .arena
        .get_mut(first.id)
        .unwrap()
        .add_decorator(Decorator::fill(Color::WHITE));

    state.step(0.0);
    assert_eq!(state.time(), 0.0);
    assert!(state.arena()[first.id].find_decorator(DecoratorKind::Fill).is_none());

    state.step(50.0);
    assert!((state.time() - 1.0).abs() < 1e-12);
    for cell in state.cells() {
        assert_eq!(
            state.arena()[cell.id].compute_context().fill,
            HexState::wave_color(cell.col, cell.row, state.time())
        );
    }
}

#[test]
fn beat_glow_fades_and_is_pruned() {
    let (mut state, _surface, clock) = grid(Canvas::new(400, 300));
    let cell = state.on_beat().unwrap();
    let ctx = state.arena()[cell.id].compute_context();
    assert_eq!(ctx.stroke, Some(GLOW_WHITE));
    assert_eq!(ctx.stroke_width, 4.0);

    clock.set(499.0);
    state.step(1.0);
    assert_eq!(glow_count(&state), 1);

    clock.set(500.0);
    state.step(1.0);
    assert_eq!(glow_count(&state), 0);
    // The border shows through again.
    let ctx = state.arena()[cell.id].compute_context();
    assert_eq!(ctx.stroke, Some(Color(0x111122)));
}

#[test]
fn ripple_targets_are_within_radius_with_distance_delay() {
    let (state, _surface, _clock) = grid(Canvas::new(1280, 720));
    let center = state.cells()[3 * 10 + 4].id;
    let origin = state.arena()[center].position;
    let targets = state.ripple_targets(center);

    assert!(targets.contains(&(center, 0.0)));
    assert!(targets.len() > 1);
    for (id, delay) in &targets {
        let dist = state.arena()[*id].position.distance(origin);
        assert!(dist <= 300.0);
        assert!((delay - dist * 2.0).abs() < 1e-9);
    }
    let outside = state
        .cells()
        .iter()
        .filter(|c| state.arena()[c.id].position.distance(origin) > 300.0)
        .count();
    assert_eq!(targets.len() + outside, state.cells().len());
}

#[test]
fn ripple_glows_arrive_after_their_delay() {
    let (state, _surface, clock) = grid(Canvas::new(1280, 720));
    let timers = Timers::new(&clock.clock());
    let scheduler = Scheduler::new(&timers, timers.new_scope());
    let state = Rc::new(RefCell::new(state));

    let scheduled = ripple(&state, &scheduler);
    assert!(scheduled > 0);
    assert_eq!(timers.pending(), scheduled);

    // The center lights up immediately, the rest within radius * 2 ms.
    assert_eq!(timers.pump(0.0), 1);
    assert_eq!(glow_count(&state.borrow()), 1);

    clock.set(600.0);
    timers.pump(600.0);
    assert_eq!(timers.pending(), 0);
    assert_eq!(glow_count(&state.borrow()), scheduled);
    let st = state.borrow();
    for cell in st.cells() {
        if let Some((_, Decorator::Glow(glow))) = st.arena()[cell.id].find_decorator(DecoratorKind::Glow) {
            assert_eq!(glow.color, GLOW_TEAL);
            assert_eq!(glow.intensity, 3.0);
            assert_eq!(glow.fade_ms(), Some(400.0));
        }
    }
}

#[test]
fn stale_ripple_callbacks_are_harmless() {
    let (state, _surface, clock) = grid(Canvas::new(640, 480));
    let timers = Timers::new(&clock.clock());
    let scheduler = Scheduler::new(&timers, timers.new_scope());
    let state = Rc::new(RefCell::new(state));
    let scheduled = ripple(&state, &scheduler);

    state.borrow_mut().destroy();
    drop(state);
    assert_eq!(timers.pump(1.0e6), scheduled);
}

#[test]
fn scene_cancels_pending_ripples_on_teardown() {
    let manual = ManualClock::new(0.0);
    let host = Host::new(manual.clock(), Canvas::new(640, 480), Color(0x1a1a2e));
    let mut scene = Scene::new("hexagon-grid", HexagonGrid::new(HexGridConfig::default()));
    scene.setup(&host).unwrap();

    host.step();
    manual.set(2000.0);
    host.step();
    assert!(host.timers().pending() > 0);

    scene.destroy();
    assert_eq!(host.timers().pending(), 0);
    assert_eq!(host.surface().child_count(), 0);
    assert_eq!(host.timing().subscriber_count("measure"), 0);
}
