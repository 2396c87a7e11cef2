use super::*;
use crate::encode::sink::{InMemorySink, PngSequenceSink};
use crate::foundation::core::Canvas;
use crate::scene::lifecycle::{Composition, Scene, SceneCx};
use crate::scene::registry::SceneEntry;
use crate::foundation::color::Color;
use crate::scenes::bouncing::BouncingConfig;

fn small_config() -> ShowConfig {
    ShowConfig {
        canvas: Canvas::new(64, 48),
        seed: 7,
        bouncing: BouncingConfig {
            circles: 4,
            rectangles: 4,
            triangles: 2,
            proximity_threshold: 24.0,
            ..BouncingConfig::default()
        },
        ..ShowConfig::default()
    }
}

#[test]
fn play_pushes_every_frame_and_tears_down() {
    let mut player = Player::new(&small_config()).unwrap();
    let mut sink = InMemorySink::new();
    let stats = player.play("bouncing-shapes", 5, &mut sink).unwrap();

    assert_eq!(stats.frames_rendered, 5);
    assert!(stats.final_children >= 10);
    assert!((stats.duration_ms - 4.0 * 1000.0 / 60.0).abs() < 1e-9);

    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (64, 48));
    assert_eq!(cfg.background, Color(0x1a1a2e));
    assert!(sink.is_ended());
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, [0, 1, 2, 3, 4]);
    for (_, frame) in sink.frames() {
        assert_eq!(frame.data.len(), 64 * 48 * 4);
        assert!(frame.premultiplied);
    }

    assert_eq!(player.navigator().route(), &Route::Selection);
    assert!(player.navigator().active_scene().is_none());
    assert_eq!(player.host().surface().child_count(), 0);
    assert_eq!(player.host().driver().ticker_count(), 0);
}

#[test]
fn same_seed_same_frames() {
    let run = || {
        let mut player = Player::new(&small_config()).unwrap();
        let mut sink = InMemorySink::new();
        player.play("hexagon-grid", 12, &mut sink).unwrap();
        sink.into_frames()
    };
    assert_eq!(run(), run());
}

#[test]
fn render_frame_matches_played_frame() {
    let mut sink = InMemorySink::new();
    Player::new(&small_config())
        .unwrap()
        .play("bouncing-shapes", 10, &mut sink)
        .unwrap();

    let single = Player::new(&small_config())
        .unwrap()
        .render_frame("bouncing-shapes", FrameIndex(9))
        .unwrap();
    assert_eq!(sink.frames()[9].1, single);
}

#[test]
fn unknown_scene_and_zero_frames_are_rejected() {
    let mut player = Player::new(&small_config()).unwrap();
    let mut sink = InMemorySink::new();
    assert!(matches!(
        player.play("nope", 3, &mut sink),
        Err(KineticaError::Validation(_))
    ));
    assert!(matches!(
        player.play("hexagon-grid", 0, &mut sink),
        Err(KineticaError::Validation(_))
    ));
    assert!(player.navigator().active_scene().is_none());
}

#[test]
fn unknown_scene_leaves_the_sink_untouched() {
    let mut player = Player::new(&small_config()).unwrap();

    let mut sink = InMemorySink::new();
    player.play("no-such-scene", 3, &mut sink).unwrap_err();
    assert!(sink.config().is_none());
    assert!(!sink.is_ended());

    let dir = std::env::temp_dir().join(format!(
        "kinetica_unknown_scene_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    let mut pngs = PngSequenceSink::new(&dir);
    player.play("no-such-scene", 3, &mut pngs).unwrap_err();
    assert!(!dir.exists());
}

#[test]
fn render_frame_rejects_the_last_index() {
    let mut player = Player::new(&small_config()).unwrap();
    let err = player
        .render_frame("bouncing-shapes", FrameIndex(u64::MAX))
        .unwrap_err();
    assert!(matches!(err, KineticaError::Validation(_)));
    assert!(player.navigator().active_scene().is_none());
}

#[test]
fn invalid_config_is_rejected() {
    let config = ShowConfig {
        canvas: Canvas::new(0, 10),
        ..ShowConfig::default()
    };
    assert!(Player::new(&config).is_err());
}

struct Failing;

impl Composition for Failing {
    fn on_setup(&mut self, _cx: &mut SceneCx<'_>) -> KineticaResult<()> {
        Err(KineticaError::validation("broken scene"))
    }
}

#[test]
fn failed_setup_surfaces_the_error() {
    let mut registry = SceneRegistry::new();
    registry.register(SceneEntry::new(
        "broken",
        "Broken",
        "fails in setup",
        Color::WHITE,
        || Scene::new("broken", Failing),
    ));
    let mut player = Player::with_registry(&small_config(), registry).unwrap();
    let mut sink = InMemorySink::new();
    let err = player.play("broken", 2, &mut sink).unwrap_err();
    assert!(err.to_string().contains("broken scene"));
    assert!(sink.frames().is_empty());
    assert!(sink.is_ended());
}
