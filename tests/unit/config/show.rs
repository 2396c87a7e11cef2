use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = ShowConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, ShowConfig::default());
    assert_eq!(cfg.canvas, Canvas::new(1280, 720));
    assert_eq!(cfg.fps, Fps { num: 60, den: 1 });
    assert_eq!(cfg.background, Color(0x1a1a2e));
    assert_eq!(cfg.auto_advance_ms, 5000.0);
    let names: Vec<_> = cfg.timing.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["tick", "beat", "measure", "phrase"]);
    cfg.validate().unwrap();
}

#[test]
fn partial_override() {
    let cfg = ShowConfig::from_json_str(
        r##"{
            "canvas": {"width": 320, "height": 240},
            "seed": 7,
            "background": "#000",
            "timing": [{"name": "beat", "interval_ms": 250}]
        }"##,
    )
    .unwrap();
    assert_eq!(cfg.canvas, Canvas::new(320, 240));
    assert_eq!(cfg.seed, 7);
    assert_eq!(cfg.background, Color::BLACK);
    assert_eq!(cfg.timing, vec![TimingBand::new("beat", 250.0)]);
    assert_eq!(cfg.fps, Fps::default());
    cfg.validate().unwrap();
}

#[test]
fn unknown_fields_are_rejected() {
    let err = ShowConfig::from_json_str(r#"{"sede": 1}"#).unwrap_err();
    assert!(err.to_string().starts_with("serialization error:"));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = ShowConfig::from_json_str("{").unwrap_err();
    assert!(matches!(err, KineticaError::Serde(_)));
}

#[test]
fn validation_catches_bad_values() {
    let mut cfg = ShowConfig::default();
    cfg.canvas = Canvas::new(0, 10);
    assert!(matches!(cfg.validate(), Err(KineticaError::Validation(_))));

    let mut cfg = ShowConfig::default();
    cfg.fps = Fps { num: 30, den: 0 };
    assert!(cfg.validate().is_err());

    let mut cfg = ShowConfig::default();
    cfg.timing.push(TimingBand::new("beat", 100.0));
    assert!(cfg.validate().is_err());

    let mut cfg = ShowConfig::default();
    cfg.timing[0].interval_ms = f64::NAN;
    assert!(cfg.validate().is_err());

    let mut cfg = ShowConfig::default();
    cfg.auto_advance_ms = -1.0;
    assert!(cfg.validate().is_err());

    let mut cfg = ShowConfig::default();
    cfg.auto_advance_ms = 0.0;
    cfg.validate().unwrap();
}

#[test]
fn round_trips_through_json() {
    let mut cfg = ShowConfig::default();
    cfg.seed = 42;
    cfg.hex_grid.cell_radius = 50.0;
    let json = cfg.to_json_pretty().unwrap();
    assert!(json.contains("\"#1a1a2e\""));
    assert_eq!(ShowConfig::from_json_str(&json).unwrap(), cfg);
}

#[test]
fn from_path_reports_missing_file() {
    let err = ShowConfig::from_path("/nonexistent/kinetica/show.json").unwrap_err();
    assert!(matches!(err, KineticaError::Other(_)));
    assert!(err.to_string().contains("open show config"));
}
