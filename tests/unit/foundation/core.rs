use super::*;

#[test]
fn fps_frame_timing() {
    let fps = Fps::new(60, 1).unwrap();
    assert!((fps.frame_duration_ms() - 1000.0 / 60.0).abs() < 1e-9);
    assert!((fps.frame_start_ms(FrameIndex(60)) - 1000.0).abs() < 1e-9);

    let fps = Fps::new(25, 1).unwrap();
    assert_eq!(fps.frame_start_ms(FrameIndex(3)), 120.0);
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn canvas_validation_bounds() {
    assert!(Canvas::new(64, 64).validate().is_ok());
    assert!(Canvas::new(0, 64).validate().is_err());
    assert!(Canvas::new(70_000, 64).validate().is_err());
}
