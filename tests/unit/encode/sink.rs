use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "kinetica_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::default(),
        background: Color(0x1a1a2e),
    }
}

fn solid(width: u32, height: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(2, 2, [1, 2, 3, 255])).unwrap();
    sink.push_frame(FrameIndex(1), &solid(2, 2, [4, 5, 6, 255])).unwrap();
    sink.end().unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.config().unwrap().width, 2);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, [0, 1]);

    // A second run starts clean.
    sink.begin(cfg(2, 2)).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_ended());
}

#[test]
fn png_sequence_names_and_contents() {
    let dir = temp_dir("png_sequence");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(3, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &solid(3, 2, [10, 20, 30, 255])).unwrap();
    sink.push_frame(FrameIndex(7), &solid(3, 2, [64, 0, 0, 128])).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.written().len(), 2);
    assert!(dir.join("frame_00000.png").exists());
    assert!(dir.join("frame_00007.png").exists());

    let img = image::open(dir.join("frame_00007.png")).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(1, 1).0, [128, 0, 0, 128]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn png_sequence_requires_begin() {
    let mut sink = PngSequenceSink::new(temp_dir("png_unstarted"));
    let err = sink
        .push_frame(FrameIndex(0), &solid(1, 1, [0, 0, 0, 255]))
        .unwrap_err();
    assert!(matches!(err, KineticaError::Encode(_)));
    assert!(sink.begin(cfg(0, 4)).is_err());
}

#[test]
fn file_names_are_zero_padded() {
    assert_eq!(PngSequenceSink::file_name(FrameIndex(42)), "frame_00042.png");
    assert_eq!(PngSequenceSink::file_name(FrameIndex(123456)), "frame_123456.png");
}
