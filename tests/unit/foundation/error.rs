use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        KineticaError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        KineticaError::lifecycle("x")
            .to_string()
            .contains("lifecycle error:")
    );
    assert!(KineticaError::render("x").to_string().contains("render error:"));
    assert!(KineticaError::encode("x").to_string().contains("encode error:"));
    assert!(
        KineticaError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn unknown_signal_names_the_band() {
    let msg = KineticaError::unknown_signal("beet").to_string();
    assert!(msg.contains("\"beet\""));
    assert!(msg.contains("unknown timing signal"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = KineticaError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
