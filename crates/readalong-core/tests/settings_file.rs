//! Settings loaded from disk the way the CLI does it.

use std::io::Write;

use readalong_core::{PlaybackSettings, SettingsError, validate_settings};

fn load(contents: &str) -> PlaybackSettings {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    let raw = std::fs::read_to_string(file.path()).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn full_settings_file_round_trips() {
    let settings = load(
        r#"{
            "rate": 0.8,
            "voiceName": "Samantha",
            "msPerToken": 200,
            "singleWordRateFloor": 0.7,
            "singleWordRateScale": 0.9,
            "restartSettleMs": 80,
            "debugOverlay": true,
            "constrainedPlatform": true
        }"#,
    );

    assert!(validate_settings(&settings).is_ok());
    assert_eq!(settings.voice_name.as_deref(), Some("Samantha"));
    assert_eq!(settings.ms_per_token, 200);
    assert_eq!(settings.restart_settle_ms, 80);
    assert_eq!(settings.constrained_platform, Some(true));

    let json = serde_json::to_string(&settings).unwrap();
    let back: PlaybackSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn empty_file_object_is_defaults() {
    assert_eq!(load("{}"), PlaybackSettings::default());
}

#[test]
fn out_of_range_file_values_fail_validation() {
    let settings = load(r#"{"singleWordRateScale": 1.5}"#);
    assert_eq!(
        validate_settings(&settings),
        Err(SettingsError::InvalidSingleWordScale(1.5))
    );
}
