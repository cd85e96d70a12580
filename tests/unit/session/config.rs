use super::*;

#[test]
fn defaults_match_the_browser_exporter() {
    let c = ExportConfig::default();
    assert_eq!(c.canvas(), Canvas { width: 1280, height: 720 });
    assert_eq!(c.fps, Fps::new(30, 1).unwrap());
    assert_eq!(c.zoom, 1.15);
    assert_eq!(c.pan_fraction, 0.1);
    assert_eq!(c.background_rgba, [0, 0, 0, 255]);
    assert_eq!(c.timeline_opts(), TimelineOpts { sample_rate: 44_100, channels: 1 });
    assert_eq!(c.container, Container::WebM);
    assert!(!c.realtime);
    c.validate().unwrap();
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let c: ExportConfig =
        serde_json::from_str(r#"{ "width": 640, "height": 360, "container": "mp4" }"#).unwrap();
    assert_eq!(c.canvas(), Canvas { width: 640, height: 360 });
    assert_eq!(c.container, Container::Mp4);
    assert_eq!(c.zoom, 1.15);
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<ExportConfig>(r#"{ "widht": 640 }"#).is_err());
}

#[test]
fn validate_rejects_each_bad_setting() {
    let bad = [
        ExportConfig { width: 0, ..Default::default() },
        ExportConfig { height: 721, ..Default::default() },
        ExportConfig { width: 70_000, ..Default::default() },
        ExportConfig { fps: Fps { num: 0, den: 1 }, ..Default::default() },
        ExportConfig { zoom: 1.0, ..Default::default() },
        ExportConfig { pan_fraction: -0.1, ..Default::default() },
        ExportConfig { audio_sample_rate: 0, ..Default::default() },
        ExportConfig { audio_channels: 0, ..Default::default() },
        ExportConfig { channel_capacity: 0, ..Default::default() },
    ];
    for c in bad {
        assert!(
            matches!(c.validate(), Err(StoryReelError::Validation(_))),
            "{c:?}"
        );
    }
}

#[test]
fn reads_config_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{ "fps": { "num": 24, "den": 1 }, "realtime": true }"#).unwrap();
    let c = ExportConfig::from_json_file(&path).unwrap();
    assert_eq!(c.fps.num, 24);
    assert!(c.realtime);

    std::fs::write(&path, "not json").unwrap();
    assert!(ExportConfig::from_json_file(&path).is_err());
}
