use super::*;

fn clip(secs: f64) -> AudioClip {
    let rate = 100u32;
    let n = (secs * f64::from(rate)).round() as usize;
    AudioClip::new(rate, 1, vec![0.1; n]).unwrap()
}

fn scene(index: u32, secs: f64) -> Scene {
    Scene {
        index,
        narration: format!("scene {index}"),
        image_description: String::new(),
        image: ImageRef::Encoded(Arc::new(vec![1, 2, 3])),
        audio: clip(secs),
    }
}

#[test]
fn story_sorts_scenes_by_index() {
    let story = Story::new(vec![scene(3, 1.0), scene(1, 2.0), scene(2, 0.5)]).unwrap();
    let order: Vec<u32> = story.scenes().iter().map(|s| s.index).collect();
    assert_eq!(order, vec![1, 2, 3]);
    assert!((story.total_duration_secs() - 3.5).abs() < 1e-9);
}

#[test]
fn story_rejects_empty_and_duplicates() {
    assert!(matches!(Story::new(Vec::new()), Err(StoryReelError::Asset(_))));
    assert!(matches!(
        Story::new(vec![scene(1, 1.0), scene(1, 1.0)]),
        Err(StoryReelError::Asset(_))
    ));
}

#[test]
fn zero_duration_clip_is_an_asset_error() {
    let err = Story::new(vec![scene(1, 1.0), scene(2, 0.0)]).unwrap_err();
    assert!(matches!(err, StoryReelError::Asset(_)));
    assert!(err.to_string().contains("scene 2"));
}

#[test]
fn empty_image_is_an_asset_error() {
    let mut s = scene(1, 1.0);
    s.image = ImageRef::Encoded(Arc::new(Vec::new()));
    assert!(matches!(Story::new(vec![s]), Err(StoryReelError::Asset(_))));
}

#[test]
fn audio_clip_rejects_partial_frames() {
    assert!(AudioClip::new(24_000, 2, vec![0.0; 3]).is_err());
    assert!(AudioClip::new(0, 1, vec![0.0; 3]).is_err());
    let c = AudioClip::new(24_000, 2, vec![0.0; 48_000]).unwrap();
    assert_eq!(c.frames(), 24_000);
    assert!((c.duration_secs() - 1.0).abs() < 1e-12);
}

#[test]
fn language_tags_parse_and_display() {
    assert_eq!("gu".parse::<Language>().unwrap(), Language::Gujarati);
    assert_eq!("Hindi".parse::<Language>().unwrap(), Language::Hindi);
    assert!("fr".parse::<Language>().is_err());
    assert_eq!(Language::Hindi.to_string(), "hi");
    let json = serde_json::to_string(&Language::Gujarati).unwrap();
    assert_eq!(json, "\"gu\"");
}

#[test]
fn missing_image_file_is_an_asset_error_at_story_entry() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("1.png");
    std::fs::write(&present, b"png").unwrap();

    let mut s1 = scene(1, 1.0);
    s1.image = ImageRef::Path(present);
    let mut s2 = scene(2, 1.0);
    s2.image = ImageRef::Path(dir.path().join("2.png"));
    let ok = Story::new(vec![s1.clone()]).unwrap();
    assert_eq!(ok.len(), 1);

    let err = Story::new(vec![s1, s2]).unwrap_err();
    assert!(matches!(err, StoryReelError::Asset(ref msg) if msg.starts_with("scene 2")), "{err}");
}
