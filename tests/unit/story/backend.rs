use super::*;

#[test]
fn image_prompt_prepends_a_trimmed_character() {
    assert_eq!(
        image_prompt(Some("  brave mouse with a red cap "), "A mouse crosses a river."),
        "The main character is a brave mouse with a red cap. A mouse crosses a river."
    );
    assert_eq!(image_prompt(Some("   "), "A forest."), "A forest.");
    assert_eq!(image_prompt(None, "A forest."), "A forest.");
}

#[test]
fn empty_prompt_is_rejected() {
    let req = GenerationRequest::new("   ", Language::Gujarati);
    assert!(matches!(req.validate(), Err(StoryReelError::Validation(_))));
}

#[test]
fn manifest_backend_serves_the_manifest_story() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1.pcm"), vec![0u8; 24_000 * 2]).unwrap();
    std::fs::write(dir.path().join("1.png"), b"png").unwrap();
    let manifest = dir.path().join("story.json");
    std::fs::write(
        &manifest,
        r#"{ "language": "gu", "scenes": [
            { "scene": 1, "narration": "x", "image": "1.png", "audio": { "pcm16": "1.pcm" } }
        ] }"#,
    )
    .unwrap();

    let backend = ManifestBackend::new(&manifest);
    let req = GenerationRequest::new("a brave mouse", Language::Gujarati).with_character("mouse");
    let story = backend.generate(&req).unwrap();
    assert_eq!(story.len(), 1);
    assert!((story.total_duration_secs() - 1.0).abs() < 1e-9);
}

#[test]
fn manifest_backend_fails_whole_on_a_missing_manifest() {
    let backend = ManifestBackend::new("/no/such/story.json");
    let req = GenerationRequest::new("idea", Language::Hindi);
    assert!(backend.generate(&req).is_err());
}
