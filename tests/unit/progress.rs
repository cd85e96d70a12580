use super::*;

#[test]
fn scene_messages_are_localized_and_one_based() {
    let stage = ProgressStage::Scene { index: 2, total: 5 };
    assert_eq!(
        stage.message(Language::Gujarati),
        "દ્રશ્ય 2/5 બનાવી રહ્યું છે..."
    );
    assert_eq!(
        stage.message(Language::Hindi),
        "दृश्य 2/5 प्रस्तुत किया जा रहा है..."
    );
    assert_eq!(stage.message(Language::English), "Rendering scene 2/5...");
}

#[test]
fn percent_is_monotonic_across_an_export() {
    let total = 4;
    let mut stages = vec![
        ProgressStage::AudioBuild,
        ProgressStage::CaptureSetup,
        ProgressStage::Scenes,
    ];
    stages.extend((1..=total).map(|index| ProgressStage::Scene { index, total }));
    stages.push(ProgressStage::Finalize);

    let pcts: Vec<u8> = stages.iter().map(|s| s.percent()).collect();
    assert!(pcts.windows(2).all(|w| w[0] <= w[1]), "{pcts:?}");
    assert_eq!(pcts[0], 0);
    assert_eq!(*pcts.last().unwrap(), 95);
}

#[test]
fn channel_reporter_survives_a_dropped_receiver() {
    let (reporter, rx) = ChannelReporter::pair();
    reporter.report(ProgressEvent::new(ProgressStage::AudioBuild, Language::Hindi));
    let ev = rx.recv().unwrap();
    assert_eq!(ev.stage, ProgressStage::AudioBuild);
    assert_eq!(ev.percent, 0);
    drop(rx);
    reporter.report(ProgressEvent::new(ProgressStage::Finalize, Language::Hindi));
}

#[test]
fn closures_are_reporters() {
    let seen = std::sync::Mutex::new(Vec::new());
    let reporter = |ev: ProgressEvent| seen.lock().unwrap().push(ev.stage);
    reporter.report(ProgressEvent::new(ProgressStage::Scenes, Language::English));
    NullReporter.report(ProgressEvent::new(ProgressStage::Scenes, Language::English));
    assert_eq!(*seen.lock().unwrap(), vec![ProgressStage::Scenes]);
}

#[test]
fn events_serialize_with_a_flat_stage_tag() {
    let ev = ProgressEvent::new(ProgressStage::Scene { index: 1, total: 2 }, Language::English);
    let v = serde_json::to_value(&ev).unwrap();
    assert_eq!(v["stage"], "scene");
    assert_eq!(v["index"], 1);
    assert_eq!(v["percent"], 10);
}
