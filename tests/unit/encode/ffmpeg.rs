use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]);
    assert_eq!(dst, src);
}

#[test]
fn container_mime_and_extension() {
    assert_eq!(Container::default(), Container::WebM);
    assert_eq!(Container::WebM.mime_type(), "video/webm");
    assert_eq!(Container::Mp4.mime_type(), "video/mp4");
    assert_eq!("MP4".parse::<Container>().unwrap(), Container::Mp4);
    assert_eq!("webm".parse::<Container>().unwrap().extension(), "webm");
    assert!("avi".parse::<Container>().is_err());
}

#[test]
fn odd_dimensions_fail_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let err = sink
        .arm(CaptureConfig {
            width: 15,
            height: 8,
            fps: Fps::new(30, 1).unwrap(),
            audio: None,
        })
        .unwrap_err();
    assert!(matches!(err, StoryReelError::CaptureInit(_)));
}

#[test]
fn push_and_finish_require_arm() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.finish().is_err());
    // Abort on an idle sink is a no-op.
    sink.abort();
}

fn command_args(container: Container, with_audio: bool) -> Vec<String> {
    let sink = FfmpegSink::new(FfmpegSinkOpts {
        container,
        ..FfmpegSinkOpts::default()
    });
    let cfg = CaptureConfig {
        width: 64,
        height: 36,
        fps: Fps::new(30, 1).unwrap(),
        audio: with_audio.then(|| crate::encode::sink::AudioInputConfig {
            path: "/tmp/track.f32le".into(),
            sample_rate: 44_100,
            channels: 1,
        }),
    };
    let cmd = sink.build_command(&cfg).unwrap();
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
    args.windows(2).any(|w| w[0] == flag && w[1] == value)
}

#[test]
fn webm_command_uses_vp9_and_48k_opus() {
    let args = command_args(Container::WebM, true);
    assert!(has_pair(&args, "-c:v", "libvpx-vp9"));
    assert!(has_pair(&args, "-c:a", "libopus"));
    assert!(has_pair(&args, "-ar", "48000"));
    assert!(has_pair(&args, "-f", "webm"));
    assert!(has_pair(&args, "-f", "f32le"));
    assert!(has_pair(&args, "-ar", "44100"));
    assert!(!args.iter().any(|a| a == "-shortest"));
    assert_eq!(args.last().map(String::as_str), Some("pipe:1"));

    // Frame rate applies to the raw video input, so it comes before the first `-i`.
    let rate = args.iter().position(|a| a == "-r").unwrap();
    let input = args.iter().position(|a| a == "-i").unwrap();
    assert!(rate < input);
    assert_eq!(args[input + 1], "pipe:0");
}

#[test]
fn mp4_command_is_fragmented_h264_with_aac() {
    let args = command_args(Container::Mp4, true);
    assert!(has_pair(&args, "-c:v", "libx264"));
    assert!(has_pair(&args, "-c:a", "aac"));
    assert!(has_pair(&args, "-movflags", "frag_keyframe+empty_moov"));
    assert!(has_pair(&args, "-f", "mp4"));
    assert!(has_pair(&args, "-pix_fmt", "yuv420p"));
}

#[test]
fn silent_capture_disables_the_audio_stream() {
    for container in [Container::WebM, Container::Mp4] {
        let args = command_args(container, false);
        assert!(args.iter().any(|a| a == "-an"), "{container}");
        assert!(!args.iter().any(|a| a == "f32le"), "{container}");
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
    }
}

#[cfg(feature = "media-ffmpeg")]
#[test]
fn encodes_webm_with_audio_to_memory() {
    if !is_ffmpeg_on_path() {
        eprintln!("skipping: ffmpeg not on PATH");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let audio_path = dir.path().join("a.f32le");
    let samples: Vec<u8> = (0..44_100)
        .flat_map(|i| ((i as f32 * 0.05).sin() * 0.2).to_le_bytes())
        .collect();
    std::fs::write(&audio_path, samples).unwrap();

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    sink.arm(CaptureConfig {
        width: 32,
        height: 18,
        fps: Fps::new(10, 1).unwrap(),
        audio: Some(crate::encode::sink::AudioInputConfig {
            path: audio_path,
            sample_rate: 44_100,
            channels: 1,
        }),
    })
    .unwrap();
    for i in 0..10u8 {
        let frame = FrameRGBA {
            width: 32,
            height: 18,
            data: vec![i * 20; 32 * 18 * 4],
            premultiplied: true,
        };
        sink.push_frame(FrameIndex(u64::from(i)), &frame).unwrap();
    }
    let out = sink.finish().unwrap();
    assert_eq!(out.mime_type, "video/webm");
    let bytes = out.into_bytes();
    // EBML magic.
    assert_eq!(&bytes[..4], &[0x1A, 0x45, 0xDF, 0xA3]);
}
