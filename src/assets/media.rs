use std::path::Path;

use crate::foundation::error::{ReelResult, StoryReelError};
use crate::story::model::AudioClip;

/// Decode any ffmpeg-readable audio file to interleaved `f32` PCM at `sample_rate`/`channels`.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_audio_file(path: &Path, sample_rate: u32, channels: u16) -> ReelResult<AudioClip> {
    if sample_rate == 0 || channels == 0 {
        return Err(StoryReelError::validation(
            "audio decode sample rate/channels must be non-zero",
        ));
    }

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &channels.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| StoryReelError::asset(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(StoryReelError::asset(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(StoryReelError::asset(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let pcm = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    AudioClip::new(sample_rate, channels, pcm)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode any ffmpeg-readable audio file to interleaved `f32` PCM at `sample_rate`/`channels`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_audio_file(path: &Path, _sample_rate: u32, _channels: u16) -> ReelResult<AudioClip> {
    Err(StoryReelError::asset(format!(
        "decoding '{}' requires the 'media-ffmpeg' feature",
        path.display()
    )))
}
