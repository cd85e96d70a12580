use std::path::Path;

use crate::foundation::error::{ReelResult, StoryReelError};
use crate::story::model::{AudioClip, Story};

/// Default master sample rate, matching the offline render of the browser player.
pub const MASTER_SAMPLE_RATE: u32 = 44_100;

/// Output format of the master track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimelineOpts {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for TimelineOpts {
    fn default() -> Self {
        Self {
            sample_rate: MASTER_SAMPLE_RATE,
            channels: 1,
        }
    }
}

/// Half-open `[start, end)` range in master sample frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SampleSpan {
    pub start: u64,
    pub end: u64,
}

impl SampleSpan {
    pub fn len(self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// One continuous soundtrack made of every scene clip placed back-to-back.
#[derive(Clone, Debug)]
pub struct AudioTimeline {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
    scene_spans: Vec<SampleSpan>,
}

impl AudioTimeline {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Interleaved master samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Length in sample frames.
    pub fn total_samples(&self) -> u64 {
        (self.samples.len() / usize::from(self.channels)) as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_samples() as f64 / f64::from(self.sample_rate)
    }

    /// Where each scene's clip sits on the master track, in story order.
    pub fn scene_spans(&self) -> &[SampleSpan] {
        &self.scene_spans
    }

    /// Write interleaved samples as raw little-endian `f32`, the encoder's audio input format.
    pub fn write_f32le(&self, out_path: &Path) -> ReelResult<()> {
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoryReelError::capture_init(format!(
                    "failed to create audio track directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        let mut bytes = Vec::<u8>::with_capacity(self.samples.len() * 4);
        for &sample in &self.samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        std::fs::write(out_path, bytes).map_err(|e| {
            StoryReelError::capture_init(format!(
                "failed to write master audio track '{}': {e}",
                out_path.display()
            ))
        })
    }
}

/// Concatenate every scene clip into one master track.
///
/// A time cursor starts at zero; each clip is scheduled at the cursor and the cursor then
/// advances by the clip's duration. Scene boundaries are rounded from the cumulative time, so the
/// spans tile the track exactly (no gap, no overlap) and the total never drifts from
/// `round(sum(durations) * rate)`.
pub fn build_audio_timeline(story: &Story, opts: TimelineOpts) -> ReelResult<AudioTimeline> {
    if opts.sample_rate == 0 || opts.channels == 0 {
        return Err(StoryReelError::validation(
            "master audio sample rate/channels must be non-zero",
        ));
    }
    let rate = f64::from(opts.sample_rate);

    let mut cursor_secs = 0.0f64;
    let mut spans = Vec::with_capacity(story.len());
    for scene in story.scenes() {
        let dur = scene.audio.duration_secs();
        if !(dur.is_finite() && dur > 0.0) {
            return Err(StoryReelError::asset(format!(
                "scene {} audio clip has non-positive duration",
                scene.index
            )));
        }
        let start = secs_to_sample(cursor_secs, rate);
        cursor_secs += dur;
        let end = secs_to_sample(cursor_secs, rate);
        spans.push(SampleSpan { start, end });
    }

    let total = spans.last().map(|s| s.end).unwrap_or(0);
    let mut out = vec![0.0f32; total as usize * usize::from(opts.channels)];
    for (scene, span) in story.scenes().iter().zip(&spans) {
        place_clip(&mut out, opts, &scene.audio, *span);
    }
    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }

    tracing::debug!(
        scenes = spans.len(),
        total_samples = total,
        sample_rate = opts.sample_rate,
        "master audio track built"
    );

    Ok(AudioTimeline {
        sample_rate: opts.sample_rate,
        channels: opts.channels,
        samples: out,
        scene_spans: spans,
    })
}

fn secs_to_sample(secs: f64, rate: f64) -> u64 {
    (secs * rate).round().max(0.0) as u64
}

fn place_clip(out: &mut [f32], opts: TimelineOpts, clip: &AudioClip, span: SampleSpan) {
    let src = clip.samples();
    let src_ch = usize::from(clip.channels());
    let src_frames = clip.frames();
    if src_frames == 0 {
        return;
    }
    let dst_ch = usize::from(opts.channels);
    let step = f64::from(clip.sample_rate()) / f64::from(opts.sample_rate);

    for dst_sample in span.start..span.end {
        let rel = (dst_sample - span.start) as f64;
        let src_pos = rel * step;
        let f0 = src_pos.floor() as usize;
        if f0 >= src_frames {
            break;
        }
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (src_pos - f0 as f64) as f32;

        let base = dst_sample as usize * dst_ch;
        for c in 0..dst_ch {
            let v0 = source_channel(&src[f0 * src_ch..(f0 + 1) * src_ch], c, dst_ch);
            let v1 = source_channel(&src[f1 * src_ch..(f1 + 1) * src_ch], c, dst_ch);
            out[base + c] += v0 + (v1 - v0) * frac;
        }
    }
}

/// Map one source frame onto destination channel `c`.
fn source_channel(frame: &[f32], c: usize, dst_channels: usize) -> f32 {
    if frame.len() == dst_channels {
        frame[c]
    } else if frame.len() == 1 {
        frame[0]
    } else if dst_channels == 1 {
        frame.iter().sum::<f32>() / frame.len() as f32
    } else {
        frame[c.min(frame.len() - 1)]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/timeline.rs"]
mod tests;
