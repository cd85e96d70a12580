use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::error::{ReelResult, StoryReelError};

/// Narration/UI language. Only affects progress and error text, never rendering math.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Language {
    #[serde(rename = "gu")]
    Gujarati,
    #[serde(rename = "hi")]
    Hindi,
    #[default]
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Language::Gujarati => "gu",
            Language::Hindi => "hi",
            Language::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = StoryReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gu" | "gujarati" => Ok(Language::Gujarati),
            "hi" | "hindi" => Ok(Language::Hindi),
            "en" | "english" => Ok(Language::English),
            other => Err(StoryReelError::validation(format!(
                "unsupported language tag '{other}'"
            ))),
        }
    }
}

/// Decoded narration audio for one scene, as interleaved `f32` PCM.
#[derive(Clone, Debug)]
pub struct AudioClip {
    sample_rate: u32,
    channels: u16,
    samples: Arc<Vec<f32>>,
}

impl AudioClip {
    /// Wrap interleaved samples. The sample count must be a whole number of frames.
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> ReelResult<Self> {
        if sample_rate == 0 {
            return Err(StoryReelError::asset("audio clip sample rate must be non-zero"));
        }
        if channels == 0 {
            return Err(StoryReelError::asset("audio clip channel count must be non-zero"));
        }
        if !samples.len().is_multiple_of(usize::from(channels)) {
            return Err(StoryReelError::asset(format!(
                "audio clip has {} samples, not a multiple of {channels} channels",
                samples.len()
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
            samples: Arc::new(samples),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Decode little-endian signed 16-bit interleaved PCM, as delivered by the speech backend.
    pub fn from_pcm16_le(bytes: &[u8], sample_rate: u32, channels: u16) -> ReelResult<Self> {
        crate::assets::decode::decode_pcm16_le(bytes, sample_rate, channels)
    }
}

/// Where a scene's illustration comes from. Decoding is deferred until the scene is rendered.
#[derive(Clone, Debug)]
pub enum ImageRef {
    /// Encoded image file on disk (PNG, JPEG, ...).
    Path(PathBuf),
    /// Encoded image bytes held in memory.
    Encoded(Arc<Vec<u8>>),
    /// Already decoded pixels.
    Decoded(Arc<PreparedImage>),
}

impl ImageRef {
    fn check_present(&self) -> ReelResult<()> {
        match self {
            ImageRef::Path(p) if p.as_os_str().is_empty() => {
                Err(StoryReelError::asset("image path is empty"))
            }
            ImageRef::Path(p) if !p.is_file() => Err(StoryReelError::asset(format!(
                "image file '{}' not found",
                p.display()
            ))),
            ImageRef::Encoded(bytes) if bytes.is_empty() => {
                Err(StoryReelError::asset("encoded image is empty"))
            }
            ImageRef::Decoded(img) if img.width == 0 || img.height == 0 => {
                Err(StoryReelError::asset("decoded image has zero size"))
            }
            _ => Ok(()),
        }
    }
}

/// One unit of the story.
#[derive(Clone, Debug)]
pub struct Scene {
    /// 1-based ordering key.
    pub index: u32,
    pub narration: String,
    /// Illustration prompt the image was generated from (English).
    pub image_description: String,
    pub image: ImageRef,
    pub audio: AudioClip,
}

/// Ordered, fully resolved scene list.
///
/// Invariants: non-empty, sorted by ascending `Scene::index` without duplicates, and every clip
/// has a positive duration.
#[derive(Clone, Debug)]
pub struct Story {
    scenes: Vec<Scene>,
}

impl Story {
    /// Validate and sort `scenes` into a story.
    pub fn new(mut scenes: Vec<Scene>) -> ReelResult<Self> {
        if scenes.is_empty() {
            return Err(StoryReelError::asset("story has no scenes"));
        }
        scenes.sort_by_key(|s| s.index);
        for pair in scenes.windows(2) {
            if pair[0].index == pair[1].index {
                return Err(StoryReelError::asset(format!(
                    "duplicate scene index {}",
                    pair[0].index
                )));
            }
        }
        for scene in &scenes {
            validate_scene(scene)?;
        }
        Ok(Self { scenes })
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Sum of all narration clip durations.
    pub fn total_duration_secs(&self) -> f64 {
        self.scenes.iter().map(|s| s.audio.duration_secs()).sum()
    }
}

fn validate_scene(scene: &Scene) -> ReelResult<()> {
    let dur = scene.audio.duration_secs();
    if !(dur.is_finite() && dur > 0.0) {
        return Err(StoryReelError::asset(format!(
            "scene {} audio clip has non-positive duration",
            scene.index
        )));
    }
    scene.image.check_present().map_err(|e| match e {
        StoryReelError::Asset(msg) => {
            StoryReelError::asset(format!("scene {}: {msg}", scene.index))
        }
        other => other,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/story/model.rs"]
mod tests;
