use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::media::decode_audio_file;
use crate::audio::TimelineOpts;
use crate::foundation::error::{ReelResult, StoryReelError};
use crate::story::model::{AudioClip, ImageRef, Language, Scene, Story};

/// Sample rate of backend speech output when a manifest does not say otherwise.
pub const DEFAULT_PCM16_SAMPLE_RATE: u32 = 24_000;

/// JSON story description on disk. Paths are relative to the manifest's directory.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoryManifest {
    #[serde(default)]
    pub language: Language,
    pub scenes: Vec<SceneEntry>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneEntry {
    pub scene: u32,
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub description_for_image: String,
    pub image: String,
    pub audio: AudioEntry,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AudioEntry {
    /// Raw little-endian signed 16-bit PCM.
    Pcm16 {
        pcm16: String,
        #[serde(default = "default_pcm16_rate")]
        sample_rate: u32,
        #[serde(default = "default_channels")]
        channels: u16,
    },
    /// Any container ffmpeg can decode.
    File { file: String },
}

fn default_pcm16_rate() -> u32 {
    DEFAULT_PCM16_SAMPLE_RATE
}

fn default_channels() -> u16 {
    1
}

impl StoryManifest {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| StoryReelError::asset(format!("invalid story manifest: {e}")))
    }

    pub fn read(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read story manifest '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Resolve every entry against `base_dir` and build a validated story.
    ///
    /// Audio is decoded eagerly; images are only located and decoded when their scene renders.
    /// `decode` sets the format used for compressed audio files.
    pub fn into_story(self, base_dir: &Path, decode: TimelineOpts) -> ReelResult<Story> {
        let scenes = self
            .scenes
            .into_iter()
            .map(|entry| entry.resolve(base_dir, decode))
            .collect::<ReelResult<Vec<_>>>()?;
        Story::new(scenes)
    }
}

impl SceneEntry {
    fn resolve(self, base_dir: &Path, decode: TimelineOpts) -> ReelResult<Scene> {
        let scene_err = |e: StoryReelError| match e {
            StoryReelError::Asset(msg) | StoryReelError::Validation(msg) => {
                StoryReelError::asset(format!("scene {}: {msg}", self.scene))
            }
            other => other,
        };

        let image = ImageRef::Path(resolve_rel_path(base_dir, &self.image).map_err(scene_err)?);
        let audio = match &self.audio {
            AudioEntry::Pcm16 {
                pcm16,
                sample_rate,
                channels,
            } => {
                let path = resolve_rel_path(base_dir, pcm16).map_err(scene_err)?;
                let bytes = std::fs::read(&path).map_err(|e| {
                    StoryReelError::asset(format!(
                        "scene {}: failed to read '{}': {e}",
                        self.scene,
                        path.display()
                    ))
                })?;
                AudioClip::from_pcm16_le(&bytes, *sample_rate, *channels).map_err(scene_err)?
            }
            AudioEntry::File { file } => {
                let path = resolve_rel_path(base_dir, file).map_err(scene_err)?;
                decode_audio_file(&path, decode.sample_rate, decode.channels).map_err(scene_err)?
            }
        };

        Ok(Scene {
            index: self.scene,
            narration: self.narration,
            image_description: self.description_for_image,
            image,
            audio,
        })
    }
}

/// Read a manifest file and build its story. Relative paths resolve against the file's directory.
pub fn load_story(manifest_path: &Path, decode: TimelineOpts) -> ReelResult<(Story, Language)> {
    let manifest = StoryManifest::read(manifest_path)?;
    let language = manifest.language;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let story = manifest.into_story(base_dir, decode)?;
    tracing::debug!(
        path = %manifest_path.display(),
        scenes = story.len(),
        %language,
        "story manifest loaded"
    );
    Ok((story, language))
}

/// Normalize a manifest-relative path; it must stay inside `base_dir`.
pub(crate) fn resolve_rel_path(base_dir: &Path, source: &str) -> ReelResult<PathBuf> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(StoryReelError::validation("asset path must be non-empty"));
    }
    if s.starts_with('/') || s.contains(':') {
        return Err(StoryReelError::validation(format!(
            "asset path '{source}' must be relative"
        )));
    }

    let mut out = base_dir.to_path_buf();
    let mut parts = 0usize;
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StoryReelError::validation(format!(
                "asset path '{source}' must not contain '..'"
            )));
        }
        out.push(part);
        parts += 1;
    }
    if parts == 0 {
        return Err(StoryReelError::validation(format!(
            "asset path '{source}' must contain a file name"
        )));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/story/manifest.rs"]
mod tests;
