use std::path::PathBuf;

use crate::audio::TimelineOpts;
use crate::foundation::error::{ReelResult, StoryReelError};
use crate::story::manifest::load_story;
use crate::story::model::{Language, Story};

/// What the user asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Story idea.
    pub prompt: String,
    /// Optional description of the main character, folded into every illustration prompt.
    pub character: Option<String>,
    pub language: Language,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, language: Language) -> Self {
        Self {
            prompt: prompt.into(),
            character: None,
            language,
        }
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(StoryReelError::validation("story prompt must not be empty"));
        }
        Ok(())
    }
}

/// Source of fully resolved stories: scene text, illustration and narration audio.
///
/// Implementations either return a complete story or an error; partial stories are never
/// returned.
pub trait StoryBackend {
    fn generate(&self, request: &GenerationRequest) -> ReelResult<Story>;
}

/// Illustration prompt for one scene, with the main character prepended when one was given.
pub fn image_prompt(character: Option<&str>, description: &str) -> String {
    match character.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => format!("The main character is a {c}. {description}"),
        None => description.to_string(),
    }
}

/// Backend that serves a pre-generated story from a manifest on disk.
#[derive(Clone, Debug)]
pub struct ManifestBackend {
    manifest_path: PathBuf,
    decode: TimelineOpts,
}

impl ManifestBackend {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            decode: TimelineOpts::default(),
        }
    }

    /// Format compressed audio files are decoded to.
    pub fn with_decode(mut self, decode: TimelineOpts) -> Self {
        self.decode = decode;
        self
    }
}

impl StoryBackend for ManifestBackend {
    fn generate(&self, request: &GenerationRequest) -> ReelResult<Story> {
        request.validate()?;
        let (story, language) = load_story(&self.manifest_path, self.decode)?;
        if language != request.language {
            tracing::warn!(
                requested = %request.language,
                manifest = %language,
                "manifest language differs from the requested language"
            );
        }
        Ok(story)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/backend.rs"]
mod tests;
