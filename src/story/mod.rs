//! Story data: the in-memory model, the on-disk manifest, and the generation backend seam.

pub mod backend;
pub mod manifest;
pub mod model;

pub use backend::{GenerationRequest, ManifestBackend, StoryBackend, image_prompt};
pub use manifest::{AudioEntry, SceneEntry, StoryManifest, load_story};
pub use model::{AudioClip, ImageRef, Language, Scene, Story};
