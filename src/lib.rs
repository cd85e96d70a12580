//! Storyreel turns an illustrated, narrated children's story into one video file.
//!
//! Each scene contributes one image and one narration clip. Clips are concatenated into a single
//! master soundtrack; each image gets a slow pan/zoom ("Ken Burns") animation lasting exactly as
//! long as its clip; the frames and the soundtrack are captured together into WebM or MP4.
//!
//! The entry point is [`ExportSession`]:
//!
//! - Build a [`Story`] (directly, or from a manifest via [`load_story`])
//! - Pick a [`CaptureSink`] ([`FfmpegSink`] for real output, [`InMemorySink`] for tests)
//! - Call [`ExportSession::export`] and save the returned [`VideoArtifact`]
#![forbid(unsafe_code)]

mod foundation;

/// Pan/zoom planning and style selection.
pub mod animation;
/// Image and audio decoding.
pub mod assets;
/// Master soundtrack assembly.
pub mod audio;
/// Capture sinks.
pub mod encode;
/// Progress stages and reporters.
pub mod progress;
/// Frame schedule, drawing surface and pacing.
pub mod render;
/// Export configuration and orchestration.
pub mod session;
/// Story model, manifest and generation backend.
pub mod story;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, SourceRect};
pub use crate::foundation::error::{ReelResult, StoryReelError};

pub use crate::animation::{AnimationPlan, AnimationStyle, FixedStyle, RandomStyles, StyleSelector};
pub use crate::encode::{CaptureSink, Container, FfmpegSink, FfmpegSinkOpts, InMemorySink};
pub use crate::progress::{ChannelReporter, ProgressEvent, ProgressReporter, ProgressStage};
pub use crate::render::FrameRGBA;
pub use crate::session::{
    CancelToken, ExportConfig, ExportOutcome, ExportReport, ExportSession, ExportState,
    VideoArtifact,
};
pub use crate::story::{AudioClip, ImageRef, Language, Scene, Story, load_story};
