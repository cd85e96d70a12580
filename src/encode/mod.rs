//! Capture sinks: consumers of the rendered frame stream plus the master audio track.

pub mod ffmpeg;
pub mod sink;

pub use ffmpeg::{Container, FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use sink::{AudioInputConfig, CaptureConfig, CaptureSink, EncodedStream, InMemorySink};
