//! Master soundtrack assembly.

pub mod timeline;

pub use timeline::{AudioTimeline, SampleSpan, TimelineOpts, build_audio_timeline};
