//! Frame renderer: per-scene frame schedule, the drawing surface, and capture pacing.

pub mod pacer;
pub mod surface;
pub mod timeline;

pub use pacer::{FramePacer, RealtimePacer, Unpaced};
pub use surface::{DrawingSurface, FrameRGBA, ScenePaint};
pub use timeline::SceneTimeline;
