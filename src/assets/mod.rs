//! Scene asset decoding: illustrations to premultiplied RGBA8, narration to `f32` PCM.

pub mod decode;
pub mod media;

pub use decode::PreparedImage;
