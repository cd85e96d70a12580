use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{ReelResult, StoryReelError};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::story::model::{AudioClip, ImageRef};

/// Decoded illustration ready for drawing.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Build from straight-alpha RGBA8 pixels.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(StoryReelError::asset("image dimensions must be non-zero"));
        }
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return Err(StoryReelError::asset(format!(
                "image byte length {} does not match {width}x{height} rgba8",
                rgba.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Opaque single-color image.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ReelResult<Self> {
        let px = (width as usize) * (height as usize);
        let data = rgba.iter().copied().cycle().take(px * 4).collect();
        Self::from_straight_rgba8(width, height, data)
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ReelResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PreparedImage::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Resolve a scene's image reference into pixels.
///
/// Failures here happen mid-export and are reported as render errors.
pub fn load_image(image: &ImageRef) -> ReelResult<Arc<PreparedImage>> {
    let decoded = match image {
        ImageRef::Decoded(img) => return Ok(img.clone()),
        ImageRef::Encoded(bytes) => decode_image(bytes),
        ImageRef::Path(path) => std::fs::read(path)
            .with_context(|| format!("read image '{}'", path.display()))
            .map_err(StoryReelError::from)
            .and_then(|bytes| decode_image(&bytes)),
    };
    decoded
        .map(Arc::new)
        .map_err(|e| StoryReelError::render(format!("failed to load scene image: {e:#}")))
}

/// Decode little-endian signed 16-bit interleaved PCM, the format speech arrives in.
pub fn decode_pcm16_le(bytes: &[u8], sample_rate: u32, channels: u16) -> ReelResult<AudioClip> {
    if !bytes.len().is_multiple_of(2) {
        return Err(StoryReelError::asset(
            "pcm16 byte length is not aligned to 16-bit samples",
        ));
    }
    let samples = bytes
        .chunks_exact(2)
        .map(|c| f32::from(i16::from_le_bytes([c[0], c[1]])) / 32768.0)
        .collect();
    AudioClip::new(sample_rate, channels, samples)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
