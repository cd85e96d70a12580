use crate::foundation::error::{ReelResult, StoryReelError};

pub use kurbo::{Affine, Rect};

/// Absolute 0-based frame index in export timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(StoryReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StoryReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frame_interval(self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.frame_duration_secs())
    }

    /// Convert seconds to frame count using round-half-away-from-zero semantics.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output drawing surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Source window in image pixel space: top-left corner plus size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Field-wise linear interpolation between `self` (t = 0) and `end` (t = 1).
    pub fn lerp(self, end: SourceRect, t: f64) -> SourceRect {
        use crate::foundation::math::lerp;
        SourceRect {
            x: lerp(self.x, end.x, t),
            y: lerp(self.y, end.y, t),
            width: lerp(self.width, end.width, t),
            height: lerp(self.height, end.height, t),
        }
    }

    /// Return `true` when the window has positive area and lies inside a `width x height` image.
    ///
    /// `eps` absorbs floating point noise from interpolation.
    pub fn is_within(self, width: f64, height: f64, eps: f64) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.x >= -eps
            && self.y >= -eps
            && self.x + self.width <= width + eps
            && self.y + self.height <= height + eps
    }

    pub fn to_kurbo(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Affine that maps this source window onto a full `canvas`.
    pub fn to_canvas_affine(self, canvas: Canvas) -> Affine {
        let sx = f64::from(canvas.width) / self.width;
        let sy = f64::from(canvas.height) / self.height;
        Affine::scale_non_uniform(sx, sy) * Affine::translate((-self.x, -self.y))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
