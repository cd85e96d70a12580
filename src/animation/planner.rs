use crate::animation::style::AnimationStyle;
use crate::foundation::core::{Canvas, SourceRect};
use crate::foundation::error::{ReelResult, StoryReelError};

/// Zoom factor between the cover window and the zoomed window.
pub const DEFAULT_ZOOM: f64 = 1.15;
/// Horizontal pan distance, as a fraction of the zoomed window width.
pub const DEFAULT_PAN_FRACTION: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlannerOpts {
    /// Must be > 1.
    pub zoom: f64,
    /// Must be in `[0, 0.5)`.
    pub pan_fraction: f64,
}

impl Default for PlannerOpts {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            pan_fraction: DEFAULT_PAN_FRACTION,
        }
    }
}

impl PlannerOpts {
    pub fn validate(&self) -> ReelResult<()> {
        if !(self.zoom.is_finite() && self.zoom > 1.0) {
            return Err(StoryReelError::validation("zoom factor must be > 1"));
        }
        if !(0.0..0.5).contains(&self.pan_fraction) {
            return Err(StoryReelError::validation(
                "pan fraction must be in [0, 0.5)",
            ));
        }
        Ok(())
    }
}

/// Start and end source windows for one scene, interpolated over its duration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AnimationPlan {
    pub style: AnimationStyle,
    pub start: SourceRect,
    pub end: SourceRect,
}

/// Largest centered window of a `img_w x img_h` image whose aspect matches `target_aspect`.
pub fn cover_rect(img_w: f64, img_h: f64, target_aspect: f64) -> SourceRect {
    let img_aspect = img_w / img_h;
    if img_aspect > target_aspect {
        // Wider than the frame: keep full height, crop the sides.
        let h = img_h;
        let w = h * target_aspect;
        SourceRect::new((img_w - w) / 2.0, 0.0, w, h)
    } else {
        let w = img_w;
        let h = w / target_aspect;
        SourceRect::new(0.0, (img_h - h) / 2.0, w, h)
    }
}

/// `cover` shrunk by `zoom`, re-centered on the image.
pub fn zoomed_rect(img_w: f64, img_h: f64, cover: SourceRect, zoom: f64) -> SourceRect {
    let w = cover.width / zoom;
    let h = cover.height / zoom;
    SourceRect::new((img_w - w) / 2.0, (img_h - h) / 2.0, w, h)
}

/// Compute the animation endpoints for one scene.
///
/// Both endpoints are contained in the image, so every interpolated window is as well. A pan
/// that would leave the image is clamped to the nearest edge.
pub fn plan_scene(
    img_width: u32,
    img_height: u32,
    canvas: Canvas,
    style: AnimationStyle,
    opts: PlannerOpts,
) -> ReelResult<AnimationPlan> {
    if img_width == 0 || img_height == 0 {
        return Err(StoryReelError::render("scene image has zero size"));
    }
    if canvas.width == 0 || canvas.height == 0 {
        return Err(StoryReelError::validation("canvas width/height must be non-zero"));
    }
    opts.validate()?;

    let (iw, ih) = (f64::from(img_width), f64::from(img_height));
    let cover = cover_rect(iw, ih, canvas.aspect());
    let zoomed = zoomed_rect(iw, ih, cover, opts.zoom);
    let pan = zoomed.width * opts.pan_fraction;
    let max_x = iw - zoomed.width;

    let (start, end) = match style {
        AnimationStyle::ZoomInPanRight => (
            cover,
            SourceRect {
                x: (zoomed.x + pan).clamp(0.0, max_x),
                ..zoomed
            },
        ),
        AnimationStyle::ZoomInPanLeft => (
            cover,
            SourceRect {
                x: (zoomed.x - pan).clamp(0.0, max_x),
                ..zoomed
            },
        ),
        AnimationStyle::ZoomOut => (zoomed, cover),
        AnimationStyle::ZoomInCenter => (cover, zoomed),
    };

    Ok(AnimationPlan { style, start, end })
}

#[cfg(test)]
#[path = "../../tests/unit/animation/planner.rs"]
mod tests;
