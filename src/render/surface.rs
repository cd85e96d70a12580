use std::sync::Arc;

use crate::assets::PreparedImage;
use crate::foundation::core::{Affine, Canvas, SourceRect};
use crate::foundation::error::{ReelResult, StoryReelError};
use crate::foundation::math::{premul_over_in_place, premul_rgba8};

/// One captured frame, premultiplied RGBA8 row-major.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// A scene image uploaded as a vello_cpu paint.
#[derive(Clone, Debug)]
pub struct ScenePaint {
    image: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl ScenePaint {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The fixed-size surface every frame is drawn on.
///
/// Each frame first fills the canvas with the background color, then draws the source window of
/// the scene image scaled to cover the whole canvas.
pub struct DrawingSurface {
    canvas: Canvas,
    width: u16,
    height: u16,
    background: [u8; 4],
    surface: vello_cpu::Pixmap,
    scratch: vello_cpu::Pixmap,
}

impl std::fmt::Debug for DrawingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingSurface")
            .field("canvas", &self.canvas)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

impl DrawingSurface {
    /// `background_rgba` is straight alpha.
    pub fn new(canvas: Canvas, background_rgba: [u8; 4]) -> ReelResult<Self> {
        let width: u16 = canvas.width.try_into().map_err(|_| {
            StoryReelError::capture_init(format!("canvas width {} exceeds u16", canvas.width))
        })?;
        let height: u16 = canvas.height.try_into().map_err(|_| {
            StoryReelError::capture_init(format!("canvas height {} exceeds u16", canvas.height))
        })?;
        if width == 0 || height == 0 {
            return Err(StoryReelError::capture_init(
                "canvas width/height must be non-zero",
            ));
        }
        let background = premul_rgba8(background_rgba);
        let mut surface = vello_cpu::Pixmap::new(width, height);
        clear_pixmap(&mut surface, background);
        Ok(Self {
            canvas,
            width,
            height,
            background,
            surface,
            scratch: vello_cpu::Pixmap::new(width, height),
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Upload a decoded scene image for drawing.
    pub fn prepare(&self, image: &PreparedImage) -> ReelResult<ScenePaint> {
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        Ok(ScenePaint {
            image: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: image.width,
            height: image.height,
        })
    }

    /// Fill the canvas with the background color.
    pub fn clear(&mut self) {
        clear_pixmap(&mut self.surface, self.background);
    }

    /// Clear, then draw `rect` of `paint` stretched over the full canvas.
    pub fn draw(&mut self, paint: &ScenePaint, rect: SourceRect) -> ReelResult<()> {
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return Err(StoryReelError::render(format!(
                "source window has no area: {rect:?}"
            )));
        }
        self.clear();

        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_transform(affine_to_cpu(rect.to_canvas_affine(self.canvas)));
        ctx.set_paint(paint.image.clone());
        let r = rect.to_kurbo();
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
        ctx.flush();

        clear_pixmap(&mut self.scratch, [0, 0, 0, 0]);
        ctx.render_to_pixmap(&mut self.scratch);
        premul_over_in_place(
            self.surface.data_as_u8_slice_mut(),
            self.scratch.data_as_u8_slice(),
        );
        Ok(())
    }

    /// Copy the current surface contents out as a frame.
    pub fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.surface.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryReelError::render(format!("image width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryReelError::render(format!("image height {height} exceeds u16")))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StoryReelError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
