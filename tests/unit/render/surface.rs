use super::*;

fn canvas(width: u32, height: u32) -> Canvas {
    Canvas { width, height }
}

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 3)
}

/// Left half red, right half blue.
fn split_image(w: u32, h: u32) -> PreparedImage {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _y in 0..h {
        for x in 0..w {
            if x < w / 2 {
                data.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                data.extend_from_slice(&[0, 0, 255, 255]);
            }
        }
    }
    PreparedImage::from_straight_rgba8(w, h, data).unwrap()
}

#[test]
fn new_surface_is_filled_with_background() {
    let s = DrawingSurface::new(canvas(8, 4), [0, 0, 0, 255]).unwrap();
    let f = s.snapshot();
    assert_eq!(f.data.len(), 8 * 4 * 4);
    assert!(f.premultiplied);
    assert!(f.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn oversized_or_empty_canvas_fails_capture_init() {
    let err = DrawingSurface::new(canvas(70_000, 10), [0, 0, 0, 255]).unwrap_err();
    assert!(matches!(err, StoryReelError::CaptureInit(_)));
    assert!(DrawingSurface::new(canvas(0, 10), [0, 0, 0, 255]).is_err());
}

#[test]
fn source_window_selects_which_part_of_the_image_fills_the_canvas() {
    let mut s = DrawingSurface::new(canvas(32, 18), [0, 0, 0, 255]).unwrap();
    let paint = s.prepare(&split_image(200, 100)).unwrap();
    assert_eq!((paint.width(), paint.height()), (200, 100));

    s.draw(&paint, SourceRect::new(10.0, 10.0, 60.0, 60.0 * 9.0 / 16.0))
        .unwrap();
    let f = s.snapshot();
    assert!(close(pixel(&f, 16, 9), [255, 0, 0, 255]), "{:?}", pixel(&f, 16, 9));

    s.draw(&paint, SourceRect::new(130.0, 10.0, 60.0, 60.0 * 9.0 / 16.0))
        .unwrap();
    let f = s.snapshot();
    assert!(close(pixel(&f, 16, 9), [0, 0, 255, 255]), "{:?}", pixel(&f, 16, 9));
}

#[test]
fn window_straddling_the_split_shows_both_halves() {
    let mut s = DrawingSurface::new(canvas(32, 18), [0, 0, 0, 255]).unwrap();
    let paint = s.prepare(&split_image(200, 100)).unwrap();
    s.draw(&paint, SourceRect::new(50.0, 20.0, 100.0, 56.25)).unwrap();
    let f = s.snapshot();
    assert!(close(pixel(&f, 4, 9), [255, 0, 0, 255]));
    assert!(close(pixel(&f, 27, 9), [0, 0, 255, 255]));
}

#[test]
fn transparent_image_leaves_background_visible() {
    let mut s = DrawingSurface::new(canvas(16, 9), [0, 128, 0, 255]).unwrap();
    let img = PreparedImage::solid(16, 9, [255, 255, 255, 0]).unwrap();
    let paint = s.prepare(&img).unwrap();
    s.draw(&paint, SourceRect::new(0.0, 0.0, 16.0, 9.0)).unwrap();
    let f = s.snapshot();
    assert_eq!(pixel(&f, 8, 4), [0, 128, 0, 255]);
}

#[test]
fn degenerate_window_is_a_render_error() {
    let mut s = DrawingSurface::new(canvas(16, 9), [0, 0, 0, 255]).unwrap();
    let paint = s.prepare(&PreparedImage::solid(4, 4, [1, 2, 3, 255]).unwrap()).unwrap();
    let err = s.draw(&paint, SourceRect::new(0.0, 0.0, 0.0, 4.0)).unwrap_err();
    assert!(matches!(err, StoryReelError::Render(_)));
}
