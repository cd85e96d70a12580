use super::*;

const HD: Canvas = Canvas {
    width: 1280,
    height: 720,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn cover_crops_wide_images_horizontally() {
    let r = cover_rect(2000.0, 1000.0, 16.0 / 9.0);
    assert!(approx(r.height, 1000.0));
    assert!(approx(r.width, 1000.0 * 16.0 / 9.0));
    assert!(approx(r.x, (2000.0 - r.width) / 2.0));
    assert_eq!(r.y, 0.0);
}

#[test]
fn cover_crops_tall_images_vertically() {
    let r = cover_rect(900.0, 1600.0, 16.0 / 9.0);
    assert!(approx(r.width, 900.0));
    assert!(approx(r.height, 900.0 * 9.0 / 16.0));
    assert_eq!(r.x, 0.0);
    assert!(approx(r.y, (1600.0 - r.height) / 2.0));
}

#[test]
fn zoomed_rect_is_centered_and_scaled() {
    let cover = cover_rect(1920.0, 1080.0, HD.aspect());
    let z = zoomed_rect(1920.0, 1080.0, cover, 1.15);
    assert!(approx(z.width, 1920.0 / 1.15));
    assert!(approx(z.height, 1080.0 / 1.15));
    assert!(approx(z.x + z.width / 2.0, 960.0));
    assert!(approx(z.y + z.height / 2.0, 540.0));
}

#[test]
fn zoom_out_swaps_endpoints_of_zoom_in() {
    let opts = PlannerOpts::default();
    let zin = plan_scene(1600, 900, HD, AnimationStyle::ZoomInCenter, opts).unwrap();
    let zout = plan_scene(1600, 900, HD, AnimationStyle::ZoomOut, opts).unwrap();
    assert_eq!(zin.start, zout.end);
    assert_eq!(zin.end, zout.start);
}

#[test]
fn pans_shift_by_a_tenth_of_the_zoomed_width_when_room_allows() {
    // Very wide image: plenty of horizontal room on both sides.
    let opts = PlannerOpts::default();
    let center = plan_scene(4000, 900, HD, AnimationStyle::ZoomInCenter, opts).unwrap();
    let right = plan_scene(4000, 900, HD, AnimationStyle::ZoomInPanRight, opts).unwrap();
    let left = plan_scene(4000, 900, HD, AnimationStyle::ZoomInPanLeft, opts).unwrap();
    let pan = center.end.width * 0.1;
    assert!(approx(right.end.x, center.end.x + pan));
    assert!(approx(left.end.x, center.end.x - pan));
    assert_eq!(right.end.y, center.end.y);
}

#[test]
fn pans_are_clamped_into_the_image() {
    // Same aspect as the canvas: the 10% pan exceeds the zoom margin and must clamp.
    let opts = PlannerOpts::default();
    let right = plan_scene(1920, 1080, HD, AnimationStyle::ZoomInPanRight, opts).unwrap();
    let left = plan_scene(1920, 1080, HD, AnimationStyle::ZoomInPanLeft, opts).unwrap();
    assert!(approx(right.end.x + right.end.width, 1920.0));
    assert!(approx(left.end.x, 0.0));
}

#[test]
fn every_interpolated_window_stays_inside_the_image() {
    let sizes = [(1920, 1080), (1024, 1024), (640, 1280), (3000, 500), (17, 11)];
    let opts = PlannerOpts::default();
    for (w, h) in sizes {
        for style in AnimationStyle::ALL {
            let plan = plan_scene(w, h, HD, style, opts).unwrap();
            for i in 0..=200 {
                let t = f64::from(i) / 200.0;
                let r = plan.start.lerp(plan.end, t);
                assert!(
                    r.is_within(f64::from(w), f64::from(h), 1e-9),
                    "{style:?} {w}x{h} t={t} -> {r:?}"
                );
            }
        }
    }
}

#[test]
fn planner_rejects_bad_inputs() {
    let opts = PlannerOpts::default();
    assert!(plan_scene(0, 10, HD, AnimationStyle::ZoomOut, opts).is_err());
    let bad = PlannerOpts {
        zoom: 1.0,
        ..opts
    };
    assert!(plan_scene(10, 10, HD, AnimationStyle::ZoomOut, bad).is_err());
    let bad = PlannerOpts {
        pan_fraction: 0.5,
        ..opts
    };
    assert!(plan_scene(10, 10, HD, AnimationStyle::ZoomOut, bad).is_err());
}
