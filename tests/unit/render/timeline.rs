use super::*;
use crate::animation::{AnimationStyle, PlannerOpts, plan_scene};
use crate::foundation::core::Canvas;

fn plan() -> AnimationPlan {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    plan_scene(1600, 900, canvas, AnimationStyle::ZoomInCenter, PlannerOpts::default()).unwrap()
}

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn frame_count_rounds_duration_times_fps() {
    assert_eq!(SceneTimeline::new(plan(), 2.0, fps30()).unwrap().frame_count(), 60);
    assert_eq!(SceneTimeline::new(plan(), 3.0, fps30()).unwrap().frame_count(), 90);
    assert_eq!(SceneTimeline::new(plan(), 1.01, fps30()).unwrap().frame_count(), 30);
    assert_eq!(SceneTimeline::new(plan(), 1.02, fps30()).unwrap().frame_count(), 31);
}

#[test]
fn first_frame_is_start_and_last_stops_short_of_end() {
    let tl = SceneTimeline::new(plan(), 2.0, fps30()).unwrap();
    assert_eq!(tl.rect_at(0), tl.plan().start);
    let last = tl.progress(tl.frame_count() - 1);
    assert!(last < 1.0);
    assert!((last - 59.0 / 60.0).abs() < 1e-12);
    assert_ne!(tl.rect_at(tl.frame_count() - 1), tl.plan().end);
}

#[test]
fn rects_iterates_every_frame_in_order() {
    let tl = SceneTimeline::new(plan(), 1.0, fps30()).unwrap();
    let rects: Vec<_> = tl.rects().collect();
    assert_eq!(rects.len(), 30);
    // Zoom-in: widths shrink monotonically.
    assert!(rects.windows(2).all(|w| w[1].width < w[0].width));
}

#[test]
fn zero_or_nan_duration_is_rejected() {
    assert!(SceneTimeline::new(plan(), 0.0, fps30()).is_err());
    assert!(SceneTimeline::new(plan(), f64::NAN, fps30()).is_err());
}

#[test]
fn clip_shorter_than_half_a_frame_gets_no_frames() {
    // Half a frame at 30 fps is 1/60 s.
    let tl = SceneTimeline::new(plan(), 1.0 / 44_100.0, fps30()).unwrap();
    assert_eq!(tl.frame_count(), 0);
    assert_eq!(tl.rects().count(), 0);
    assert_eq!(SceneTimeline::new(plan(), 0.017, fps30()).unwrap().frame_count(), 1);
}
