//! Per-scene pan/zoom planning.

pub mod planner;
pub mod style;

pub use planner::{AnimationPlan, PlannerOpts, cover_rect, plan_scene, zoomed_rect};
pub use style::{AnimationStyle, FixedStyle, RandomStyles, StyleSelector};
