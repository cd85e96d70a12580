use crate::animation::AnimationPlan;
use crate::foundation::core::{Fps, SourceRect};
use crate::foundation::error::{ReelResult, StoryReelError};

/// Frame schedule for one scene: `round(duration * fps)` frames sweeping the plan's rectangle.
///
/// Frame `i` is drawn at `t = i / frame_count`, so the first frame shows `plan.start` exactly and
/// the last frame stops one step short of `plan.end`.
#[derive(Clone, Copy, Debug)]
pub struct SceneTimeline {
    plan: AnimationPlan,
    frame_count: u64,
}

impl SceneTimeline {
    pub fn new(plan: AnimationPlan, duration_secs: f64, fps: Fps) -> ReelResult<Self> {
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return Err(StoryReelError::asset(
                "scene duration must be finite and positive",
            ));
        }
        Ok(Self {
            plan,
            frame_count: fps.secs_to_frames_round(duration_secs),
        })
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn plan(&self) -> &AnimationPlan {
        &self.plan
    }

    /// Normalized progress of local frame `i` in `[0, 1)`.
    pub fn progress(&self, i: u64) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        i as f64 / self.frame_count as f64
    }

    pub fn rect_at(&self, i: u64) -> SourceRect {
        self.plan.start.lerp(self.plan.end, self.progress(i))
    }

    pub fn rects(&self) -> impl Iterator<Item = SourceRect> + '_ {
        (0..self.frame_count).map(|i| self.rect_at(i))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/timeline.rs"]
mod tests;
