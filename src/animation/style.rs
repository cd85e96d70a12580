use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pan/zoom endpoint policy applied to a scene's cover and zoomed windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationStyle {
    /// Cover -> zoomed window shifted right.
    ZoomInPanRight,
    /// Cover -> zoomed window shifted left.
    ZoomInPanLeft,
    /// Zoomed window -> cover.
    ZoomOut,
    /// Cover -> centered zoomed window.
    ZoomInCenter,
}

impl AnimationStyle {
    pub const ALL: [AnimationStyle; 4] = [
        AnimationStyle::ZoomInPanRight,
        AnimationStyle::ZoomInPanLeft,
        AnimationStyle::ZoomOut,
        AnimationStyle::ZoomInCenter,
    ];

    /// Pick a style from a uniform sample in `[0, 1)` using quarter-width buckets.
    ///
    /// Out-of-range samples fall back to `ZoomInCenter`.
    pub fn from_unit(u: f64) -> Self {
        if !(0.0..1.0).contains(&u) {
            AnimationStyle::ZoomInCenter
        } else if u < 0.25 {
            AnimationStyle::ZoomInPanRight
        } else if u < 0.5 {
            AnimationStyle::ZoomInPanLeft
        } else if u < 0.75 {
            AnimationStyle::ZoomOut
        } else {
            AnimationStyle::ZoomInCenter
        }
    }
}

/// Chooses the animation style for each scene, called once per scene in render order.
pub trait StyleSelector: Send {
    fn select(&mut self, scene_index: u32) -> AnimationStyle;
}

/// Every scene gets the same style.
#[derive(Clone, Copy, Debug)]
pub struct FixedStyle(pub AnimationStyle);

impl StyleSelector for FixedStyle {
    fn select(&mut self, _scene_index: u32) -> AnimationStyle {
        self.0
    }
}

/// Uniform random style per scene.
///
/// Seed it for reproducible exports; `from_entropy` is the non-deterministic default.
#[derive(Clone, Debug)]
pub struct RandomStyles<R = StdRng> {
    rng: R,
}

impl RandomStyles<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> RandomStyles<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> StyleSelector for RandomStyles<R> {
    fn select(&mut self, _scene_index: u32) -> AnimationStyle {
        AnimationStyle::ALL[self.rng.gen_range(0..AnimationStyle::ALL.len())]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/style.rs"]
mod tests;
