use std::time::{Duration, Instant};

use crate::foundation::core::Fps;

/// Decides when the next frame may be drawn.
pub trait FramePacer: Send {
    /// Block until frame `n` (0-based, counted across the whole export) is due.
    fn wait_for_frame(&mut self, n: u64);

    /// Forget any clock state so the next export starts its own timeline at frame 0.
    fn reset(&mut self) {}
}

/// Draw frames as fast as the encoder accepts them.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unpaced;

impl FramePacer for Unpaced {
    fn wait_for_frame(&mut self, _n: u64) {}
}

/// Holds frame `n` until `origin + n * interval`, where `origin` is the first call after
/// construction or `reset`.
///
/// Deadlines are absolute, so a slow frame shortens the following wait instead of shifting every
/// later frame.
#[derive(Clone, Debug)]
pub struct RealtimePacer {
    interval: Duration,
    origin: Option<Instant>,
}

impl RealtimePacer {
    pub fn new(fps: Fps) -> Self {
        Self {
            interval: fps.frame_interval(),
            origin: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn deadline(&self, origin: Instant, n: u64) -> Instant {
        let nanos = self.interval.as_nanos().saturating_mul(u128::from(n));
        origin + Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl FramePacer for RealtimePacer {
    fn wait_for_frame(&mut self, n: u64) {
        let origin = *self.origin.get_or_insert_with(Instant::now);
        let deadline = self.deadline(origin, n);
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }

    fn reset(&mut self) {
        self.origin = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pacer.rs"]
mod tests;
