use std::path::Path;

use anyhow::Context as _;

use crate::animation::PlannerOpts;
use crate::animation::planner::{DEFAULT_PAN_FRACTION, DEFAULT_ZOOM};
use crate::audio::TimelineOpts;
use crate::audio::timeline::MASTER_SAMPLE_RATE;
use crate::encode::Container;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelResult, StoryReelError};

/// Export settings. Every field has a default, so a config file only names what it overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub zoom: f64,
    pub pan_fraction: f64,
    /// Straight-alpha RGBA fill behind every frame.
    pub background_rgba: [u8; 4],
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
    pub container: Container,
    /// Hold each frame until its wall-clock slot instead of drawing as fast as the encoder drains.
    pub realtime: bool,
    /// Frames buffered between the drawing loop and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: Fps { num: 30, den: 1 },
            zoom: DEFAULT_ZOOM,
            pan_fraction: DEFAULT_PAN_FRACTION,
            background_rgba: [0, 0, 0, 255],
            audio_sample_rate: MASTER_SAMPLE_RATE,
            audio_channels: 1,
            container: Container::WebM,
            realtime: false,
            channel_capacity: 4,
        }
    }
}

impl ExportConfig {
    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read export config '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            StoryReelError::validation(format!("invalid export config '{}': {e}", path.display()))
        })
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StoryReelError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(StoryReelError::validation(
                "canvas width/height must be even",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(StoryReelError::validation(
                "canvas width/height must fit in 16 bits",
            ));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        self.planner_opts().validate()?;
        if self.audio_sample_rate == 0 || self.audio_channels == 0 {
            return Err(StoryReelError::validation(
                "audio sample rate/channels must be non-zero",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(StoryReelError::validation(
                "channel capacity must be non-zero",
            ));
        }
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn planner_opts(&self) -> PlannerOpts {
        PlannerOpts {
            zoom: self.zoom,
            pan_fraction: self.pan_fraction,
        }
    }

    pub fn timeline_opts(&self) -> TimelineOpts {
        TimelineOpts {
            sample_rate: self.audio_sample_rate,
            channels: self.audio_channels,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
