use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelResult, StoryReelError};
use crate::render::FrameRGBA;

/// Configuration handed to a [`CaptureSink`] when capture is armed.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Master soundtrack, muxed alongside the frames.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that mux audio.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Interleaved `f32le` PCM file.
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Encoded output collected from a sink, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct EncodedStream {
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub chunks: Vec<Vec<u8>>,
}

impl EncodedStream {
    pub fn total_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Concatenate every chunk into one buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_len());
        for chunk in self.chunks {
            out.extend_from_slice(&chunk);
        }
        out
    }
}

/// Consumer of the export's frame stream.
///
/// Lifecycle: `arm` once, `push_frame` in strictly increasing index order, then exactly one of
/// `finish` or `abort`. `abort` must release every resource the sink holds and discard whatever
/// it has collected; it is also valid before `arm` or after a failed `finish`.
pub trait CaptureSink: Send {
    fn arm(&mut self, cfg: CaptureConfig) -> ReelResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Flush and return the encoded stream.
    fn finish(&mut self) -> ReelResult<EncodedStream>;
    fn abort(&mut self);
}

/// Sink that keeps everything in memory, for tests and dry runs.
///
/// `finish` yields one raw RGBA chunk per frame (when pixels are kept).
#[derive(Debug)]
pub struct InMemorySink {
    keep_pixels: bool,
    cfg: Option<CaptureConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    indices: Vec<FrameIndex>,
    audio: Vec<f32>,
    finished: bool,
    aborted: bool,
}

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    pub fn new() -> Self {
        Self {
            keep_pixels: true,
            cfg: None,
            frames: Vec::new(),
            indices: Vec::new(),
            audio: Vec::new(),
            finished: false,
            aborted: false,
        }
    }

    /// Record frame indices only; pixel data is dropped on arrival.
    pub fn indices_only() -> Self {
        Self {
            keep_pixels: false,
            ..Self::new()
        }
    }

    pub fn config(&self) -> Option<&CaptureConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    pub fn frame_indices(&self) -> &[FrameIndex] {
        &self.indices
    }

    /// Audio samples read from the armed audio input.
    pub fn audio_samples(&self) -> &[f32] {
        &self.audio
    }

    /// Audio length in sample frames.
    pub fn audio_frames(&self) -> u64 {
        let channels = self
            .cfg
            .as_ref()
            .and_then(|c| c.audio.as_ref())
            .map_or(1, |a| usize::from(a.channels.max(1)));
        (self.audio.len() / channels) as u64
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl CaptureSink for InMemorySink {
    fn arm(&mut self, cfg: CaptureConfig) -> ReelResult<()> {
        self.frames.clear();
        self.indices.clear();
        self.audio.clear();
        self.finished = false;
        self.aborted = false;

        if let Some(audio) = cfg.audio.as_ref() {
            let bytes = std::fs::read(&audio.path).map_err(|e| {
                StoryReelError::capture_init(format!(
                    "failed to read audio input '{}': {e}",
                    audio.path.display()
                ))
            })?;
            if !bytes.len().is_multiple_of(4) {
                return Err(StoryReelError::capture_init(
                    "audio input length is not a whole number of f32 samples",
                ));
            }
            self.audio = bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
        }
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let Some(cfg) = self.cfg.as_ref() else {
            return Err(StoryReelError::encoder("in-memory sink is not armed"));
        };
        if self.finished || self.aborted {
            return Err(StoryReelError::encoder("in-memory sink is already closed"));
        }
        if let Some(last) = self.indices.last()
            && idx <= *last
        {
            return Err(StoryReelError::encoder(format!(
                "frame {} arrived after frame {}",
                idx.0, last.0
            )));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(StoryReelError::encoder(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        self.indices.push(idx);
        if self.keep_pixels {
            self.frames.push((idx, frame.clone()));
        }
        Ok(())
    }

    fn finish(&mut self) -> ReelResult<EncodedStream> {
        if self.cfg.is_none() {
            return Err(StoryReelError::encoder("in-memory sink is not armed"));
        }
        self.finished = true;
        Ok(EncodedStream {
            mime_type: "application/octet-stream",
            extension: "rgba",
            chunks: self.frames.iter().map(|(_, f)| f.data.clone()).collect(),
        })
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.indices.clear();
        self.frames.clear();
        self.audio.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
