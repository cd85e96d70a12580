use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{CaptureConfig, CaptureSink, EncodedStream};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelResult, StoryReelError};
use crate::foundation::math::mul_div255_u16;
use crate::render::FrameRGBA;

const STDOUT_CHUNK_BYTES: usize = 64 * 1024;

/// Output container and codec pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// VP9 video + Opus audio.
    #[default]
    WebM,
    /// H.264 video + AAC audio, fragmented so it can be written to a pipe.
    Mp4,
}

impl Container {
    pub fn mime_type(self) -> &'static str {
        match self {
            Container::WebM => "video/webm",
            Container::Mp4 => "video/mp4",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Container::WebM => "webm",
            Container::Mp4 => "mp4",
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for Container {
    type Err = StoryReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webm" => Ok(Container::WebM),
            "mp4" => Ok(Container::Mp4),
            other => Err(StoryReelError::validation(format!(
                "unknown container '{other}' (expected webm or mp4)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FfmpegSinkOpts {
    pub container: Container,
    /// Background used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            container: Container::WebM,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink that spawns the system `ffmpeg`, streams raw frames to its stdin and collects the encoded
/// container from its stdout.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<Vec<u8>>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<CaptureConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    pub fn container(&self) -> Container {
        self.opts.container
    }

    fn build_command(&self, cfg: &CaptureConfig) -> ReelResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input 0: raw RGBA8 frames, flattened to opaque in `push_frame`.
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(StoryReelError::capture_init(
                    "audio sample rate/channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path);
        }

        match self.opts.container {
            Container::WebM => {
                cmd.args([
                    "-c:v",
                    "libvpx-vp9",
                    "-pix_fmt",
                    "yuv420p",
                    "-deadline",
                    "realtime",
                    "-cpu-used",
                    "8",
                    "-b:v",
                    "0",
                    "-crf",
                    "32",
                ]);
                if cfg.audio.is_some() {
                    // Opus only runs at 48k and its integer divisors.
                    cmd.args(["-c:a", "libopus", "-ar", "48000"]);
                } else {
                    cmd.arg("-an");
                }
                cmd.args(["-f", "webm"]);
            }
            Container::Mp4 => {
                cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p"]);
                if cfg.audio.is_some() {
                    cmd.args(["-c:a", "aac"]);
                } else {
                    cmd.arg("-an");
                }
                cmd.args(["-movflags", "frag_keyframe+empty_moov", "-f", "mp4"]);
            }
        }
        cmd.arg("pipe:1");
        Ok(cmd)
    }

    fn release(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!(error = %e, "ffmpeg kill failed (already exited?)");
            }
            let _ = child.wait();
        }
        if let Some(h) = self.stdout_drain.take() {
            let _ = h.join();
        }
        if let Some(h) = self.stderr_drain.take() {
            let _ = h.join();
        }
        self.cfg = None;
        self.last_idx = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.release();
        }
    }
}

impl CaptureSink for FfmpegSink {
    fn arm(&mut self, cfg: CaptureConfig) -> ReelResult<()> {
        if self.child.is_some() {
            return Err(StoryReelError::capture_init("ffmpeg sink is already armed"));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(StoryReelError::capture_init("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(StoryReelError::capture_init(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(StoryReelError::capture_init(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(StoryReelError::capture_init(
                "ffmpeg is required for video capture, but was not found on PATH",
            ));
        }

        let mut child = self.build_command(&cfg)?.spawn().map_err(|e| {
            StoryReelError::capture_init(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let (Some(stdin), Some(mut stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(StoryReelError::capture_init(
                "failed to open ffmpeg stdio pipes (unexpected)",
            ));
        };

        let stdout_drain = std::thread::spawn(move || {
            let mut chunks = Vec::new();
            let mut buf = vec![0u8; STDOUT_CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                chunks.push(buf[..n].to_vec());
            }
            Ok(chunks)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            container = %self.opts.container,
            width = cfg.width,
            height = cfg.height,
            audio = cfg.audio.is_some(),
            "ffmpeg capture armed"
        );

        self.scratch = vec![0u8; Canvas { width: cfg.width, height: cfg.height }.byte_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StoryReelError::encoder("ffmpeg sink is not armed"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(StoryReelError::encoder(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(StoryReelError::encoder(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(StoryReelError::encoder(
                "frame data length does not match width*height*4",
            ));
        }
        self.last_idx = Some(idx);

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba);
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(StoryReelError::encoder("ffmpeg sink is already finalized"));
        };
        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            StoryReelError::encoder(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn finish(&mut self) -> ReelResult<EncodedStream> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| StoryReelError::encoder("ffmpeg sink is not armed"))?;

        let status = child.wait().map_err(|e| {
            StoryReelError::encoder(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(h) => h
                .join()
                .map_err(|_| StoryReelError::encoder("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| StoryReelError::encoder(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        let chunks = match self.stdout_drain.take() {
            Some(h) => h
                .join()
                .map_err(|_| StoryReelError::encoder("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| StoryReelError::encoder(format!("ffmpeg stdout read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;
        self.last_idx = None;

        if !status.success() {
            return Err(StoryReelError::encoder(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }

        Ok(EncodedStream {
            mime_type: self.opts.container.mime_type(),
            extension: self.opts.container.extension(),
            chunks,
        })
    }

    fn abort(&mut self) {
        if self.child.is_some() {
            tracing::debug!("aborting ffmpeg capture");
        }
        self.release();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // rawvideo input takes its rate from `-r` before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(dst: &mut [u8], src_premul: &[u8], bg_rgba: [u8; 4]) {
    let [bg_r, bg_g, bg_b, _] = bg_rgba.map(u16::from);
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
