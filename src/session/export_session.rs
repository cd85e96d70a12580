use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use crate::animation::{AnimationPlan, AnimationStyle, RandomStyles, StyleSelector, plan_scene};
use crate::assets::PreparedImage;
use crate::assets::decode::load_image;
use crate::audio::{AudioTimeline, SampleSpan, build_audio_timeline};
use crate::encode::{AudioInputConfig, CaptureConfig, CaptureSink, EncodedStream};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelResult, StoryReelError};
use crate::progress::{NullReporter, ProgressEvent, ProgressReporter, ProgressStage};
use crate::render::{DrawingSurface, FramePacer, FrameRGBA, RealtimePacer, SceneTimeline, Unpaced};
use crate::session::config::ExportConfig;
use crate::story::model::{Language, Scene, Story};

/// Lifecycle of one export.
///
/// `Idle -> Armed -> Recording -> Stopping -> Finalized`, with `Failed` reachable from every
/// non-terminal state. A finished session (either terminal state) may start over from `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    Idle,
    Armed,
    Recording,
    Stopping,
    Finalized,
    Failed,
}

impl ExportState {
    pub fn can_transition_to(self, next: ExportState) -> bool {
        use ExportState::*;
        matches!(
            (self, next),
            (Idle, Armed)
                | (Armed, Recording)
                | (Recording, Stopping)
                | (Stopping, Finalized)
                | (Idle | Armed | Recording | Stopping, Failed)
                | (Finalized | Failed, Idle)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExportState::Finalized | ExportState::Failed)
    }
}

/// Shared flag that stops an export at the next frame boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The finished video, assembled from every encoded chunk in arrival order.
#[derive(Clone, Debug)]
pub struct VideoArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub created_unix_millis: u64,
}

impl VideoArtifact {
    fn from_stream(stream: EncodedStream) -> Self {
        let created_unix_millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        let (mime_type, extension) = (stream.mime_type, stream.extension);
        Self {
            bytes: stream.into_bytes(),
            mime_type,
            extension,
            created_unix_millis,
        }
    }

    /// `story-<unix-millis>.<ext>`
    pub fn suggested_file_name(&self) -> String {
        format!("story-{}.{}", self.created_unix_millis, self.extension)
    }
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct SceneReport {
    pub index: u32,
    pub style: AnimationStyle,
    pub plan: AnimationPlan,
    pub image_width: u32,
    pub image_height: u32,
    /// Global index of the scene's first frame.
    pub first_frame: u64,
    pub frames: u64,
    pub audio_span: SampleSpan,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct ExportReport {
    pub scenes: Vec<SceneReport>,
    pub total_frames: u64,
    pub fps: f64,
    pub audio_samples: u64,
    pub audio_sample_rate: u32,
    pub audio_duration_secs: f64,
}

impl ExportReport {
    pub fn video_duration_secs(&self) -> f64 {
        self.total_frames as f64 / self.fps
    }
}

#[derive(Clone, Debug)]
pub struct ExportOutcome {
    pub artifact: VideoArtifact,
    pub report: ExportReport,
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRGBA,
}

/// Removes the temporary master audio file when dropped.
struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take()
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove temp audio track");
        }
    }
}

/// Turns a [`Story`] into one video: builds the master soundtrack, arms the capture sink, draws
/// every scene's frames in order while an encoder thread feeds them to the sink, then finalizes.
///
/// Any failure after the sink is armed aborts the sink and deletes the temporary audio track
/// before the error is returned; no partial artifact is ever produced.
pub struct ExportSession {
    config: ExportConfig,
    language: Language,
    styles: Box<dyn StyleSelector>,
    pacer: Box<dyn FramePacer>,
    progress: Arc<dyn ProgressReporter>,
    cancel: CancelToken,
    temp_dir: PathBuf,
    state: ExportState,
}

impl std::fmt::Debug for ExportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSession")
            .field("config", &self.config)
            .field("language", &self.language)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ExportSession {
    pub fn new(config: ExportConfig) -> ReelResult<Self> {
        config.validate()?;
        let pacer: Box<dyn FramePacer> = if config.realtime {
            Box::new(RealtimePacer::new(config.fps))
        } else {
            Box::new(Unpaced)
        };
        Ok(Self {
            config,
            language: Language::default(),
            styles: Box::new(RandomStyles::from_entropy()),
            pacer,
            progress: Arc::new(NullReporter),
            cancel: CancelToken::new(),
            temp_dir: std::env::temp_dir(),
            state: ExportState::Idle,
        })
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_styles(mut self, styles: impl StyleSelector + 'static) -> Self {
        self.styles = Box::new(styles);
        self
    }

    pub fn with_pacer(mut self, pacer: impl FramePacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressReporter + 'static) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Directory for the temporary master audio track.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one export into `sink`.
    #[tracing::instrument(
        skip_all,
        fields(scenes = story.len(), language = %self.language, container = %self.config.container)
    )]
    pub fn export(
        &mut self,
        story: &Story,
        sink: &mut dyn CaptureSink,
    ) -> ReelResult<ExportOutcome> {
        if !(self.state == ExportState::Idle || self.state.is_terminal()) {
            return Err(StoryReelError::validation(format!(
                "export already in progress (state {:?})",
                self.state
            )));
        }
        self.state = ExportState::Idle;

        let mut audio_tmp = TempFileGuard(None);
        let result = self.run(story, sink, &mut audio_tmp);
        if let Err(err) = &result {
            sink.abort();
            self.state = ExportState::Failed;
            tracing::warn!(error = %err, "export failed; capture aborted and resources released");
        }
        drop(audio_tmp);
        result
    }

    /// Dry run: plan every scene and lay out frames and audio without drawing or encoding.
    ///
    /// Consumes one style selection per scene, like an export would.
    pub fn plan(&mut self, story: &Story) -> ReelResult<ExportReport> {
        self.config.validate()?;
        let audio = build_audio_timeline(story, self.config.timeline_opts())?;
        let mut scenes = Vec::with_capacity(story.len());
        let mut next_frame = 0u64;
        for (scene, span) in story.scenes().iter().zip(audio.scene_spans()) {
            let (image, timeline) = self.plan_one(scene)?;
            scenes.push(scene_report(scene, &image, &timeline, next_frame, *span));
            next_frame += timeline.frame_count();
        }
        Ok(self.build_report(scenes, next_frame, &audio))
    }

    fn run(
        &mut self,
        story: &Story,
        sink: &mut dyn CaptureSink,
        audio_tmp: &mut TempFileGuard,
    ) -> ReelResult<ExportOutcome> {
        self.config.validate()?;
        self.check_cancelled()?;

        self.enter_stage(ProgressStage::AudioBuild);
        let audio = build_audio_timeline(story, self.config.timeline_opts())?;

        self.check_cancelled()?;
        self.enter_stage(ProgressStage::CaptureSetup);
        let audio_path = self.temp_dir.join(format!(
            "storyreel_audio_{}_{}.f32le",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        audio_tmp.0 = Some(audio_path.clone());
        audio.write_f32le(&audio_path)?;

        let mut surface = DrawingSurface::new(self.config.canvas(), self.config.background_rgba)?;
        sink.arm(CaptureConfig {
            width: self.config.width,
            height: self.config.height,
            fps: self.config.fps,
            audio: Some(AudioInputConfig {
                path: audio_path,
                sample_rate: audio.sample_rate(),
                channels: audio.channels(),
            }),
        })?;
        self.set_state(ExportState::Armed)?;

        self.set_state(ExportState::Recording)?;
        self.enter_stage(ProgressStage::Scenes);
        self.pacer.reset();
        let (scenes, total_frames) = self.record(story, &audio, &mut surface, sink)?;

        self.set_state(ExportState::Stopping)?;
        self.enter_stage(ProgressStage::Finalize);
        let stream = sink.finish()?;
        let artifact = VideoArtifact::from_stream(stream);
        self.set_state(ExportState::Finalized)?;

        let report = self.build_report(scenes, total_frames, &audio);
        tracing::info!(
            frames = report.total_frames,
            video_secs = report.video_duration_secs(),
            audio_secs = report.audio_duration_secs,
            bytes = artifact.bytes.len(),
            "export finalized"
        );
        Ok(ExportOutcome { artifact, report })
    }

    /// Draw every frame while a scoped encoder thread forwards them to the sink in order.
    fn record(
        &mut self,
        story: &Story,
        audio: &AudioTimeline,
        surface: &mut DrawingSurface,
        sink: &mut dyn CaptureSink,
    ) -> ReelResult<(Vec<SceneReport>, u64)> {
        let cap = self.config.channel_capacity.max(1);

        std::thread::scope(|scope| -> ReelResult<(Vec<SceneReport>, u64)> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let sink_ref: &mut dyn CaptureSink = sink;

            let enc = scope.spawn(move || -> ReelResult<u64> {
                let mut pushed = 0u64;
                for msg in rx {
                    sink_ref.push_frame(msg.idx, &msg.frame)?;
                    pushed += 1;
                }
                Ok(pushed)
            });

            let produce_res = self.produce(story, audio, surface, &tx);
            drop(tx);

            let enc_res = enc
                .join()
                .map_err(|_| StoryReelError::encoder("encoder thread panicked"))?;
            // A dead encoder surfaces in the producer as a closed channel; report the cause.
            let pushed = enc_res?;
            let (scenes, total_frames) = produce_res?;
            if pushed != total_frames {
                return Err(StoryReelError::encoder(format!(
                    "encoder accepted {pushed} of {total_frames} frames"
                )));
            }
            Ok((scenes, total_frames))
        })
    }

    fn produce(
        &mut self,
        story: &Story,
        audio: &AudioTimeline,
        surface: &mut DrawingSurface,
        tx: &mpsc::SyncSender<FrameMsg>,
    ) -> ReelResult<(Vec<SceneReport>, u64)> {
        let total = story.len();
        let mut scenes = Vec::with_capacity(total);
        let mut next_frame = 0u64;

        for (i, (scene, span)) in story.scenes().iter().zip(audio.scene_spans()).enumerate() {
            self.check_cancelled()?;
            self.enter_stage(ProgressStage::Scene {
                index: i + 1,
                total,
            });

            let (image, timeline) = self.plan_one(scene)?;
            let paint = surface.prepare(&image)?;
            let first_frame = next_frame;

            for local in 0..timeline.frame_count() {
                self.check_cancelled()?;
                self.pacer.wait_for_frame(next_frame);
                surface.draw(&paint, timeline.rect_at(local))?;
                tx.send(FrameMsg {
                    idx: FrameIndex(next_frame),
                    frame: surface.snapshot(),
                })
                .map_err(|_| StoryReelError::encoder("encoder stopped accepting frames"))?;
                next_frame += 1;
            }

            scenes.push(scene_report(scene, &image, &timeline, first_frame, *span));
        }

        Ok((scenes, next_frame))
    }

    /// Load the scene image, pick a style and lay out the scene's frames.
    fn plan_one(&mut self, scene: &Scene) -> ReelResult<(Arc<PreparedImage>, SceneTimeline)> {
        let image = load_image(&scene.image).map_err(|e| match e {
            StoryReelError::Render(msg) => {
                StoryReelError::render(format!("scene {}: {msg}", scene.index))
            }
            other => other,
        })?;
        let style = self.styles.select(scene.index);
        let plan = plan_scene(
            image.width,
            image.height,
            self.config.canvas(),
            style,
            self.config.planner_opts(),
        )?;
        let timeline = SceneTimeline::new(plan, scene.audio.duration_secs(), self.config.fps)?;
        tracing::debug!(
            scene = scene.index,
            frames = timeline.frame_count(),
            ?style,
            start = ?plan.start,
            end = ?plan.end,
            "scene planned"
        );
        Ok((image, timeline))
    }

    fn build_report(
        &self,
        scenes: Vec<SceneReport>,
        total_frames: u64,
        audio: &AudioTimeline,
    ) -> ExportReport {
        ExportReport {
            scenes,
            total_frames,
            fps: self.config.fps.as_f64(),
            audio_samples: audio.total_samples(),
            audio_sample_rate: audio.sample_rate(),
            audio_duration_secs: audio.duration_secs(),
        }
    }

    fn set_state(&mut self, next: ExportState) -> ReelResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(StoryReelError::validation(format!(
                "invalid export state transition {:?} -> {next:?}",
                self.state
            )));
        }
        tracing::debug!(from = ?self.state, to = ?next, "export state");
        self.state = next;
        Ok(())
    }

    fn enter_stage(&self, stage: ProgressStage) {
        match stage {
            ProgressStage::Scene { index, total } => {
                tracing::debug!(index, total, "rendering scene");
            }
            other => tracing::info!(stage = ?other, "export stage"),
        }
        self.progress.report(ProgressEvent::new(stage, self.language));
    }

    fn check_cancelled(&self) -> ReelResult<()> {
        if self.cancel.is_cancelled() {
            Err(StoryReelError::Cancelled)
        } else {
            Ok(())
        }
    }
}

fn scene_report(
    scene: &Scene,
    image: &PreparedImage,
    timeline: &SceneTimeline,
    first_frame: u64,
    audio_span: SampleSpan,
) -> SceneReport {
    SceneReport {
        index: scene.index,
        style: timeline.plan().style,
        plan: *timeline.plan(),
        image_width: image.width,
        image_height: image.height,
        first_frame,
        frames: timeline.frame_count(),
        audio_span,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/export_session.rs"]
mod tests;
