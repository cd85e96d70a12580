//! Export progress: stages, localized messages, and reporters.
//!
//! Progress is reported only at stage and scene boundaries. Reporters must return quickly; the
//! frame loop calls them inline.

use std::sync::mpsc;

use crate::story::model::Language;

/// Where an export currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressStage {
    /// Building the master audio track.
    AudioBuild,
    /// Arming the capture sink.
    CaptureSetup,
    /// About to draw scenes.
    Scenes,
    /// Drawing scene `index` (1-based) of `total`.
    Scene { index: usize, total: usize },
    /// Draining the encoder and assembling the artifact.
    Finalize,
}

impl ProgressStage {
    /// Rough completion percentage; scenes share the 10..95 band equally.
    pub fn percent(self) -> u8 {
        match self {
            ProgressStage::AudioBuild => 0,
            ProgressStage::CaptureSetup => 5,
            ProgressStage::Scenes => 10,
            ProgressStage::Scene { index, total } => {
                let done = index.saturating_sub(1) as f64 / total.max(1) as f64;
                (10.0 + 85.0 * done).round().clamp(10.0, 95.0) as u8
            }
            ProgressStage::Finalize => 95,
        }
    }

    /// Human-readable status line in `language`.
    pub fn message(self, language: Language) -> String {
        use Language::{English, Gujarati, Hindi};
        match (self, language) {
            (ProgressStage::AudioBuild, Gujarati) => "ઑડિયો ટ્રેકને જોડી રહ્યું છે...".into(),
            (ProgressStage::AudioBuild, Hindi) => {
                "ऑडियो ट्रैक को संयोजित किया जा रहा है...".into()
            }
            (ProgressStage::AudioBuild, English) => "Combining the audio track...".into(),

            (ProgressStage::CaptureSetup, Gujarati) => {
                "વીડિયો રેકોર્ડર સેટ કરી રહ્યું છે...".into()
            }
            (ProgressStage::CaptureSetup, Hindi) => {
                "वीडियो रिकॉर्डर स्थापित किया जा रहा है...".into()
            }
            (ProgressStage::CaptureSetup, English) => "Setting up the video recorder...".into(),

            (ProgressStage::Scenes, Gujarati) => "દ્રશ્યો બનાવી રહ્યું છે...".into(),
            (ProgressStage::Scenes, Hindi) => "दृश्य प्रस्तुत किए जा रहे हैं...".into(),
            (ProgressStage::Scenes, English) => "Rendering scenes...".into(),

            (ProgressStage::Scene { index, total }, Gujarati) => {
                format!("દ્રશ્ય {index}/{total} બનાવી રહ્યું છે...")
            }
            (ProgressStage::Scene { index, total }, Hindi) => {
                format!("दृश्य {index}/{total} प्रस्तुत किया जा रहा है...")
            }
            (ProgressStage::Scene { index, total }, English) => {
                format!("Rendering scene {index}/{total}...")
            }

            (ProgressStage::Finalize, Gujarati) => "ફાઇનલ ટચ આપી રહ્યું છે...".into(),
            (ProgressStage::Finalize, Hindi) => "अंतिम रूप दिया जा रहा है...".into(),
            (ProgressStage::Finalize, English) => "Finishing up...".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ProgressEvent {
    #[serde(flatten)]
    pub stage: ProgressStage,
    pub percent: u8,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(stage: ProgressStage, language: Language) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            message: stage.message(language),
        }
    }
}

/// Receives progress events. Fire-and-forget: implementations must not block.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressReporter for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events over an unbounded channel; a dropped receiver is ignored.
#[derive(Debug)]
pub struct ChannelReporter {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    pub fn pair() -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
#[path = "../tests/unit/progress.rs"]
mod tests;
