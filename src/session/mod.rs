//! Export orchestration: configuration and the export session state machine.

pub mod config;
pub mod export_session;

pub use config::ExportConfig;
pub use export_session::{
    CancelToken, ExportOutcome, ExportReport, ExportSession, ExportState, SceneReport,
    VideoArtifact,
};
