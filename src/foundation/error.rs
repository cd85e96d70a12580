use crate::story::model::Language;

/// Convenience result type used across storyreel.
pub type ReelResult<T> = Result<T, StoryReelError>;

/// Error taxonomy for story export.
///
/// Every failure inside an export is funneled into exactly one of these values at the session
/// boundary; callers never observe a partially finished artifact.
#[derive(thiserror::Error, Debug)]
pub enum StoryReelError {
    /// Invalid configuration or caller-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// A scene's audio or image is missing or invalid at pipeline entry.
    #[error("asset error: {0}")]
    Asset(String),

    /// The drawing surface capture or the encoder could not be created.
    #[error("capture init error: {0}")]
    CaptureInit(String),

    /// A scene failed while it was being rendered (e.g. its image failed to decode).
    #[error("render error: {0}")]
    Render(String),

    /// The encoder reported a failure while frames were streaming or during finalization.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// The export was cancelled through its cancellation token.
    #[error("export cancelled")]
    Cancelled,

    /// Wrapped lower-level failure (I/O, decoding) carrying its own context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    pub fn capture_init(msg: impl Into<String>) -> Self {
        Self::CaptureInit(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Single generic, localized message shown to the user for any export failure.
    pub fn user_message(&self, language: Language) -> &'static str {
        match language {
            Language::Gujarati => {
                "માફ કરશો, કંઈક ખોટું થયું. કૃપા કરીને ફરી પ્રયાસ કરો."
            }
            Language::Hindi => "क्षमा करें, कुछ गलत हो गया। कृपया पुन: प्रयास करें।",
            Language::English => "Sorry, something went wrong. Please try again.",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
