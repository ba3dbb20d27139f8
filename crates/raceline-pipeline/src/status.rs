//! User-facing status lines for a generation request.

use std::fmt;

use crate::types::PipelineError;

/// Shown once an image has been decoded.
pub const LOADED: &str = "Image loaded. Click \u{2018}Generate Racing Line\u{2019}.";
/// Shown while the pipeline runs.
pub const GENERATING: &str = "Generating racing line\u{2026}";
/// Shown after an accepted line has been rendered.
pub const DONE: &str = "Done! Your racing line is ready to download.";
/// Shown when too few centerline points were found.
pub const INSUFFICIENT_DETAIL: &str =
    "Could not detect enough track detail. Try a clearer layout image.";
/// Shown when the image could not be decoded.
pub const LOAD_FAILED: &str = "Could not load that image. Try another file.";

/// How a status line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Informational.
    Ok,
    /// Something went wrong.
    Error,
}

/// Progress of a single generation request, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The image was decoded and is ready to analyze.
    Loaded,
    /// The pipeline is running.
    Generating,
    /// The line was accepted and rendered.
    Done,
    /// The request failed; carries the message to show.
    Failed(String),
}

impl Status {
    /// Status for a failed request.
    #[must_use]
    pub fn from_error(error: &PipelineError) -> Self {
        Self::Failed(error.user_message())
    }

    /// Presentation tone.
    #[must_use]
    pub const fn tone(&self) -> Tone {
        match self {
            Self::Loaded | Self::Generating | Self::Done => Tone::Ok,
            Self::Failed(_) => Tone::Error,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded => f.write_str(LOADED),
            Self::Generating => f.write_str(GENERATING),
            Self::Done => f.write_str(DONE),
            Self::Failed(message) => f.write_str(message),
        }
    }
}
