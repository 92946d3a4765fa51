use serde::{Deserialize, Serialize};
use std::fmt;

/// The in-progress marker stored in the shared job record. Absent means
/// idle. At most one non-none value exists at a time across both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Transforming,
    GeneratingVideo,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Transforming => "transforming",
            Operation::GeneratingVideo => "generating_video",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to a status query: a pure read of the job slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationStatus {
    pub operation: Option<Operation>,
    pub error: Option<String>,
    pub transformed_url: Option<String>,
    pub video_url: Option<String>,
}

/// Synchronous answer to a start request. Acceptance only, never completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartAck {
    pub started: bool,
}

/// Best-effort completion event pushed to an attached front end. The
/// durable store is the only guaranteed delivery channel; these exist to
/// shave latency off the happy path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    TransformComplete {
        success: bool,
        image_url: Option<String>,
        error: Option<String>,
    },
    VideoComplete {
        success: bool,
        video_url: Option<String>,
        error: Option<String>,
    },
}

/// Start request for an image transform job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    /// Captured source view, as a data URI or URL. Opaque to the runner.
    pub source_image: String,
    pub prompt: String,
    /// Per-request secret; a preconfigured key takes precedence.
    pub secret: Option<String>,
}

/// Start request for a video generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    pub source_image_url: String,
    pub prompt: String,
    pub duration: String,
    pub generate_audio: bool,
    pub secret: Option<String>,
}
