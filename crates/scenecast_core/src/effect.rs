use crate::state::{DraftSnapshot, JobKind, VideoOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the draft snapshot (prompts, captured image, result mirrors).
    PersistDraft(DraftSnapshot),
    /// Ask the runner to start an image transform.
    StartTransform { source_image: String, prompt: String },
    /// Ask the runner to start a video generation.
    StartVideo {
        source_image_url: String,
        prompt: String,
        options: VideoOptions,
    },
    /// Query the shared job record; the reply arrives as `Msg::StatusRead`.
    ReadStatus,
    /// Start the fixed-interval poll timer.
    StartPolling,
    /// Stop the poll timer without leaking it.
    StopPolling,
    /// Force-clear the shared operation/error slots (user cancel).
    ClearJobState,
    /// Surface a transient notification.
    ShowToast(Toast),
    /// Save a result URL to disk.
    Download { kind: JobKind, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub level: ToastLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

impl Toast {
    pub fn success(title: &str, message: &str) -> Self {
        Self::new(title, message, ToastLevel::Success)
    }

    pub fn error(title: &str, message: &str) -> Self {
        Self::new(title, message, ToastLevel::Error)
    }

    pub fn info(title: &str, message: &str) -> Self {
        Self::new(title, message, ToastLevel::Info)
    }

    fn new(title: &str, message: &str, level: ToastLevel) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            level,
        }
    }
}
