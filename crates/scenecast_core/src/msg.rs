use crate::state::{DraftSnapshot, JobKind, PushView, StatusView, VideoOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Front end attached; restore persisted draft state.
    Attached { draft: DraftSnapshot },
    /// A source view was captured (data URI or URL, treated as opaque).
    ViewCaptured { image: String },
    /// User edited the prompt for a job kind.
    PromptEdited { kind: JobKind, text: String },
    /// User changed the video duration/audio options.
    VideoOptionsEdited { options: VideoOptions },
    /// User asked to stylize the captured view.
    TransformRequested,
    /// User asked to generate a video from the stylized image.
    VideoRequested,
    /// The start call has been handed to the runner. Polling begins here,
    /// regardless of the synchronous acceptance value.
    StartDispatched { kind: JobKind },
    /// Result of a status query against the shared job record.
    StatusRead(StatusView),
    /// Best-effort push from the runner, received while attached.
    PushReceived(PushView),
    /// Poll timer tick.
    Tick,
    /// User dismissed the pending operation. Does not stop the remote call.
    CancelRequested,
    /// User cleared all captured/generated state to start over.
    ResetRequested,
    /// User asked to save a result to disk.
    DownloadRequested { kind: JobKind },
    /// Fallback for placeholder wiring.
    NoOp,
}
