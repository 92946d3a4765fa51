use url::Url;

/// Prompt used for video generation when the user leaves the field empty.
pub const DEFAULT_VIDEO_PROMPT: &str = "slow cinematic camera movement";

/// The two supported long-running operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Transform,
    Video,
}

impl JobKind {
    /// Busy text shown while this kind is awaiting the remote service.
    pub fn busy_text(self) -> &'static str {
        match self {
            JobKind::Transform => "Transforming image...",
            JobKind::Video => "Generating video...",
        }
    }
}

/// Per-kind lifecycle of the front end's view of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    /// User issued a start; the runner call has not been dispatched yet.
    LocalPending,
    /// Confirmed in progress via the store or a push; polling.
    AwaitingRemote,
    /// Result or error consumed and surfaced; further observations no-op.
    Settled,
}

impl JobPhase {
    pub fn is_pending(self) -> bool {
        matches!(self, JobPhase::LocalPending | JobPhase::AwaitingRemote)
    }
}

/// A status read of the shared job record, as seen by the reconciler.
///
/// The runner has its own record types; the front end maps them to this
/// shape at the seam.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusView {
    pub operation: Option<JobKind>,
    pub error: Option<String>,
    pub transformed_url: Option<String>,
    pub video_url: Option<String>,
}

/// A push notification from the runner, mapped at the seam like [`StatusView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushView {
    pub kind: JobKind,
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
}

/// Options carried on a video start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOptions {
    pub duration: String,
    pub generate_audio: bool,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            duration: "8s".to_string(),
            generate_audio: true,
        }
    }
}

/// Front-end convenience state persisted across attach/detach cycles.
///
/// The mirrored result URLs exist for instant redisplay and for the
/// idempotent compare; the shared job record stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftSnapshot {
    pub captured_image: Option<String>,
    pub transform_prompt: String,
    pub video_prompt: String,
    pub video_options: VideoOptions,
    pub transformed_url: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilerState {
    pub(crate) draft: DraftSnapshot,
    pub(crate) transform_phase: JobPhase,
    pub(crate) video_phase: JobPhase,
    pub(crate) polling: bool,
    /// Error text already surfaced during this attachment. A stored error is
    /// never cleared by display (that stays runner-side), so this mirror is
    /// what keeps repeat observations quiet.
    pub(crate) surfaced_error: Option<String>,
    /// User dismissed the pending operation. Visibility only; the remote
    /// call's lifecycle is independent and its result is still welcome.
    pub(crate) dismissed: bool,
    dirty: bool,
}

impl ReconcilerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current persisted-draft view of this state, for the persistence effect.
    pub fn draft(&self) -> &DraftSnapshot {
        &self.draft
    }

    pub(crate) fn restore(&mut self, draft: DraftSnapshot) {
        self.draft = draft;
        self.mark_dirty();
    }

    pub(crate) fn phase(&self, kind: JobKind) -> JobPhase {
        match kind {
            JobKind::Transform => self.transform_phase,
            JobKind::Video => self.video_phase,
        }
    }

    pub(crate) fn set_phase(&mut self, kind: JobKind, phase: JobPhase) {
        match kind {
            JobKind::Transform => self.transform_phase = phase,
            JobKind::Video => self.video_phase = phase,
        }
        self.mark_dirty();
    }

    pub(crate) fn any_awaiting(&self) -> bool {
        self.transform_phase == JobPhase::AwaitingRemote
            || self.video_phase == JobPhase::AwaitingRemote
    }

    pub(crate) fn mirror(&self, kind: JobKind) -> Option<&str> {
        match kind {
            JobKind::Transform => self.draft.transformed_url.as_deref(),
            JobKind::Video => self.draft.video_url.as_deref(),
        }
    }

    /// Adopts a newly observed result URL: updates the mirror and settles
    /// the kind. The caller decides which effects accompany the adoption.
    pub(crate) fn adopt_result(&mut self, kind: JobKind, url: String) {
        match kind {
            JobKind::Transform => self.draft.transformed_url = Some(url),
            JobKind::Video => self.draft.video_url = Some(url),
        }
        self.set_phase(kind, JobPhase::Settled);
    }

    pub(crate) fn surface_error(&mut self, message: String) {
        self.surfaced_error = Some(message);
        if self.transform_phase.is_pending() {
            self.transform_phase = JobPhase::Settled;
        }
        if self.video_phase.is_pending() {
            self.video_phase = JobPhase::Settled;
        }
        self.mark_dirty();
    }

    /// Arms a fresh start: the kind goes locally pending and the per-session
    /// dismissal and surfaced-error mirrors are reset so the new job's
    /// outcome is surfaced even if its text matches an old one.
    pub(crate) fn begin_start(&mut self, kind: JobKind) {
        self.set_phase(kind, JobPhase::LocalPending);
        self.dismissed = false;
        self.surfaced_error = None;
    }

    pub(crate) fn dismiss_pending(&mut self) {
        self.dismissed = true;
        if self.transform_phase.is_pending() {
            self.transform_phase = JobPhase::Idle;
        }
        if self.video_phase.is_pending() {
            self.video_phase = JobPhase::Idle;
        }
        self.mark_dirty();
    }

    pub(crate) fn settle_awaiting(&mut self) {
        if self.transform_phase == JobPhase::AwaitingRemote {
            self.transform_phase = JobPhase::Settled;
        }
        if self.video_phase == JobPhase::AwaitingRemote {
            self.video_phase = JobPhase::Settled;
        }
        self.mark_dirty();
    }

    /// Clears the polling flag, reporting whether it was set. Callers emit
    /// `Effect::StopPolling` exactly when this returns true.
    pub(crate) fn take_polling(&mut self) -> bool {
        let was_polling = std::mem::take(&mut self.polling);
        if was_polling {
            self.mark_dirty();
        }
        was_polling
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the state changed since the last call, clearing the
    /// flag. The render loop uses this to coalesce redraws.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Normalizes a result URL for the idempotent compare, so that cosmetic
/// differences (default port, trailing slash on the root path) do not defeat
/// the exactly-once discipline. Unparseable input is compared trimmed.
pub fn normalize_result_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => url.to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

pub(crate) fn urls_equal(mirror: Option<&str>, observed: &str) -> bool {
    match mirror {
        Some(current) => normalize_result_url(current) == normalize_result_url(observed),
        None => false,
    }
}
