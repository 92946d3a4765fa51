use crate::state::{urls_equal, JobKind, JobPhase, PushView, ReconcilerState, StatusView};
use crate::{DraftSnapshot, Effect, Msg, Toast, DEFAULT_VIDEO_PROMPT};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ReconcilerState, msg: Msg) -> (ReconcilerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Attached { draft } => {
            state.restore(draft);
            // The store has the last word; a job may have settled while the
            // front end was away.
            vec![Effect::ReadStatus]
        }
        Msg::ViewCaptured { image } => {
            state.draft.captured_image = Some(image);
            state.mark_dirty();
            vec![
                Effect::PersistDraft(state.draft().clone()),
                Effect::ShowToast(Toast::success(
                    "View Captured",
                    "Now add a transformation prompt",
                )),
            ]
        }
        Msg::PromptEdited { kind, text } => {
            match kind {
                JobKind::Transform => state.draft.transform_prompt = text,
                JobKind::Video => state.draft.video_prompt = text,
            }
            state.mark_dirty();
            vec![Effect::PersistDraft(state.draft().clone())]
        }
        Msg::VideoOptionsEdited { options } => {
            state.draft.video_options = options;
            state.mark_dirty();
            vec![Effect::PersistDraft(state.draft().clone())]
        }
        Msg::TransformRequested => {
            if state.phase(JobKind::Transform).is_pending() {
                return (state, Vec::new());
            }
            let prompt = state.draft.transform_prompt.trim().to_string();
            if prompt.is_empty() {
                return (
                    state,
                    vec![Effect::ShowToast(Toast::error(
                        "Prompt Required",
                        "Describe how to transform the image",
                    ))],
                );
            }
            let Some(source_image) = state.draft.captured_image.clone() else {
                return (
                    state,
                    vec![Effect::ShowToast(Toast::error(
                        "Nothing Captured",
                        "Capture a view first",
                    ))],
                );
            };
            state.draft.transform_prompt = prompt.clone();
            state.begin_start(JobKind::Transform);
            vec![
                Effect::PersistDraft(state.draft().clone()),
                Effect::StartTransform {
                    source_image,
                    prompt,
                },
            ]
        }
        Msg::VideoRequested => {
            if state.phase(JobKind::Video).is_pending() {
                return (state, Vec::new());
            }
            let Some(source_image_url) = state.draft.transformed_url.clone() else {
                return (
                    state,
                    vec![Effect::ShowToast(Toast::error(
                        "No Image",
                        "Transform an image first",
                    ))],
                );
            };
            let mut prompt = state.draft.video_prompt.trim().to_string();
            if prompt.is_empty() {
                prompt = DEFAULT_VIDEO_PROMPT.to_string();
            }
            state.draft.video_prompt = prompt.clone();
            state.begin_start(JobKind::Video);
            vec![
                Effect::PersistDraft(state.draft().clone()),
                Effect::StartVideo {
                    source_image_url,
                    prompt,
                    options: state.draft.video_options.clone(),
                },
            ]
        }
        Msg::StartDispatched { kind } => {
            if state.phase(kind) != JobPhase::LocalPending {
                return (state, Vec::new());
            }
            state.set_phase(kind, JobPhase::AwaitingRemote);
            if state.polling {
                Vec::new()
            } else {
                state.polling = true;
                vec![Effect::StartPolling]
            }
        }
        Msg::StatusRead(status) => apply_status(&mut state, status),
        Msg::PushReceived(push) => apply_push(&mut state, push),
        Msg::Tick => {
            if !state.polling {
                Vec::new()
            } else if state.any_awaiting() {
                vec![Effect::ReadStatus]
            } else {
                state.take_polling();
                vec![Effect::StopPolling]
            }
        }
        Msg::CancelRequested => {
            let pending = state.phase(JobKind::Transform).is_pending()
                || state.phase(JobKind::Video).is_pending();
            if !pending && !state.polling {
                return (state, Vec::new());
            }
            state.dismiss_pending();
            let mut effects = vec![Effect::ClearJobState];
            if state.take_polling() {
                effects.push(Effect::StopPolling);
            }
            effects.push(Effect::ShowToast(Toast::info(
                "Cancelled",
                "Operation dismissed",
            )));
            effects
        }
        Msg::ResetRequested => {
            state.draft = DraftSnapshot::default();
            state.transform_phase = JobPhase::Idle;
            state.video_phase = JobPhase::Idle;
            state.surfaced_error = None;
            state.dismissed = false;
            state.mark_dirty();
            let mut effects = vec![
                Effect::PersistDraft(state.draft().clone()),
                Effect::ClearJobState,
            ];
            if state.take_polling() {
                effects.push(Effect::StopPolling);
            }
            effects.push(Effect::ShowToast(Toast::success(
                "Reset Complete",
                "Ready to capture a new view",
            )));
            effects
        }
        Msg::DownloadRequested { kind } => match state.mirror(kind) {
            Some(url) => vec![Effect::Download {
                kind,
                url: url.to_string(),
            }],
            None => vec![Effect::ShowToast(Toast::error(
                "Nothing to Download",
                "Generate content first",
            ))],
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Applies an observation of the shared job record. The check order is fixed
/// and reproducible: transform result, video result, error, in-progress,
/// degenerate clear. The mirror compare makes repeat observations of the
/// same terminal value no-ops, which is what enforces exactly-once
/// notification without a lock on the store.
fn apply_status(state: &mut ReconcilerState, status: StatusView) -> Vec<Effect> {
    if let Some(url) = status.transformed_url {
        if !urls_equal(state.mirror(JobKind::Transform), &url) {
            return adopt(state, JobKind::Transform, url);
        }
    }
    if let Some(url) = status.video_url {
        if !urls_equal(state.mirror(JobKind::Video), &url) {
            return adopt(state, JobKind::Video, url);
        }
    }
    if let Some(error) = status.error {
        return surface(state, error);
    }
    match status.operation {
        Some(kind) => {
            // A dismissed operation stays dismissed: the busy UI is not
            // resurrected, though its terminal result above is still welcome.
            if state.dismissed {
                return Vec::new();
            }
            state.set_phase(kind, JobPhase::AwaitingRemote);
            if state.polling {
                Vec::new()
            } else {
                state.polling = true;
                vec![Effect::StartPolling]
            }
        }
        None => {
            if !state.any_awaiting() {
                return Vec::new();
            }
            // No operation, no new result, no error while we were waiting:
            // the slot was cleared out from under us. Settle quietly.
            state.settle_awaiting();
            if state.take_polling() {
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
    }
}

/// Push deliveries apply the same rules as a poll observation; whichever of
/// the two sees a terminal value first wins, and the other no-ops.
fn apply_push(state: &mut ReconcilerState, push: PushView) -> Vec<Effect> {
    if push.success {
        match push.url {
            Some(url) if !urls_equal(state.mirror(push.kind), &url) => {
                adopt(state, push.kind, url)
            }
            _ => Vec::new(),
        }
    } else {
        match push.error {
            Some(error) => surface(state, error),
            None => Vec::new(),
        }
    }
}

fn adopt(state: &mut ReconcilerState, kind: JobKind, url: String) -> Vec<Effect> {
    let was_polling = state.take_polling();
    state.adopt_result(kind, url);
    let mut effects = vec![Effect::PersistDraft(state.draft().clone())];
    if was_polling {
        effects.push(Effect::StopPolling);
    }
    effects.push(Effect::ShowToast(match kind {
        JobKind::Transform => {
            Toast::success("Transformation Complete", "Your stylized image is ready")
        }
        JobKind::Video => Toast::success("Video Generated", "Your video is ready"),
    }));
    effects
}

fn surface(state: &mut ReconcilerState, error: String) -> Vec<Effect> {
    if state.surfaced_error.as_deref() == Some(error.as_str()) {
        return Vec::new();
    }
    let was_polling = state.take_polling();
    state.surface_error(error.clone());
    let mut effects = Vec::new();
    if was_polling {
        effects.push(Effect::StopPolling);
    }
    effects.push(Effect::ShowToast(Toast::error("Operation Failed", &error)));
    effects
}
