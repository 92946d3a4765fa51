use std::sync::Once;

use scenecast_core::{
    update, DraftSnapshot, Effect, JobKind, Msg, PushView, ReconcilerState, StatusView, Toast,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(cast_logging::initialize_for_tests);
}

/// Drives a fresh front end through capture, prompt, start and dispatch,
/// leaving the transform kind awaiting the remote service with polling on.
fn awaiting_transform() -> ReconcilerState {
    let (state, _) = update(
        ReconcilerState::new(),
        Msg::Attached {
            draft: DraftSnapshot::default(),
        },
    );
    let (state, _) = update(
        state,
        Msg::ViewCaptured {
            image: "data:image/png;base64,AAAA".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::PromptEdited {
            kind: JobKind::Transform,
            text: "cinematic fjord".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::TransformRequested);
    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::StartTransform { .. })));
    let (state, effects) = update(
        state,
        Msg::StartDispatched {
            kind: JobKind::Transform,
        },
    );
    assert_eq!(effects, vec![Effect::StartPolling]);
    state
}

fn result_status(url: &str) -> StatusView {
    StatusView {
        transformed_url: Some(url.to_string()),
        ..StatusView::default()
    }
}

fn result_push(url: &str) -> PushView {
    PushView {
        kind: JobKind::Transform,
        success: true,
        url: Some(url.to_string()),
        error: None,
    }
}

#[test]
fn tick_reads_status_only_while_awaiting() {
    init_logging();
    let (state, effects) = update(ReconcilerState::new(), Msg::Tick);
    assert!(effects.is_empty());

    let state = {
        let mut state = awaiting_transform();
        state.consume_dirty();
        state
    };
    let (_state, effects) = update(state, Msg::Tick);
    assert_eq!(effects, vec![Effect::ReadStatus]);
}

#[test]
fn poll_then_push_notifies_exactly_once() {
    init_logging();
    let state = awaiting_transform();

    // The poll observes the terminal record first.
    let (state, effects) = update(state, Msg::StatusRead(result_status("https://cdn.example/a.png")));
    assert_eq!(
        effects
            .iter()
            .filter(|effect| matches!(effect, Effect::ShowToast(_)))
            .count(),
        1
    );
    assert!(effects.contains(&Effect::StopPolling));

    // The push delivering the same terminal value must no-op.
    let (_state, effects) = update(state, Msg::PushReceived(result_push("https://cdn.example/a.png")));
    assert!(effects.is_empty());
}

#[test]
fn push_then_poll_notifies_exactly_once() {
    init_logging();
    let state = awaiting_transform();

    let (state, effects) = update(state, Msg::PushReceived(result_push("https://cdn.example/a.png")));
    assert_eq!(
        effects
            .iter()
            .filter(|effect| matches!(effect, Effect::ShowToast(_)))
            .count(),
        1
    );

    // A poll that was already scheduled observes the same record; quiet.
    let (_state, effects) = update(state, Msg::StatusRead(result_status("https://cdn.example/a.png")));
    assert!(effects.is_empty());
}

#[test]
fn failure_push_is_surfaced_once() {
    init_logging();
    let state = awaiting_transform();

    let push = PushView {
        kind: JobKind::Transform,
        success: false,
        url: None,
        error: Some("quota exceeded".to_string()),
    };
    let (state, effects) = update(state, Msg::PushReceived(push.clone()));
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling,
            Effect::ShowToast(Toast::error("Operation Failed", "quota exceeded")),
        ]
    );

    // Same failure observed again via a poll of the stored error: quiet.
    let (_state, effects) = update(
        state,
        Msg::StatusRead(StatusView {
            error: Some("quota exceeded".to_string()),
            ..StatusView::default()
        }),
    );
    assert!(effects.is_empty());
}

#[test]
fn cleared_record_settles_silently() {
    init_logging();
    let state = awaiting_transform();

    // No operation, no result, no error: someone force-cleared the slot.
    let (mut state, effects) = update(state, Msg::StatusRead(StatusView::default()));
    assert_eq!(effects, vec![Effect::StopPolling]);
    assert_eq!(state.view().busy, None);
    assert!(state.view().can_transform);
    assert!(state.consume_dirty());
}

#[test]
fn transform_result_is_checked_before_video() {
    init_logging();
    let state = awaiting_transform();

    // Both kinds carry fresh results; transform wins the first observation,
    // video the next one. The order is fixed, not observation-dependent.
    let both = StatusView {
        transformed_url: Some("https://cdn.example/image.png".to_string()),
        video_url: Some("https://cdn.example/clip.mp4".to_string()),
        ..StatusView::default()
    };
    let (state, effects) = update(state, Msg::StatusRead(both.clone()));
    assert!(effects.contains(&Effect::ShowToast(Toast::success(
        "Transformation Complete",
        "Your stylized image is ready",
    ))));

    let (state, effects) = update(state, Msg::StatusRead(both.clone()));
    assert!(effects.contains(&Effect::ShowToast(Toast::success(
        "Video Generated",
        "Your video is ready",
    ))));

    let (_state, effects) = update(state, Msg::StatusRead(both));
    assert!(effects.is_empty());
}
