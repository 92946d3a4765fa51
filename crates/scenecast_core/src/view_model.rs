use crate::state::{JobKind, ReconcilerState};

/// Flat, render-ready projection of the reconciler state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcilerView {
    pub captured_image: Option<String>,
    pub transformed_url: Option<String>,
    pub video_url: Option<String>,
    pub transform_prompt: String,
    pub video_prompt: String,
    pub video_duration: String,
    pub generate_audio: bool,
    /// Busy text while a job is awaiting the remote service, if any.
    pub busy: Option<&'static str>,
    pub can_transform: bool,
    pub can_generate_video: bool,
    pub show_reset: bool,
    /// 1 = capture, 2 = transform, 3 = video; mirrors the stepper.
    pub step: u8,
}

impl ReconcilerState {
    pub fn view(&self) -> ReconcilerView {
        let draft = self.draft();
        let busy = if self.phase(JobKind::Transform).is_pending() {
            Some(JobKind::Transform.busy_text())
        } else if self.phase(JobKind::Video).is_pending() {
            Some(JobKind::Video.busy_text())
        } else {
            None
        };
        let step = if draft.transformed_url.is_some() {
            3
        } else if draft.captured_image.is_some() {
            2
        } else {
            1
        };
        ReconcilerView {
            captured_image: draft.captured_image.clone(),
            transformed_url: draft.transformed_url.clone(),
            video_url: draft.video_url.clone(),
            transform_prompt: draft.transform_prompt.clone(),
            video_prompt: draft.video_prompt.clone(),
            video_duration: draft.video_options.duration.clone(),
            generate_audio: draft.video_options.generate_audio,
            busy,
            can_transform: draft.captured_image.is_some()
                && !self.phase(JobKind::Transform).is_pending(),
            can_generate_video: draft.transformed_url.is_some()
                && !self.phase(JobKind::Video).is_pending(),
            show_reset: draft.captured_image.is_some()
                || draft.transformed_url.is_some()
                || draft.video_url.is_some(),
            step,
        }
    }
}
