//! Scenecast core: pure reconciliation state machine and view-model helpers.
//!
//! The reconciler presents the durable job record consistently across
//! attach/detach cycles of a transient front end. All protocol logic lives
//! in [`update`]; IO is delegated to the caller through [`Effect`]s.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Toast, ToastLevel};
pub use msg::Msg;
pub use state::{
    normalize_result_url, DraftSnapshot, JobKind, JobPhase, PushView, ReconcilerState, StatusView,
    VideoOptions, DEFAULT_VIDEO_PROMPT,
};
pub use update::update;
pub use view_model::ReconcilerView;
