use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use cast_logging::{cast_error, cast_info, cast_warn};
use scenecast_core::{Effect, JobKind, Msg, PushView, StatusView, Toast, ToastLevel};
use scenecast_runner::{
    JobRunner, Operation, OperationStatus, PushEvent, ResultDownload, StateStore, TransformRequest,
    VideoRequest,
};

use super::app::AppEvent;
use super::persistence;

/// Fixed delay between status polls while a job is awaiting the remote
/// service.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Executes the reconciler's effects against the runner and the store.
pub(crate) struct EffectRunner {
    runner: JobRunner,
    store: Arc<StateStore>,
    event_tx: Sender<AppEvent>,
    output_dir: PathBuf,
    poller: Option<PollTimer>,
}

impl EffectRunner {
    pub(crate) fn new(
        runner: JobRunner,
        store: Arc<StateStore>,
        event_tx: Sender<AppEvent>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            runner,
            store,
            event_tx,
            output_dir,
            poller: None,
        }
    }

    pub(crate) fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistDraft(draft) => persistence::save_draft(&self.store, &draft),
                Effect::StartTransform {
                    source_image,
                    prompt,
                } => {
                    cast_info!("Dispatching transform, prompt_len={}", prompt.len());
                    let ack = self.runner.start_transform(TransformRequest {
                        source_image,
                        prompt,
                        secret: None,
                    });
                    if !ack.started {
                        cast_warn!("Transform start rejected: already in progress");
                    }
                    // Poll regardless of the ack; the store has the truth.
                    self.dispatched(JobKind::Transform);
                }
                Effect::StartVideo {
                    source_image_url,
                    prompt,
                    options,
                } => {
                    cast_info!("Dispatching video generation, duration={}", options.duration);
                    let ack = self.runner.start_video(VideoRequest {
                        source_image_url,
                        prompt,
                        duration: options.duration,
                        generate_audio: options.generate_audio,
                        secret: None,
                    });
                    if !ack.started {
                        cast_warn!("Video start rejected: already in progress");
                    }
                    self.dispatched(JobKind::Video);
                }
                Effect::ReadStatus => {
                    let status = self.runner.status();
                    let _ = self
                        .event_tx
                        .send(AppEvent::Core(Msg::StatusRead(map_status(status))));
                }
                Effect::StartPolling => self.start_polling(),
                Effect::StopPolling => self.stop_polling(),
                Effect::ClearJobState => {
                    if let Err(err) = self.store.clear_operation() {
                        cast_error!("Failed to clear job state: {}", err);
                    }
                }
                Effect::ShowToast(toast) => show_toast(&toast),
                Effect::Download { kind, url } => {
                    let (stem, fallback_ext) = match kind {
                        JobKind::Transform => ("scenecast-image", "png"),
                        JobKind::Video => ("scenecast-video", "mp4"),
                    };
                    self.runner.download(ResultDownload {
                        url,
                        stem: stem.to_string(),
                        fallback_ext: fallback_ext.to_string(),
                        dir: self.output_dir.clone(),
                    });
                }
            }
        }
    }

    fn dispatched(&self, kind: JobKind) {
        let _ = self
            .event_tx
            .send(AppEvent::Core(Msg::StartDispatched { kind }));
    }

    fn start_polling(&mut self) {
        if self.poller.is_none() {
            self.poller = Some(PollTimer::start(self.event_tx.clone()));
        }
    }

    /// Dropping the timer stops and joins its thread; nothing leaks.
    pub(crate) fn stop_polling(&mut self) {
        self.poller = None;
    }
}

/// Sends `Msg::Tick` every [`POLL_INTERVAL`] until stopped. The sleep is
/// sliced so a stop request lands within ~50ms rather than a full interval.
struct PollTimer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PollTimer {
    fn start(event_tx: Sender<AppEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::spawn(move || {
            let mut tick: u64 = 0;
            loop {
                let deadline = Instant::now() + POLL_INTERVAL;
                while Instant::now() < deadline {
                    if flag.load(Ordering::Relaxed) {
                        return;
                    }
                    thread::sleep(Duration::from_millis(50));
                }
                tick += 1;
                cast_logging::set_poll_tick(tick);
                if event_tx.send(AppEvent::Core(Msg::Tick)).is_err() {
                    return;
                }
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn show_toast(toast: &Toast) {
    let tag = match toast.level {
        ToastLevel::Success => "ok",
        ToastLevel::Error => "err",
        ToastLevel::Info => "--",
    };
    println!("[{tag}] {}: {}", toast.title, toast.message);
}

fn map_status(status: OperationStatus) -> StatusView {
    StatusView {
        operation: status.operation.map(map_operation),
        error: status.error,
        transformed_url: status.transformed_url,
        video_url: status.video_url,
    }
}

fn map_operation(operation: Operation) -> JobKind {
    match operation {
        Operation::Transforming => JobKind::Transform,
        Operation::GeneratingVideo => JobKind::Video,
    }
}

pub(crate) fn map_push(event: PushEvent) -> PushView {
    match event {
        PushEvent::TransformComplete {
            success,
            image_url,
            error,
        } => PushView {
            kind: JobKind::Transform,
            success,
            url: image_url,
            error,
        },
        PushEvent::VideoComplete {
            success,
            video_url,
            error,
        } => PushView {
            kind: JobKind::Video,
            success,
            url: video_url,
            error,
        },
    }
}
