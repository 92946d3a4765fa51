use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread;

use cast_logging::{cast_error, cast_info, cast_warn};

use crate::config::RunnerConfig;
use crate::download::{self, ResultDownload};
use crate::error::JobError;
use crate::push::PushSink;
use crate::record::{
    Operation, OperationStatus, PushEvent, StartAck, TransformRequest, VideoRequest,
};
use crate::remote::GenerationApi;
use crate::store::StateStore;

enum RunnerCommand {
    Transform { request: TransformRequest, key: String },
    Video { request: VideoRequest, key: String },
    Download(ResultDownload),
}

enum Accept {
    /// A job of this kind is already in progress; nothing was mutated.
    Rejected,
    /// Accepted, but failed before touching the transport (no credential).
    FailedSynchronously,
    /// Accepted with a resolved credential; in-progress marker written.
    Go(String),
}

/// Executes at most one long-running remote operation per kind, tracks its
/// lifecycle in the durable store, and best-effort notifies an attached
/// front end.
///
/// Start calls return an acceptance immediately; the remote call runs as a
/// detached task on a worker-thread-owned runtime and outlives any front
/// end, including the `JobRunner` caller's interest in the outcome. The
/// terminal store write is the only guaranteed completion channel.
pub struct JobRunner {
    inner: Arc<RunnerInner>,
    cmd_tx: Sender<RunnerCommand>,
}

struct RunnerInner {
    api: Arc<dyn GenerationApi>,
    store: Arc<StateStore>,
    push: Arc<dyn PushSink>,
    config: RunnerConfig,
}

impl JobRunner {
    pub fn new(
        api: Arc<dyn GenerationApi>,
        store: Arc<StateStore>,
        push: Arc<dyn PushSink>,
        config: RunnerConfig,
    ) -> Self {
        let (cmd_tx, cmd_rx) = channel::<RunnerCommand>();
        let inner = Arc::new(RunnerInner {
            api,
            store,
            push,
            config,
        });

        let worker = inner.clone();
        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let inner = worker.clone();
                runtime.spawn(async move { inner.execute(command).await });
            }
        });

        Self { inner, cmd_tx }
    }

    /// Pure read of the shared job slots; no side effects.
    pub fn status(&self) -> OperationStatus {
        self.inner.store.status()
    }

    pub fn start_transform(&self, request: TransformRequest) -> StartAck {
        match self.accept(Operation::Transforming, request.secret.as_deref()) {
            Accept::Rejected => StartAck { started: false },
            Accept::FailedSynchronously => StartAck { started: true },
            Accept::Go(key) => {
                let _ = self.cmd_tx.send(RunnerCommand::Transform { request, key });
                StartAck { started: true }
            }
        }
    }

    pub fn start_video(&self, request: VideoRequest) -> StartAck {
        match self.accept(Operation::GeneratingVideo, request.secret.as_deref()) {
            Accept::Rejected => StartAck { started: false },
            Accept::FailedSynchronously => StartAck { started: true },
            Accept::Go(key) => {
                let _ = self.cmd_tx.send(RunnerCommand::Video { request, key });
                StartAck { started: true }
            }
        }
    }

    /// Saves a result URL to disk, detached like the jobs themselves.
    pub fn download(&self, request: ResultDownload) {
        let _ = self.cmd_tx.send(RunnerCommand::Download(request));
    }

    fn accept(&self, operation: Operation, secret: Option<&str>) -> Accept {
        if self.inner.store.status().operation == Some(operation) {
            cast_warn!("{} already in progress; start rejected", operation);
            return Accept::Rejected;
        }
        let Some(key) = self.inner.config.resolve_key(secret) else {
            self.inner.record_failure(&JobError::MissingApiKey);
            return Accept::FailedSynchronously;
        };
        if let Err(err) = self.inner.store.begin_operation(operation) {
            cast_error!("Failed to record {} start: {}", operation, err);
        }
        Accept::Go(key)
    }
}

impl RunnerInner {
    async fn execute(&self, command: RunnerCommand) {
        match command {
            RunnerCommand::Transform { request, key } => self.run_transform(request, key).await,
            RunnerCommand::Video { request, key } => self.run_video(request, key).await,
            RunnerCommand::Download(request) => download::run(request).await,
        }
    }

    async fn run_transform(&self, request: TransformRequest, key: String) {
        cast_info!("Starting background transform");
        match self.api.edit_image(&key, &request).await {
            Ok(url) => {
                if let Err(err) = self.store.complete_transform(url.clone()) {
                    cast_error!("Failed to persist transform result: {}", err);
                }
                self.push.deliver(PushEvent::TransformComplete {
                    success: true,
                    image_url: Some(url),
                    error: None,
                });
            }
            Err(job_err) => {
                let message = job_err.to_string();
                cast_warn!("Transform failed: {}", message);
                self.record_failure(&job_err);
                self.push.deliver(PushEvent::TransformComplete {
                    success: false,
                    image_url: None,
                    error: Some(message),
                });
            }
        }
    }

    async fn run_video(&self, request: VideoRequest, key: String) {
        cast_info!("Starting background video generation");
        match self.api.generate_video(&key, &request).await {
            Ok(url) => {
                if let Err(err) = self.store.complete_video(url.clone()) {
                    cast_error!("Failed to persist video result: {}", err);
                }
                self.push.deliver(PushEvent::VideoComplete {
                    success: true,
                    video_url: Some(url),
                    error: None,
                });
            }
            Err(job_err) => {
                let message = job_err.to_string();
                cast_warn!("Video generation failed: {}", message);
                self.record_failure(&job_err);
                self.push.deliver(PushEvent::VideoComplete {
                    success: false,
                    video_url: None,
                    error: Some(message),
                });
            }
        }
    }

    fn record_failure(&self, error: &JobError) {
        if let Err(err) = self.store.fail_operation(error.to_string()) {
            cast_error!("Failed to persist job error: {}", err);
        }
    }
}
