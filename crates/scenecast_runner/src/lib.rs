//! Scenecast runner: durable job-state store, remote generation clients,
//! detached job execution and the best-effort push channel.
mod config;
mod download;
mod error;
mod persist;
mod push;
mod record;
mod remote;
mod runner;
mod store;

pub use config::RunnerConfig;
pub use download::{result_filename, DownloadError, ResultDownload};
pub use error::JobError;
pub use persist::{atomic_write, ensure_output_dir, PersistError};
pub use push::{PushChannel, PushSink};
pub use record::{
    Operation, OperationStatus, PushEvent, StartAck, TransformRequest, VideoRequest,
};
pub use remote::{GenerationApi, GenerationEndpoints, ReqwestGenerationApi};
pub use runner::JobRunner;
pub use store::{DraftFields, StateStore, StoreError, StoredRecord};
