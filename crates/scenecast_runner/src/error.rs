use thiserror::Error;

/// Terminal failure of one job attempt. All variants are recorded
/// identically in the shared error slot; the front end only displays the
/// message and re-enables its controls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// No usable credential at job-start time. Synchronous; the transport
    /// is never touched.
    #[error("No API key configured")]
    MissingApiKey,
    /// Non-success status from a generation endpoint. The message is taken
    /// from the error body when one is present, else `API error: <status>`.
    #[error("{message}")]
    RemoteRequest { status: u16, message: String },
    /// Success status but the expected result field was absent.
    #[error("No image returned from transformation")]
    MissingImageResult,
    /// Success status but the expected result field was absent.
    #[error("No video returned from generation")]
    MissingVideoResult,
    /// Network failure reaching the remote API.
    #[error("{0}")]
    Transport(String),
}
