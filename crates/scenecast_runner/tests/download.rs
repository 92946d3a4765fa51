use std::fs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use scenecast_runner::{
    atomic_write, ensure_output_dir, result_filename, GenerationApi, JobError, JobRunner,
    PushChannel, ResultDownload, RunnerConfig, StateStore, TransformRequest, VideoRequest,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn filenames_are_deterministic_per_url() {
    let a = result_filename("scenecast-image", "https://cdn.example/out.png", "png");
    let b = result_filename("scenecast-image", "https://cdn.example/out.png", "png");
    let c = result_filename("scenecast-image", "https://cdn.example/other.png", "png");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.starts_with("scenecast-image--"));
    assert!(a.ends_with(".png"));
}

#[test]
fn extension_comes_from_the_url_path() {
    let name = result_filename(
        "scenecast-video",
        "https://cdn.example/v1/clip.mp4?signature=abc",
        "bin",
    );
    assert!(name.ends_with(".mp4"));

    // No usable extension in the path: fall back.
    let name = result_filename("scenecast-video", "https://cdn.example/v1/clip", "mp4");
    assert!(name.ends_with(".mp4"));
}

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_content() {
    let temp = TempDir::new().unwrap();

    let first = atomic_write(temp.path(), "result.png", b"hello").unwrap();
    assert_eq!(fs::read(&first).unwrap(), b"hello");

    let second = atomic_write(temp.path(), "result.png", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"world");
}

#[test]
fn no_partial_file_when_the_target_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = atomic_write(&file_path, "result.png", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("result.png").exists());
}

/// The runner never generates in this test; downloads only.
struct NoJobsApi;

#[async_trait]
impl GenerationApi for NoJobsApi {
    async fn edit_image(
        &self,
        _key: &str,
        _request: &TransformRequest,
    ) -> Result<String, JobError> {
        Err(JobError::Transport("not under test".to_string()))
    }

    async fn generate_video(
        &self,
        _key: &str,
        _request: &VideoRequest,
    ) -> Result<String, JobError> {
        Err(JobError::Transport("not under test".to_string()))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn download_fetches_and_stores_the_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4data".to_vec()))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let store = Arc::new(StateStore::open(temp.path()).unwrap());
    let push = Arc::new(PushChannel::new());
    let runner = JobRunner::new(Arc::new(NoJobsApi), store, push, RunnerConfig::default());

    let url = format!("{}/clip.mp4", server.uri());
    let output_dir = temp.path().join("output");
    runner.download(ResultDownload {
        url: url.clone(),
        stem: "scenecast-video".to_string(),
        fallback_ext: "mp4".to_string(),
        dir: output_dir.clone(),
    });

    let expected = output_dir.join(result_filename("scenecast-video", &url, "mp4"));
    for _ in 0..500 {
        if expected.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(fs::read(&expected).unwrap(), b"mp4data");
}
