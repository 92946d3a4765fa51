use pretty_assertions::assert_eq;
use scenecast_runner::{
    GenerationApi, GenerationEndpoints, JobError, ReqwestGenerationApi, TransformRequest,
    VideoRequest,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestGenerationApi {
    ReqwestGenerationApi::with_endpoints(GenerationEndpoints {
        image_edit: format!("{}/edit", server.uri()),
        video: format!("{}/video", server.uri()),
    })
}

fn transform_request() -> TransformRequest {
    TransformRequest {
        source_image: "data:image/png;base64,AAAA".to_string(),
        prompt: "make it a ghibli valley".to_string(),
        secret: None,
    }
}

fn video_request() -> VideoRequest {
    VideoRequest {
        source_image_url: "https://cdn.example/img.png".to_string(),
        prompt: "slow cinematic camera movement".to_string(),
        duration: "8s".to_string(),
        generate_audio: true,
        secret: None,
    }
}

#[tokio::test]
async fn edit_image_returns_the_first_result_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/edit"))
        .and(header("authorization", "Key k-123"))
        .and(body_partial_json(json!({
            "image_urls": ["data:image/png;base64,AAAA"],
            "aspect_ratio": "auto",
            "resolution": "2K",
        })))
        .and(body_string_contains("make it a ghibli valley"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [
                { "url": "https://cdn.example/out.png" },
                { "url": "https://cdn.example/alt.png" }
            ]
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let url = api.edit_image("k-123", &transform_request()).await.unwrap();
    assert_eq!(url, "https://cdn.example/out.png");
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/edit"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "message": "quota exceeded" })),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .edit_image("k-123", &transform_request())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        JobError::RemoteRequest {
            status: 429,
            message: "quota exceeded".to_string(),
        }
    );
    assert_eq!(err.to_string(), "quota exceeded");
}

#[tokio::test]
async fn error_body_detail_takes_precedence() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/edit"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": "image too small",
            "message": "unprocessable",
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .edit_image("k-123", &transform_request())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "image too small");
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_the_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/edit"))
        .respond_with(ResponseTemplate::new(429).set_body_string("<html>teapot</html>"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .edit_image("k-123", &transform_request())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "API error: 429");
}

#[tokio::test]
async fn empty_image_list_is_a_missing_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/edit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "images": [] })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .edit_image("k-123", &transform_request())
        .await
        .unwrap_err();
    assert_eq!(err, JobError::MissingImageResult);
    assert_eq!(err.to_string(), "No image returned from transformation");
}

#[tokio::test]
async fn generate_video_returns_the_video_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/video"))
        .and(header("authorization", "Key k-123"))
        .and(body_partial_json(json!({
            "image_url": "https://cdn.example/img.png",
            "duration": "8s",
            "resolution": "1080p",
            "generate_audio": true,
            "aspect_ratio": "auto",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "video": { "url": "https://cdn.example/clip.mp4" }
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let url = api.generate_video("k-123", &video_request()).await.unwrap();
    assert_eq!(url, "https://cdn.example/clip.mp4");
}

#[tokio::test]
async fn video_reply_without_url_is_a_missing_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "video": {} })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .generate_video("k-123", &video_request())
        .await
        .unwrap_err();
    assert_eq!(err, JobError::MissingVideoResult);
    assert_eq!(err.to_string(), "No video returned from generation");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Nothing listens on this port; the connection is refused immediately.
    let api = ReqwestGenerationApi::with_endpoints(GenerationEndpoints {
        image_edit: "http://127.0.0.1:1/edit".to_string(),
        video: "http://127.0.0.1:1/video".to_string(),
    });

    let err = api
        .edit_image("k-123", &transform_request())
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::Transport(_)));
}
