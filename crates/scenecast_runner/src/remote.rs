use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JobError;
use crate::record::{TransformRequest, VideoRequest};

const IMAGE_EDIT_URL: &str = "https://fal.run/fal-ai/nano-banana-pro/edit";
const VIDEO_URL: &str = "https://fal.run/fal-ai/veo3.1/fast/image-to-video";

/// Framing applied to every transform prompt: strip the mapping
/// application's chrome and hold the captured viewpoint.
fn framed_edit_prompt(prompt: &str) -> String {
    format!(
        "Remove ALL UI elements from the image. Then: {prompt}. \
         Depict this EXACT viewing angle and distance."
    )
}

/// The two generation endpoints; overridable so tests can point them at a
/// local mock server.
#[derive(Debug, Clone)]
pub struct GenerationEndpoints {
    pub image_edit: String,
    pub video: String,
}

impl Default for GenerationEndpoints {
    fn default() -> Self {
        Self {
            image_edit: IMAGE_EDIT_URL.to_string(),
            video: VIDEO_URL.to_string(),
        }
    }
}

/// The remote generation service, seen as two calls that either return a
/// result URL or a terminal [`JobError`].
#[async_trait]
pub trait GenerationApi: Send + Sync {
    /// Stylizes the captured view; returns the result image URL.
    async fn edit_image(&self, key: &str, request: &TransformRequest)
        -> Result<String, JobError>;

    /// Animates the stylized image; returns the result video URL.
    async fn generate_video(&self, key: &str, request: &VideoRequest)
        -> Result<String, JobError>;
}

#[derive(Serialize)]
struct ImageEditBody<'a> {
    prompt: String,
    image_urls: Vec<&'a str>,
    aspect_ratio: &'static str,
    resolution: &'static str,
}

#[derive(Deserialize)]
struct ImageEditReply {
    #[serde(default)]
    images: Vec<MediaAsset>,
}

#[derive(Serialize)]
struct VideoBody<'a> {
    prompt: &'a str,
    image_url: &'a str,
    duration: &'a str,
    resolution: &'static str,
    generate_audio: bool,
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
struct VideoReply {
    video: Option<MediaAsset>,
}

#[derive(Deserialize)]
struct MediaAsset {
    #[serde(default)]
    url: Option<String>,
}

pub struct ReqwestGenerationApi {
    client: reqwest::Client,
    endpoints: GenerationEndpoints,
}

impl ReqwestGenerationApi {
    pub fn new() -> Self {
        Self::with_endpoints(GenerationEndpoints::default())
    }

    pub fn with_endpoints(endpoints: GenerationEndpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    async fn post_json<B, R>(&self, endpoint: &str, key: &str, body: &B) -> Result<R, JobError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(endpoint)
            .header(AUTHORIZATION, format!("Key {key}"))
            .json(body)
            .send()
            .await
            .map_err(|err| JobError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .as_ref()
                .and_then(extract_error_message)
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            return Err(JobError::RemoteRequest {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|err| JobError::Transport(err.to_string()))
    }
}

impl Default for ReqwestGenerationApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Error bodies carry the human-readable message under `detail` or
/// `message`, depending on the endpoint.
fn extract_error_message(body: &Value) -> Option<String> {
    ["detail", "message"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl GenerationApi for ReqwestGenerationApi {
    async fn edit_image(
        &self,
        key: &str,
        request: &TransformRequest,
    ) -> Result<String, JobError> {
        let body = ImageEditBody {
            prompt: framed_edit_prompt(&request.prompt),
            image_urls: vec![request.source_image.as_str()],
            aspect_ratio: "auto",
            resolution: "2K",
        };
        let reply: ImageEditReply = self
            .post_json(&self.endpoints.image_edit, key, &body)
            .await?;
        reply
            .images
            .into_iter()
            .next()
            .and_then(|asset| asset.url)
            .ok_or(JobError::MissingImageResult)
    }

    async fn generate_video(&self, key: &str, request: &VideoRequest) -> Result<String, JobError> {
        let body = VideoBody {
            prompt: &request.prompt,
            image_url: &request.source_image_url,
            duration: &request.duration,
            resolution: "1080p",
            generate_audio: request.generate_audio,
            aspect_ratio: "auto",
        };
        let reply: VideoReply = self.post_json(&self.endpoints.video, key, &body).await?;
        reply
            .video
            .and_then(|asset| asset.url)
            .ok_or(JobError::MissingVideoResult)
    }
}
