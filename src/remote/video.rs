//! HTTP implementation of `VideoApi`

use super::error::RemoteError;
use super::models::*;
use super::traits::{RemoteResult, VideoApi};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Default base URL of the video-generation service
pub const DEFAULT_VIDEO_API_URL: &str = "https://tavusapi.com/v2";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the external video-generation REST API.
///
/// Every request carries the `x-api-key` header. Construct only when a key
/// is configured; without one the job engine runs in simulated mode instead.
#[derive(Clone)]
pub struct HttpVideoApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpVideoApi {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn video_url(&self, video_id: Option<&str>) -> String {
        match video_id {
            Some(id) => format!("{}/videos/{}", self.base_url, id),
            None => format!("{}/videos", self.base_url),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> RemoteResult<reqwest::Response> {
        let response = req.header("x-api-key", &self.api_key).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or(body);
        Err(RemoteError::from_status(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> RemoteResult<T> {
        self.send(req)
            .await?
            .json::<T>()
            .await
            .map_err(|e| RemoteError::decode(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl VideoApi for HttpVideoApi {
    async fn create_video(
        &self,
        request: &CreateVideoRequest,
    ) -> RemoteResult<CreateVideoResponse> {
        let req = self.client.post(self.video_url(None)).json(request);
        self.send_json(req).await
    }

    async fn get_video(&self, video_id: &str) -> RemoteResult<VideoStatusResponse> {
        let req = self.client.get(self.video_url(Some(video_id)));
        self.send_json(req).await
    }

    async fn delete_video(&self, video_id: &str) -> RemoteResult<()> {
        let req = self.client.delete(self.video_url(Some(video_id)));
        self.send(req).await.map(|_| ())
    }
}
