//! Typed HTTP client for the identity backend.
//!
//! Every call is a single best-effort JSON round trip: no retries, no
//! caching, no auth. Non-2xx responses are normalized into one error value
//! carrying the backend's `{"detail": ...}` message when it provides one.

use crate::config::StudioConfig;
use crate::error::ClientError;
use crate::types::{GeneratedIdentity, GenerationProgress, SavedProfile, TaskHandle};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Backend operations the studio core depends on.
///
/// Implemented by [`IdentityClient`]; test suites substitute scripted fakes
/// so the engine can be driven without a network.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// `POST /generate_identity` — blocking generation of a full identity.
    async fn generate_identity(&self, description: &str)
        -> Result<GeneratedIdentity, ClientError>;

    /// `POST /regenerate_image` — new portrait for an existing prompt.
    async fn regenerate_image(&self, image_prompt: &str) -> Result<String, ClientError>;

    /// `POST /regenerate_voice` — new voice sample for an existing prompt.
    async fn regenerate_voice(&self, voice_prompt: &str, bio: &str)
        -> Result<String, ClientError>;

    /// `POST /save_profile` — persist an identity under a name.
    async fn save_profile(
        &self,
        name: &str,
        bio: &str,
        image_base64: &str,
        audio_base64: &str,
    ) -> Result<bool, ClientError>;

    /// `GET /profiles` — every saved profile.
    async fn list_profiles(&self) -> Result<Vec<SavedProfile>, ClientError>;

    /// `POST /start_generation` — begin an async generation task. Backends
    /// without async support answer 404 here.
    async fn start_generation(&self, description: &str) -> Result<TaskHandle, ClientError>;

    /// `GET /generation_progress/{task_id}` — current task snapshot.
    async fn generation_progress(&self, task_id: &str)
        -> Result<GenerationProgress, ClientError>;

    /// `GET /generation_result/{task_id}` — final identity of a completed task.
    async fn generation_result(&self, task_id: &str)
        -> Result<GeneratedIdentity, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Deserialize)]
struct ImageBody {
    image_base64: String,
}

#[derive(Deserialize)]
struct AudioBody {
    audio_base64: String,
}

#[derive(Deserialize)]
struct SaveBody {
    success: bool,
}

/// Reqwest-backed [`IdentityBackend`] against a fixed base URL.
pub struct IdentityClient {
    base_url: String,
    http: reqwest::Client,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { base_url, http }
    }

    pub fn from_config(cfg: &StudioConfig) -> Self {
        Self::new(
            cfg.backend_url.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "POST");
        let response = self.http.post(&url).json(&body).send().await?;
        decode(&url, response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        decode(&url, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ClientError::Transport(format!("failed to read response from {url}: {e}")))?;

    if !status.is_success() {
        return Err(error_from_body(status, &text));
    }

    serde_json::from_str(&text)
        .map_err(|e| ClientError::Transport(format!("malformed response from {url}: {e}")))
}

/// Non-2xx normalization: prefer the backend's `{"detail": ...}`, otherwise
/// synthesize a message naming the status code.
fn error_from_body(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ClientError::Backend(parsed.detail),
        Err(_) => ClientError::Transport(format!("request failed with status {status}")),
    }
}

#[async_trait]
impl IdentityBackend for IdentityClient {
    async fn generate_identity(
        &self,
        description: &str,
    ) -> Result<GeneratedIdentity, ClientError> {
        self.post_json(
            "/generate_identity",
            serde_json::json!({ "description": description }),
        )
        .await
    }

    async fn regenerate_image(&self, image_prompt: &str) -> Result<String, ClientError> {
        let body: ImageBody = self
            .post_json(
                "/regenerate_image",
                serde_json::json!({ "image_prompt": image_prompt }),
            )
            .await?;
        Ok(body.image_base64)
    }

    async fn regenerate_voice(
        &self,
        voice_prompt: &str,
        bio: &str,
    ) -> Result<String, ClientError> {
        let body: AudioBody = self
            .post_json(
                "/regenerate_voice",
                serde_json::json!({ "voice_prompt": voice_prompt, "bio": bio }),
            )
            .await?;
        Ok(body.audio_base64)
    }

    async fn save_profile(
        &self,
        name: &str,
        bio: &str,
        image_base64: &str,
        audio_base64: &str,
    ) -> Result<bool, ClientError> {
        let body: SaveBody = self
            .post_json(
                "/save_profile",
                serde_json::json!({
                    "name": name,
                    "bio": bio,
                    "image_base64": image_base64,
                    "audio_base64": audio_base64,
                }),
            )
            .await?;
        Ok(body.success)
    }

    async fn list_profiles(&self) -> Result<Vec<SavedProfile>, ClientError> {
        self.get_json("/profiles").await
    }

    async fn start_generation(&self, description: &str) -> Result<TaskHandle, ClientError> {
        self.post_json(
            "/start_generation",
            serde_json::json!({ "description": description }),
        )
        .await
    }

    async fn generation_progress(
        &self,
        task_id: &str,
    ) -> Result<GenerationProgress, ClientError> {
        self.get_json(&format!("/generation_progress/{task_id}")).await
    }

    async fn generation_result(&self, task_id: &str) -> Result<GeneratedIdentity, ClientError> {
        self.get_json(&format!("/generation_result/{task_id}")).await
    }
}
