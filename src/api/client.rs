use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
    ChatReply, ChatRequest, RemoteConfig, SessionStart, VerifyRequest, VerifyResponse,
};

/// Backend used until `/config` says otherwise.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// JSON client for the assessment backend.
///
/// Holds the base URL, which may be replaced once `/config` has been read.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replaces the base URL. A trailing `/` is dropped.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = normalize_base(base_url);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /config`.
    pub async fn fetch_config(&self) -> Result<RemoteConfig, ApiError> {
        let url = self.url("/config");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(url, response).await
    }

    /// `POST /auth/verify`.
    ///
    /// Any failure (network, non-2xx, malformed body) counts as rejection.
    pub async fn verify_access(&self, password: &str) -> bool {
        match self
            .post_json::<_, VerifyResponse>("/auth/verify", &VerifyRequest { password })
            .await
        {
            Ok(response) => response.ok,
            Err(err) => {
                tracing::debug!(error = %err, "access verification failed");
                false
            }
        }
    }

    /// `POST /session/start` with an empty JSON body.
    pub async fn start_session(&self) -> Result<SessionStart, ApiError> {
        self.post_json("/session/start", &serde_json::json!({}))
            .await
    }

    /// `POST /session/{id}/chat`.
    pub async fn chat(&self, session_id: &str, user_text: &str) -> Result<ChatReply, ApiError> {
        self.post_json(
            &format!("/session/{session_id}/chat"),
            &ChatRequest { user_text },
        )
        .await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(url, response).await
    }
}

async fn decode<T: DeserializeOwned>(url: String, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, body });
    }
    response
        .json()
        .await
        .map_err(|source| ApiError::Decode { url, source })
}

fn normalize_base(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
