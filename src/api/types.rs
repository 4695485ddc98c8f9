use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assessment::ScoreMap;

/// Response of `GET /config`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub speech_key: Option<String>,
    #[serde(default)]
    pub speech_region: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct VerifyRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct VerifyResponse {
    #[serde(default)]
    pub ok: bool,
}

/// Response of `POST /session/start`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStart {
    pub session_id: String,
    pub assistant_text: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatRequest<'a> {
    pub user_text: &'a str,
}

/// Response of `POST /session/{id}/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub assistant_text: String,
    #[serde(default)]
    pub scores: Option<ScoreMap>,
    #[serde(default)]
    pub report: Option<Value>,
}
