use reqwest::Client;
use serde::Deserialize;

use super::AvatarError;
use crate::speech::{SUBSCRIPTION_KEY_HEADER, SpeechConfig};

const RELAY_TOKEN_PATH: &str = "/cognitiveservices/avatar/relay/token/v1";

/// Relay credentials for the avatar media connection.
///
/// The service has shipped both PascalCase and lowercase field names; both
/// are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayToken {
    #[serde(default, alias = "Urls")]
    pub urls: Vec<String>,
    #[serde(default, alias = "Username")]
    pub username: Option<String>,
    #[serde(default, alias = "Password", alias = "password")]
    pub credential: Option<String>,
}

/// A single ICE server entry for the peer connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceServer {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl RelayToken {
    /// Picks the relay URL to connect through: the first `turn` URL, else the
    /// first URL of any kind.
    pub fn ice_server(&self) -> Result<IceServer, AvatarError> {
        let url = self
            .urls
            .iter()
            .find(|url| url.starts_with("turn"))
            .or_else(|| self.urls.first())
            .ok_or(AvatarError::NoIceServer)?;

        Ok(IceServer {
            urls: vec![url.clone()],
            username: self.username.clone(),
            credential: self.credential.clone(),
        })
    }
}

/// Fetches a relay token, authenticating with the speech subscription key.
///
/// `host` overrides the regional text-to-speech host.
pub async fn fetch_relay_token(
    http: &Client,
    speech: &SpeechConfig,
    host: Option<&str>,
) -> Result<RelayToken, AvatarError> {
    let host = host.map_or_else(|| speech.tts_host(), ToString::to_string);
    let url = format!("{}{RELAY_TOKEN_PATH}", host.trim_end_matches('/'));

    let response = http
        .get(&url)
        .header(SUBSCRIPTION_KEY_HEADER, speech.key())
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AvatarError::RelayStatus(status));
    }
    Ok(response.json().await?)
}
