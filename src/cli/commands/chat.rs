use anyhow::Result;
use std::sync::Arc;

use crate::api::BackendClient;
use crate::avatar::{Avatar, AvatarClient, CognitiveSpeech, CommandPlayer};
use crate::chat::{AvatarPreferences, ChatController, ChatSession, SessionConfig};
use crate::cli::args::ChatArgs;
use crate::config::{ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};
use crate::paths;
use crate::speech::{MicrophoneInput, SpeechInput};

pub async fn run_chat(options: ChatArgs) -> Result<()> {
    let resolved = load_resolved_config(&options)?;
    tracing::debug!(?resolved, "resolved chat configuration");

    let controller = build_controller(&resolved)?;
    let mut session = ChatSession::new(controller, SessionConfig::from(&resolved));
    session.run().await
}

fn load_resolved_config(options: &ChatArgs) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default();

    let resolve_options = ResolveOptions {
        backend_url: options.backend_url.clone(),
        voice: options.voice.clone(),
        no_avatar: options.no_avatar,
    };
    Ok(resolve_config(&resolve_options, &file_config))
}

/// Wires the production collaborators into a controller.
pub fn build_controller(resolved: &ResolvedConfig) -> Result<ChatController> {
    let backend = BackendClient::new(&resolved.backend_url);

    let avatar: Box<dyn Avatar> = if resolved.avatar_enabled {
        let player = CommandPlayer::new(resolved.player.clone(), paths::speech_dir()?);
        let platform = CognitiveSpeech::new(Arc::new(player));
        Box::new(AvatarClient::new(Arc::new(platform)))
    } else {
        Box::new(AvatarClient::unavailable())
    };

    let speech_input: Arc<dyn SpeechInput> = Arc::new(MicrophoneInput::new(
        resolved.capture.clone(),
        resolved.language.clone(),
    ));

    let preferences = AvatarPreferences {
        voice: resolved.voice.clone(),
        character: resolved.avatar_character.clone(),
        style: resolved.avatar_style.clone(),
    };

    Ok(ChatController::new(
        backend,
        avatar,
        Some(speech_input),
        preferences,
    ))
}
