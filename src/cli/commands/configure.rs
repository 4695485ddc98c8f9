//! Configure command handler for editing default settings.

use anyhow::{Result, bail};
use inquire::{Confirm, Text};

use crate::api::DEFAULT_BACKEND_URL;
use crate::avatar::{DEFAULT_CHARACTER, DEFAULT_STYLE, DEFAULT_VOICE};
use crate::config::{ConfigFile, ConfigManager, ResolveOptions, resolve_config};
use crate::speech::DEFAULT_LANGUAGE;
use crate::status;
use crate::ui::{Style, answered};

/// Runs the configure command.
///
/// With `show`, prints the effective settings. Otherwise prompts for each
/// setting, pre-filled with the current value. Backing out of any prompt
/// leaves the file untouched.
pub fn run_configure(show: bool) -> Result<()> {
    let manager = ConfigManager::new()?;
    let mut config = manager.load_or_default();
    print_current(&config, &manager);
    if show {
        return Ok(());
    }

    if !edit_settings(&mut config)? {
        println!();
        status!("{}", Style::secondary("Configuration unchanged."));
        return Ok(());
    }
    manager.save(&config)?;

    println!();
    status!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );

    Ok(())
}

/// Walks through every prompt. Returns `false` if the user cancelled.
fn edit_settings(config: &mut ConfigFile) -> Result<bool> {
    let Some(backend_url) = prompt_url(config.assess.backend_url.as_deref(), DEFAULT_BACKEND_URL)?
    else {
        return Ok(false);
    };

    let speech = &config.speech;
    let Some(voice) = prompt_setting("Voice:", speech.voice.as_deref(), DEFAULT_VOICE)? else {
        return Ok(false);
    };
    let Some(character) = prompt_setting(
        "Avatar character:",
        speech.avatar_character.as_deref(),
        DEFAULT_CHARACTER,
    )?
    else {
        return Ok(false);
    };
    let Some(style) =
        prompt_setting("Avatar style:", speech.avatar_style.as_deref(), DEFAULT_STYLE)?
    else {
        return Ok(false);
    };
    let Some(language) = prompt_setting(
        "Recognition language:",
        speech.language.as_deref(),
        DEFAULT_LANGUAGE,
    )?
    else {
        return Ok(false);
    };

    let change_commands = Confirm::new("Change audio player or capture commands?")
        .with_default(false)
        .prompt();
    let Some(change_commands) = answered(change_commands)? else {
        return Ok(false);
    };
    let commands = if change_commands {
        let resolved = resolve_config(&ResolveOptions::default(), config);
        let Some(player) = prompt_command("Player command:", &resolved.player)? else {
            return Ok(false);
        };
        let Some(capture) = prompt_command("Capture command:", &resolved.capture)? else {
            return Ok(false);
        };
        Some((player, capture))
    } else {
        None
    };

    config.assess.backend_url = Some(backend_url);
    config.speech.voice = voice;
    config.speech.avatar_character = character;
    config.speech.avatar_style = style;
    config.speech.language = language;
    if let Some((player, capture)) = commands {
        config.speech.player = Some(player);
        config.speech.capture = Some(capture);
    }
    Ok(true)
}

fn prompt_url(current: Option<&str>, default: &str) -> Result<Option<String>> {
    let url = Text::new("Backend URL:")
        .with_default(current.unwrap_or(default))
        .with_help_message("Used until the backend's /config names another")
        .prompt();
    let Some(url) = answered(url)? else {
        return Ok(None);
    };
    let url = url.trim();

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("Backend URL must start with http:// or https://");
    }
    Ok(Some(url.trim_end_matches('/').to_string()))
}

/// Prompts for one value. The inner `None` means the value matches the
/// default, so the file only records overrides.
fn prompt_setting(
    message: &str,
    current: Option<&str>,
    default: &str,
) -> Result<Option<Option<String>>> {
    let value = Text::new(message)
        .with_default(current.unwrap_or(default))
        .prompt();
    let Some(value) = answered(value)? else {
        return Ok(None);
    };
    Ok(Some(override_of(&value, default)))
}

fn override_of(value: &str, default: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty() && value != default).then(|| value.to_string())
}

fn prompt_command(message: &str, current: &[String]) -> Result<Option<Vec<String>>> {
    let value = Text::new(message)
        .with_default(&current.join(" "))
        .with_help_message("Program and arguments, separated by spaces")
        .prompt();
    let Some(value) = answered(value)? else {
        return Ok(None);
    };

    let command = split_command(&value);
    if command.is_empty() {
        bail!("Command cannot be empty");
    }
    Ok(Some(command))
}

fn split_command(line: &str) -> Vec<String> {
    line.split_whitespace().map(ToString::to_string).collect()
}

fn print_current(config: &ConfigFile, manager: &ConfigManager) {
    let resolved = resolve_config(&ResolveOptions::default(), config);

    println!("{}", Style::header("Current settings"));
    println!(
        "  {}      {}",
        Style::label("backend"),
        Style::value(&resolved.backend_url)
    );
    println!(
        "  {}        {}",
        Style::label("voice"),
        Style::value(&resolved.voice)
    );
    println!(
        "  {}       {}",
        Style::label("avatar"),
        Style::value(format!(
            "{} ({})",
            resolved.avatar_character, resolved.avatar_style
        ))
    );
    println!(
        "  {}     {}",
        Style::label("language"),
        Style::value(&resolved.language)
    );
    println!(
        "  {}       {}",
        Style::label("player"),
        Style::secondary(resolved.player.join(" "))
    );
    println!(
        "  {}      {}",
        Style::label("capture"),
        Style::secondary(resolved.capture.join(" "))
    );
    println!(
        "  {}         {}",
        Style::label("file"),
        Style::secondary(manager.config_path().display().to_string())
    );
    println!();
}
