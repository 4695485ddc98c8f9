//! Chat mode UI components.

use crate::assessment::{PLACEHOLDER, ScoreRow};
use crate::avatar::MountedElement;
use crate::ui::Style;

use super::command::SLASH_COMMANDS;
use super::session::SessionConfig;
use super::transcript::{Message, Role};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header() {
    println!(
        "{} {} - AI Capability Assessment",
        Style::header("assess"),
        Style::version(format!("v{VERSION}"))
    );
    println!();
}

pub fn print_landing() {
    println!("{}", Style::header("Before you begin"));
    println!(
        "  {}",
        Style::secondary("This is a guided conversation about how you use AI at work.")
    );
    println!(
        "  {}",
        Style::secondary("Do not share confidential or personal data in your answers.")
    );
    println!();
}

pub fn print_welcome() {
    println!(
        "{} Type {} to begin, {} for commands.",
        Style::success("✓"),
        Style::command("/start"),
        Style::command("/help")
    );
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

pub fn print_messages(messages: &[Message]) {
    for message in messages {
        let tag = match message.role {
            Role::User => Style::user("you"),
            Role::Assistant => Style::assistant("assessor"),
        };
        println!("{tag} {}", message.text);
        println!();
    }
}

/// One status line describing what the avatar mount is showing.
pub fn print_avatar_status(elements: &[MountedElement]) {
    let streams: Vec<&str> = elements
        .iter()
        .filter_map(|element| match element {
            MountedElement::Video { stream_id, .. } | MountedElement::Audio { stream_id, .. } => {
                Some(stream_id.as_str())
            }
            MountedElement::Mask => None,
        })
        .collect();
    if streams.is_empty() {
        return;
    }
    crate::status!(
        "{} {}",
        Style::success("● avatar live"),
        Style::secondary(streams.join(", "))
    );
    crate::status!();
}

pub fn print_scores(rows: &[ScoreRow]) {
    println!("{}", Style::header("Scores"));
    for row in rows {
        let value = if row.value == PLACEHOLDER {
            Style::secondary(&row.value)
        } else {
            Style::value(&row.value)
        };
        println!(
            "  {} {} {value}",
            Style::code(row.key),
            Style::label(format!("{:<34}", row.label))
        );
    }
    println!();
}

pub fn print_report(report: Option<&str>) {
    println!("{}", Style::header("Report"));
    match report {
        Some(report) => println!("{report}"),
        None => println!("  {}", Style::hint("No report yet.")),
    }
    println!();
}

pub fn print_config(config: &SessionConfig, backend_url: &str, speech_ready: bool) {
    println!("{}", Style::header("Configuration"));
    println!("  {}    {}", Style::label("backend"), Style::value(backend_url));
    println!(
        "  {}     {}",
        Style::label("avatar"),
        if config.avatar_enabled {
            Style::value(format!("{} ({})", config.avatar_character, config.avatar_style))
        } else {
            Style::secondary("disabled")
        }
    );
    println!("  {}      {}", Style::label("voice"), Style::value(&config.voice));
    println!(
        "  {}   {}",
        Style::label("language"),
        Style::value(&config.language)
    );
    println!(
        "  {}     {}",
        Style::label("speech"),
        if speech_ready {
            Style::success("configured")
        } else {
            Style::warning("missing")
        }
    );
    println!();
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    for (command, description) in SLASH_COMMANDS {
        println!(
            "  {} {}",
            Style::command(format!("{command:<10}")),
            Style::secondary(description)
        );
    }
    println!(
        "  {}",
        Style::hint("Anything else you type is sent as your answer.")
    );
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
