use inquire::autocompletion::{Autocomplete, Replacement};

// Available slash commands: (command, description)
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/start", "Start a new assessment session"),
    ("/mic", "Speak your answer instead of typing"),
    ("/scores", "Show the current score table"),
    ("/report", "Show the latest report"),
    ("/config", "Show current configuration"),
    ("/help", "Show available commands"),
    ("/quit", "End the session and exit"),
];

/// Slash command autocompleter
#[derive(Clone, Default)]
pub struct SlashCommandCompleter;

impl Autocomplete for SlashCommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') {
            return Ok(vec![]);
        }

        let suggestions: Vec<String> = SLASH_COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"))
            .collect();

        Ok(suggestions)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        let replacement =
            highlighted_suggestion.map(|s| s.split_whitespace().next().unwrap_or("").to_string());
        Ok(replacement)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Start,
    Mic,
    Scores,
    Report,
    Config,
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Command(SlashCommand),
    Empty,
}

/// Classifies one submitted line. Whitespace-only lines are empty and
/// never reach the backend.
pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    input
        .strip_prefix('/')
        .map_or_else(|| Input::Text(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    let command = match parts.first().copied() {
        Some("start" | "new") => SlashCommand::Start,
        Some("mic" | "speak") => SlashCommand::Mic,
        Some("scores") => SlashCommand::Scores,
        Some("report") => SlashCommand::Report,
        Some("config") => SlashCommand::Config,
        Some("help") => SlashCommand::Help,
        Some("quit" | "exit" | "q") => SlashCommand::Quit,
        _ => SlashCommand::Unknown(parts.join(" ")),
    };
    Input::Command(command)
}
