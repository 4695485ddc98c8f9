use anyhow::Result;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};

use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::controller::ChatController;
use super::gate::AccessForm;
use super::transcript::{Message, Role};
use super::ui;
use crate::assessment::ScoreRow;
use crate::config::ResolvedConfig;
use crate::ui::{Spinner, answered};

/// Settings shown by `/config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub avatar_enabled: bool,
    pub voice: String,
    pub avatar_character: String,
    pub avatar_style: String,
    pub language: String,
}

impl From<&ResolvedConfig> for SessionConfig {
    fn from(resolved: &ResolvedConfig) -> Self {
        Self {
            avatar_enabled: resolved.avatar_enabled,
            voice: resolved.voice.clone(),
            avatar_character: resolved.avatar_character.clone(),
            avatar_style: resolved.avatar_style.clone(),
            language: resolved.language.clone(),
        }
    }
}

/// An interactive assessment session in the terminal.
///
/// Shows the landing gate first, then a REPL that forwards answers to the
/// backend and prints whatever the controller adds to the transcript.
pub struct ChatSession {
    controller: ChatController,
    config: SessionConfig,
    printed: usize,
}

type Panels = (Vec<ScoreRow>, Option<String>);

enum Flow {
    Continue,
    Quit,
}

impl ChatSession {
    pub const fn new(controller: ChatController, config: SessionConfig) -> Self {
        Self {
            controller,
            config,
            printed: 0,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::print_header();

        {
            let _spinner = Spinner::new("Loading backend configuration...");
            if let Err(err) = self.controller.load_config().await {
                tracing::warn!(error = %err, "failed to load config");
            }
        }

        let result = self.run_inner().await;
        self.controller.shutdown();
        result
    }

    async fn run_inner(&mut self) -> Result<()> {
        if !self.landing().await? {
            println!();
            ui::print_goodbye();
            return Ok(());
        }
        ui::print_welcome();

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        // Non-highlighted suggestions: gray
        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        // Highlighted suggestion: purple
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        loop {
            let input = Text::new("")
                .with_render_config(render_config)
                .with_autocomplete(SlashCommandCompleter)
                .with_help_message("Type your answer, /mic to speak, /help for commands")
                .prompt();

            let Some(line) = answered(input)? else {
                println!(); // Clear line before goodbye message
                break;
            };
            match parse_input(&line) {
                Input::Empty => {}
                Input::Command(cmd) => {
                    if matches!(self.handle_command(cmd).await, Flow::Quit) {
                        break;
                    }
                }
                Input::Text(text) => self.send(&text).await,
            }
        }

        ui::print_goodbye();
        Ok(())
    }

    /// Runs the access gate until it passes. Returns `false` if the user
    /// cancels.
    async fn landing(&mut self) -> Result<bool> {
        ui::print_landing();

        loop {
            let consent = Confirm::new("Do you accept these guidelines?")
                .with_default(false)
                .prompt();
            let Some(consent) = answered(consent)? else {
                return Ok(false);
            };

            // Without consent the password is never asked for.
            let password = if consent {
                let password = Password::new("Access password:")
                    .without_confirmation()
                    .with_display_mode(PasswordDisplayMode::Masked)
                    .prompt();
                let Some(password) = answered(password)? else {
                    return Ok(false);
                };
                password
            } else {
                String::new()
            };

            let form = AccessForm { consent, password };
            let outcome = {
                let _spinner = Spinner::new("Checking access...");
                self.controller.handle_enter(&form).await
            };
            match outcome {
                Ok(()) => {
                    println!();
                    return Ok(true);
                }
                Err(_) => {
                    let message = self.controller.screen().landing_error.clone();
                    ui::print_error(message.as_deref().unwrap_or_default());
                }
            }
        }
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> Flow {
        match cmd {
            SlashCommand::Start => {
                let before = self.panels();
                let result = {
                    let _spinner = Spinner::new("Starting session...");
                    self.controller.start_session().await
                };
                if let Err(err) = result {
                    self.controller.report_failure(&err);
                }
                self.flush(&before, false);
                ui::print_avatar_status(self.controller.screen().mount.lock().elements());
            }
            SlashCommand::Mic => {
                let before = self.panels();
                let result = {
                    let _spinner = Spinner::new("Listening...");
                    self.controller.start_stt().await
                };
                if let Err(err) = result {
                    self.controller.report_failure(&err);
                }
                // Recognized speech was never typed, so echo it.
                self.flush(&before, true);
            }
            SlashCommand::Scores => ui::print_scores(&self.controller.screen().scores),
            SlashCommand::Report => ui::print_report(self.controller.screen().report.as_deref()),
            SlashCommand::Config => ui::print_config(
                &self.config,
                self.controller.backend().base_url(),
                self.controller.state().speech.is_some(),
            ),
            SlashCommand::Help => ui::print_help(),
            SlashCommand::Quit => return Flow::Quit,
            SlashCommand::Unknown(cmd) => ui::print_error(&format!("Unknown command: /{cmd}")),
        }
        Flow::Continue
    }

    async fn send(&mut self, text: &str) {
        let before = self.panels();
        let result = {
            let _spinner = Spinner::new("Thinking...");
            self.controller.send_text(text).await
        };
        if let Err(err) = result {
            self.controller.report_failure(&err);
        }
        self.flush(&before, false);
    }

    fn panels(&self) -> Panels {
        let screen = self.controller.screen();
        (screen.scores.clone(), screen.report.clone())
    }

    /// Prints what the last action changed: new transcript messages, then
    /// the score table and report if they differ from `before`.
    fn flush(&mut self, before: &Panels, echo_user: bool) {
        let screen = self.controller.screen();
        let fresh: Vec<Message> = screen
            .transcript
            .since(self.printed)
            .iter()
            .filter(|m| echo_user || m.role == Role::Assistant)
            .cloned()
            .collect();
        ui::print_messages(&fresh);
        self.printed = screen.transcript.len();

        if screen.scores != before.0 {
            ui::print_scores(&screen.scores);
        }
        if screen.report != before.1 {
            ui::print_report(screen.report.as_deref());
        }
    }
}
