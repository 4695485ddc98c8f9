use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "assess")]
#[command(about = "Conversational AI capability assessment with a talking avatar")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub chat: ChatArgs,

    /// Only print conversation output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by the default action and `assess chat`.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ChatArgs {
    /// Assessment backend URL (replaced by the backend's own /config answer)
    #[arg(short = 'b', long)]
    pub backend_url: Option<String>,

    /// Do not start the talking avatar
    #[arg(long)]
    pub no_avatar: bool,

    /// Synthesis voice name
    #[arg(long)]
    pub voice: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive assessment (default)
    Chat(ChatArgs),
    /// Configure assess settings
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// List assessment domains and levels
    Domains,
}
