use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use assess_chat::assessment::print_domains;
use assess_chat::cli::commands::{chat, configure};
use assess_chat::cli::{Args, Command};
use assess_chat::output::{self, OutputConfig};

const LOG_ENV: &str = "ASSESS_LOG";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    output::init(OutputConfig { quiet: args.quiet });
    init_logging(args.verbose);

    match args.command {
        Some(Command::Domains) => {
            print_domains();
        }
        Some(Command::Configure { show }) => {
            configure::run_configure(show)?;
        }
        Some(Command::Chat(options)) => {
            chat::run_chat(options).await?;
        }
        None => {
            chat::run_chat(args.chat).await?;
        }
    }

    Ok(())
}
