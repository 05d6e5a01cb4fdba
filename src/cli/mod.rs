use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

use crate::core::{AppConfig, DEFAULT_SECRETS_PATH};

#[derive(Subcommand)]
enum Command {
    /// Run the chat web server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8501")]
        port: String,
    },
    /// Start a chat session in the terminal
    Chat {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML file with MODEL_NAME, OPENROUTER_API_KEY and
    /// OPENROUTER_BASE_URL
    #[arg(
        long,
        global = true,
        env = "CHATBOT_SECRETS_PATH",
        default_value = DEFAULT_SECRETS_PATH
    )]
    secrets: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            let config = AppConfig::load(&args.secrets)?;
            serve::run(host, port, config).await?;
        }
        Some(Command::Chat {}) => {
            let config = AppConfig::load(&args.secrets)?;
            chat::run(config).await?;
        }
        None => {}
    }

    Ok(())
}
