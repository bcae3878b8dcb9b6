mod ai_sdk;
mod config;
mod contact;
mod dispatcher;
mod history;
mod inference;
mod logging;
mod overlay;
mod portfolio;
mod protocol;
mod server;
mod session;
#[cfg(test)]
mod testing;
mod tools;
mod ui;
mod ui_state;

use clap::{Parser, Subcommand};

use config::Config;
use logging::LogTarget;
use portfolio::Portfolio;
use server::ServerConfig;

/// Terminal portfolio with an AI agent that can restyle and drive the page.
#[derive(Parser)]
#[command(name = "portfolio", version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the agent in the terminal (default).
    Chat,
    /// Serve chat and page state over HTTP for a browser renderer.
    Serve {
        #[arg(long, env = "PORTFOLIO_LISTEN", default_value = "127.0.0.1:8787")]
        listen: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            logging::init(LogTarget::for_terminal_ui(cli.config.log_file.clone()))?;
            let portfolio = Portfolio::start(&cli.config)?;
            tokio::task::block_in_place(|| ui::run_tui(&portfolio))
        }
        Command::Serve { listen } => {
            let target = cli.config.log_file.clone().map_or(LogTarget::Stderr, LogTarget::File);
            logging::init(target)?;
            let portfolio = Portfolio::start(&cli.config)?;
            server::run(portfolio, ServerConfig { listen }).await
        }
    }
}
