use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lexibot")]
#[command(author, version, about = "Telegram bot that quizzes you on your own English word list", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// List stored users with their word counts and sender status
    Users {
        /// Also print each user's words
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
