use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "autoreg", about = "Paced phone-verified site registration runner")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Work through the configured site list until done or interrupted
    Run {
        /// Print final sites, stats and events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which handler a URL maps to
    Resolve {
        /// Registration page URL
        url: String,
    },
    /// Show stats for the configured site list
    Stats,
}
