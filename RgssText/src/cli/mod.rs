//! RgssText CLI - Command-line interface for RPG Maker translation

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;
use tracing::Level;

#[derive(Parser)]
#[command(name = "rgsstext")]
#[command(
    version,
    about = "RgssText: text extraction and reinjection for RPG Maker XP/VX/VX Ace",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every processed file
    #[arg(long, global = true)]
    log: bool,

    /// More log output (-vv for codec details)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

impl Cli {
    fn max_level(&self) -> Level {
        match (self.verbose, self.log) {
            (0, false) => Level::WARN,
            (0 | 1, _) => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}

/// Run the RgssText CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    tracing_subscriber::fmt()
        .with_max_level(cli.max_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    cli.command.execute(cli.log || cli.verbose > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from(["rgsstext", "extract", "Game", "--force", "--only", "maps"])
            .unwrap();
        assert_eq!(cli.max_level(), Level::WARN);

        let cli = Cli::try_parse_from(["rgsstext", "inject", "Game", "--log"]).unwrap();
        assert_eq!(cli.max_level(), Level::INFO);

        let cli =
            Cli::try_parse_from(["rgsstext", "-vv", "inspect", "Data/System.rvdata2"]).unwrap();
        assert_eq!(cli.max_level(), Level::DEBUG);
    }

    #[test]
    fn test_force_conflicts_with_append() {
        let args = ["rgsstext", "extract", "Game", "--force", "--append"];
        assert!(Cli::try_parse_from(args).is_err());
        assert!(Cli::try_parse_from(["rgsstext", "extract", "Game", "--only", "music"]).is_err());
    }
}
