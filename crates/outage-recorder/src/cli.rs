use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Records Wi-Fi radio and internet connectivity changes to a log file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Action to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record status changes until interrupted or the record cap is reached.
    Record {
        /// Log file to append to (default: the configured log file).
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Delete the existing log before recording.
        #[arg(long)]
        fresh: bool,
    },

    /// Print the log file unchanged.
    Show {
        /// Log file to print (default: the configured log file).
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
