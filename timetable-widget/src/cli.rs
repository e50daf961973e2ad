use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "timetable-widget")]
#[command(about = "Terminal widget showing today's classes from a timetable backend")]
pub struct Cli {
    /// Use this config file instead of the one in the user config directory
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive widget (default)
    Run,
    /// Run without login or settings controls, polling until a session exists
    Companion,
    /// Inspect or change the local config file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Print the settings stored on the backend for the current session
    RemoteSettings {
        /// Ask the backend to move the widget back to its default position first
        #[arg(long)]
        reset_position: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Print every config value
    Show,
    /// Print one config value
    Get { key: String },
    /// Validate and store one config value
    Set { key: String, value: String },
    /// Store the widget position
    #[command(allow_negative_numbers = true)]
    Position { x: i32, y: i32 },
    /// Store the widget size
    Size { width: u32, height: u32 },
}
