//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::{Parser, ValueEnum};

use crate::services::DEFAULT_SAVE_FILE;

/// Colour scheme of the time label
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "countdown-timer")]
#[command(about = "A terminal countdown timer with a waiting indicator and alarm")]
#[command(version)]
pub struct Config {
    /// File remembering the last started duration
    #[arg(long, default_value = DEFAULT_SAVE_FILE)]
    pub save_file: PathBuf,

    /// Initial colour theme
    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    pub theme: Theme,

    /// How many times the bell rings when time is up
    #[arg(long, default_value = "3")]
    pub bell_count: u32,

    /// Do not ring the bell
    #[arg(long)]
    pub mute: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
