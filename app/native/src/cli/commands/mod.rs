//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `analyze` - One-shot wallpaper classification
//! - `watch` - Re-classify a wallpaper whenever it changes
//! - `config_cmd` - Configuration file management

use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::constants::APP_NAME;
use crate::error::PaneltoneError;
use crate::{config, schema};

pub mod analyze;
pub mod config_cmd;
pub mod watch;

pub use analyze::AnalyzeArgs;
pub use config_cmd::ConfigCommands;
pub use watch::WatchArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Paneltone - pick a legible panel style for any wallpaper.
#[derive(Parser, Debug)]
#[command(name = "paneltone")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Log analysis details to stderr and show colour swatches.
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Classify one or more wallpapers.
    ///
    /// Samples the strip of each wallpaper that sits behind the panel and
    /// prints the style that keeps the panel legible. Directories are expanded
    /// to the images they contain.
    #[command(after_long_help = r#"Examples:
  paneltone analyze ~/Pictures/wall.jpg
  paneltone analyze ~/Pictures/Wallpapers --panel-height 40
  paneltone analyze wall.png --threshold 0.5 --json"#)]
    Analyze(AnalyzeArgs),

    /// Watch a wallpaper and print a JSON line whenever its style is applied.
    #[command(after_long_help = r#"Examples:
  paneltone watch ~/.cache/wallpaper.png
  paneltone watch wall.png --exec 'notify-send "panel: $PANELTONE_STYLE"'
  my-wm-events | paneltone watch wall.png --stdin-events"#)]
    Watch(WatchArgs),

    /// Configuration file management commands.
    ///
    /// Initialize, view, and locate the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with
    /// editors that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(paneltone completions --shell zsh)"
    ///   paneltone completions --shell bash > ~/.local/share/bash-completion/completions/paneltone
    ///   paneltone completions --shell fish > ~/.config/fish/completions/paneltone.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<std::path::PathBuf> {
        self.config.as_deref().map(crate::platform::expand)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), PaneltoneError> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(PaneltoneError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        match &self.command {
            Commands::Analyze(args) => analyze::execute(args, self.verbose),
            Commands::Watch(args) => watch::execute(args),
            Commands::Config(cmd) => config_cmd::execute(cmd),

            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_NAME, &mut io::stdout());
    }
}

/// Parses a luminance threshold, rejecting values outside `[0, 1]`.
pub(crate) fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value.parse().map_err(|_| format!("`{value}` is not a number"))?;

    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("threshold must be between 0 and 1, got {value}"))
    }
}
