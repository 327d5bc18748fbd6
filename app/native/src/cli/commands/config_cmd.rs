//! `paneltone config`: create, locate and inspect the configuration file.
//!
//! The file only holds defaults for analysis and watching, so every subcommand
//! here is safe to run while `paneltone watch` is active.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, config_paths};
use crate::error::PaneltoneError;
use crate::platform::expand;

#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Write a starter configuration file.
    ///
    /// The template lists the threshold, panel height and watch settings with
    /// their defaults, all commented out. Uncomment a line to override it.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  paneltone config init                          # ~/.config/paneltone/config.jsonc
  paneltone config init --path ./paneltone.jsonc  # somewhere else
  paneltone config init --force                  # replace an existing file
  paneltone config init --stdout > my.jsonc      # just print the template"#
    )]
    Init {
        /// Replace the file if it already exists.
        #[arg(long, short)]
        force: bool,

        /// Where to write the file. `~` is expanded.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the template instead of writing it.
        #[arg(long)]
        stdout: bool,
    },

    /// List the locations searched for a configuration file.
    ///
    /// The first existing file wins and is marked as active.
    Path,

    /// Print the effective configuration as JSON.
    ///
    /// Values missing from the file are shown with their defaults.
    Show,
}

/// Runs a `config` subcommand.
///
/// # Errors
///
/// Returns an error if the template cannot be written or the configuration
/// cannot be serialized.
pub fn execute(cmd: &ConfigCommands) -> Result<(), PaneltoneError> {
    match cmd {
        ConfigCommands::Init { stdout: true, .. } => {
            println!("{}", generate_config_template());
            Ok(())
        }
        ConfigCommands::Init { force, path, .. } => init_config(*force, path.as_deref()),
        ConfigCommands::Path => {
            list_config_paths();
            Ok(())
        }
        ConfigCommands::Show => show_config(),
    }
}

/// First search location, used by `config init` without `--path`.
fn default_init_path() -> PathBuf {
    config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc"))
}

fn init_config(force: bool, custom_path: Option<&Path>) -> Result<(), PaneltoneError> {
    let target = custom_path.map_or_else(default_init_path, |path| expand(&path.to_string_lossy()));

    write_config_file(&target, force)?;

    println!("Wrote {}", target.display());
    println!("Uncomment the settings you want to change; everything else keeps its default.");
    Ok(())
}

fn write_config_file(path: &Path, force: bool) -> Result<(), PaneltoneError> {
    if path.exists() && !force {
        return Err(PaneltoneError::ConfigError(format!(
            "{} already exists (pass --force to replace it)",
            path.display()
        )));
    }

    create_config_file(path).map_err(|err| {
        PaneltoneError::ConfigError(format!("Cannot write {}: {err}", path.display()))
    })
}

/// Prints the search locations in priority order, marking the active one.
fn list_config_paths() {
    let mut active_seen = false;

    for (rank, path) in config_paths().iter().enumerate() {
        let marker = match (path.exists(), active_seen) {
            (true, false) => {
                active_seen = true;
                " (active)".green().to_string()
            }
            (true, true) => " (shadowed)".dimmed().to_string(),
            (false, _) => String::new(),
        };
        println!("{:>2}. {}{marker}", rank + 1, path.display());
    }

    if !active_seen {
        println!("\nNo configuration file yet; defaults are in use. Create one with `paneltone config init`.");
    }
}

fn show_config() -> Result<(), PaneltoneError> {
    let source = match config::get_config_path() {
        Some(path) => format!("Configuration file: {}", path.display()),
        None => "No configuration file, showing defaults".to_string(),
    };
    eprintln!("{}", source.dimmed());

    output::print_highlighted_json(&serde_json::to_value(config::get_config())?);
    Ok(())
}
