//! Analyze CLI command.

use std::path::{Path, PathBuf};

use clap::Args;
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::parse_threshold;
use crate::analysis::decode::list_images_in_directory;
use crate::analysis::{AnalysisOptions, ImageDecoder, Rgb, StyleResult, analyze_with};
use crate::cli::output;
use crate::config::{self, AnalysisConfig};
use crate::error::PaneltoneError;
use crate::platform::expand;

/// Longest file name shown in the table before truncation.
const MAX_NAME_CHARS: usize = 32;

/// Longest error message shown in the table before truncation.
const MAX_NOTE_CHARS: usize = 48;

/// Arguments for `paneltone analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Wallpaper files or directories of wallpapers.
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<String>,

    /// Mean luminance below which a wallpaper counts as dark (0.0 - 1.0).
    #[arg(long, short, value_name = "F", value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Height of the panel in pixels.
    #[arg(long, short, value_name = "PX")]
    pub panel_height: Option<u32>,

    /// Print JSON instead of a table.
    #[arg(long, short)]
    pub json: bool,
}

impl AnalyzeArgs {
    /// Merges the flags with the configured defaults.
    #[must_use]
    pub fn options(&self, defaults: &AnalysisConfig) -> AnalysisOptions {
        AnalysisOptions::new(
            self.threshold.unwrap_or(defaults.luminance_threshold),
            self.panel_height.unwrap_or(defaults.panel_height),
        )
    }
}

/// One analyzed file, as printed by `--json`.
#[derive(Debug, Serialize)]
struct FileReport<'a> {
    path: &'a Path,
    #[serde(flatten)]
    result: &'a StyleResult,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Style")]
    style: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Std")]
    std: String,
    #[tabled(rename = "Darkest")]
    darkest: String,
    #[tabled(rename = "Brightest")]
    brightest: String,
    #[tabled(rename = "Samples")]
    samples: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl ResultRow {
    fn new(path: &Path, result: &StyleResult, swatches: bool) -> Self {
        let file = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let dash = || "-".dimmed().to_string();

        let (std, darkest, brightest, samples) = match result.stats() {
            Some(stats) => {
                let color = |lum: f64, rgb: Rgb| {
                    if swatches {
                        format!("{lum:.3} {}", output::swatch(rgb))
                    } else {
                        format!("{lum:.3} {rgb}")
                    }
                };
                (
                    format!("{:.3}", stats.luminance_std),
                    color(stats.min_luminosity, stats.min_rgb),
                    color(stats.max_luminosity, stats.max_rgb),
                    stats.sample_count.to_string(),
                )
            }
            None => (dash(), dash(), dash(), dash()),
        };

        Self {
            file: output::truncate(&file, MAX_NAME_CHARS),
            style: output::style_label(result.style).to_string(),
            mean: format!("{:.3}", result.mean_luminance()),
            std,
            darkest,
            brightest,
            samples,
            note: result
                .error()
                .map_or_else(String::new, |err| output::truncate(err, MAX_NOTE_CHARS).red().to_string()),
        }
    }
}

/// Execute the analyze command.
///
/// Fallback results are printed like any other result and do not fail the
/// command.
///
/// # Errors
///
/// Returns an error if no image could be found in the given paths.
pub fn execute(args: &AnalyzeArgs, verbose: bool) -> Result<(), PaneltoneError> {
    let options = args.options(&config::get_config().analysis);
    let files = collect_wallpapers(&args.paths)?;

    tracing::debug!(
        files = files.len(),
        threshold = options.luminance_threshold(),
        panel_height = options.panel_height(),
        "analyzing wallpapers"
    );

    let results = analyze_all(&files, &options);

    if args.json {
        print_json(&results)?;
    } else {
        print_table(&results, &options, verbose);
    }

    Ok(())
}

/// Expands the command line paths into the list of files to analyze.
///
/// Directories contribute their supported images in natural order; anything
/// else is passed through, so a missing file still yields a fallback result.
fn collect_wallpapers(paths: &[String]) -> Result<Vec<PathBuf>, PaneltoneError> {
    let mut files = Vec::new();

    for raw in paths {
        let path = expand(raw);

        if path.is_dir() {
            let images = list_images_in_directory(&path);
            if images.is_empty() {
                tracing::warn!(dir = %path.display(), "no supported images in directory");
            }
            files.extend(images);
        } else {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(PaneltoneError::InvalidArguments(format!(
            "No supported images found in: {}",
            paths.join(", ")
        )));
    }

    Ok(files)
}

/// Analyzes every file in parallel, keeping the input order.
fn analyze_all(files: &[PathBuf], options: &AnalysisOptions) -> Vec<(PathBuf, StyleResult)> {
    files
        .par_iter()
        .map(|path| (path.clone(), analyze_with(&ImageDecoder, path, options)))
        .collect()
}

fn print_json(results: &[(PathBuf, StyleResult)]) -> Result<(), PaneltoneError> {
    let value = match results {
        [(_, result)] => serde_json::to_value(result)?,
        _ => serde_json::to_value(
            results
                .iter()
                .map(|(path, result)| FileReport { path, result })
                .collect::<Vec<_>>(),
        )?,
    };

    output::print_highlighted_json(&value);
    Ok(())
}

fn print_table(results: &[(PathBuf, StyleResult)], options: &AnalysisOptions, swatches: bool) {
    let rows: Vec<ResultRow> =
        results.iter().map(|(path, result)| ResultRow::new(path, result, swatches)).collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .with(Modify::new(Columns::new(6..7)).with(Alignment::right()))
        .to_string();

    let count = results.len();
    let fallbacks = results.iter().filter(|(_, result)| result.is_fallback()).count();

    println!(
        "{}",
        format!(
            "Wallpapers ({count}) · threshold {:.3} · panel {}px",
            options.luminance_threshold(),
            options.panel_height()
        )
        .bold()
    );
    println!("{table}");

    if fallbacks > 0 {
        println!("{}", format!("{fallbacks} fell back to dark").yellow());
    }
}
