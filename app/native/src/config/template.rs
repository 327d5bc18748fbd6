//! Configuration template generation.

use std::fs;
use std::path::Path;

/// Generates a JSONC configuration template with every option commented out
/// at its default value.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// paneltone configuration
// =======================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Command-line flags override anything set here.

{
  // ============================================================================
  // Analysis defaults
  // ============================================================================
  // "analysis": {
  //   // Mean luminance (0.0 - 1.0) below which the wallpaper counts as dark.
  //   // Lower it if light text shows up on wallpapers you consider bright.
  //   "luminanceThreshold": 0.575,
  //
  //   // Height of the panel in pixels. Only this strip of the wallpaper is sampled.
  //   "panelHeight": 32
  // },

  // ============================================================================
  // Wallpaper watching (paneltone watch)
  // ============================================================================
  // "watch": {
  //   // Wallpaper to watch when no path is passed on the command line.
  //   // Relative paths are resolved against this file's directory.
  //   "wallpaper": "",
  //
  //   // Milliseconds a change must settle before re-analysis (100 - 1000).
  //   "debounceMs": 150,
  //
  //   // Shell command run whenever the style changes.
  //   // The style is exported as $PANELTONE_STYLE.
  //   "exec": ""
  // }
}
"#
    .to_string()
}

/// Writes the template to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directories or the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PaneltoneConfig, parse_config};

    #[test]
    fn test_template_parses_to_default_config() {
        let template = generate_config_template();
        let config = parse_config(template.as_bytes()).unwrap();
        assert_eq!(config, PaneltoneConfig::default());
    }

    #[test]
    fn test_template_documents_every_option() {
        let template = generate_config_template();
        for key in ["luminanceThreshold", "panelHeight", "wallpaper", "debounceMs", "exec"] {
            assert!(template.contains(key), "template is missing {key}");
        }
    }

    #[test]
    fn test_uncommented_template_values_match_defaults() {
        // Uncomment option lines, leave explanatory comments alone.
        let uncommented: String = generate_config_template()
            .lines()
            .map(|line| {
                let rest = line.trim_start().strip_prefix("//").map(str::trim_start);
                match rest {
                    Some(rest) if rest.starts_with('"') || rest.starts_with('}') => rest,
                    _ => line,
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let config = parse_config(uncommented.as_bytes()).unwrap();
        assert_eq!(config, PaneltoneConfig::default());
    }

    #[test]
    fn test_create_config_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("paneltone").join("config.jsonc");

        create_config_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), generate_config_template());
    }
}
