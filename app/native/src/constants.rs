//! Application-wide constants.

/// Application name, used for config directories and thread names.
pub const APP_NAME: &str = "paneltone";

/// Configuration file names searched inside each config directory, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["config.jsonc", "config.json"];

/// Configuration file names searched directly in the home directory.
pub const LEGACY_CONFIG_FILE_NAMES: [&str; 2] = [".paneltone.jsonc", ".paneltone.json"];

/// Environment variable carrying the applied style to `--exec` hooks.
pub const STYLE_ENV_VAR: &str = "PANELTONE_STYLE";

/// Environment variable carrying the analyzed wallpaper path to `--exec` hooks.
pub const WALLPAPER_ENV_VAR: &str = "PANELTONE_WALLPAPER";

/// Identifier embedded in the generated JSON Schema.
pub const SCHEMA_ID: &str =
    "https://raw.githubusercontent.com/paneltone/paneltone/main/paneltone.schema.json";
