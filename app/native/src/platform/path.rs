//! Shell-like expansion for paths taken from the command line and the
//! configuration file.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the home directory.
///
/// Surrounding whitespace is trimmed; an empty string yields an empty path.
/// Anything other than a leading tilde is left untouched.
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Expands `path` and resolves it against `base_dir` when it is relative.
///
/// Wallpaper paths in the configuration file are relative to the file's own
/// directory. Without a base directory, relative paths stay relative to the
/// current working directory.
#[must_use]
pub fn expand_and_resolve(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let expanded = expand(path);

    match base_dir {
        Some(base) if !expanded.as_os_str().is_empty() && expanded.is_relative() => {
            base.join(expanded)
        }
        _ => expanded,
    }
}
