//! Panel hosts receive the styles a session decides on.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::Serialize;
use thiserror::Error;

use crate::analysis::{PanelStyle, StyleResult};
use crate::constants::{STYLE_ENV_VAR, WALLPAPER_ENV_VAR};

/// Errors raised by a panel host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to write style: {0}")]
    Output(#[from] io::Error),
    #[error("Failed to serialize style: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to run hook `{command}`: {source}")]
    Hook {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// A style the session wants on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedStyle {
    pub style: PanelStyle,
    pub maximized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallpaper: Option<PathBuf>,
    /// Analysis that produced the style. `None` when only the maximized
    /// state changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<StyleResult>,
}

/// The surface a panel style is applied to.
///
/// `start` and `stop` bracket a watch session; `apply_style` may be called any
/// number of times in between.
pub trait PanelHost {
    /// Prepares the host before the first style is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be initialized.
    fn start(&mut self) -> Result<(), HostError> { Ok(()) }

    /// Releases the host after the last style was applied.
    ///
    /// # Errors
    ///
    /// Returns an error if pending output cannot be flushed.
    fn stop(&mut self) -> Result<(), HostError> { Ok(()) }

    /// Applies a style.
    ///
    /// # Errors
    ///
    /// Returns an error if the style cannot be delivered.
    fn apply_style(&mut self, applied: &AppliedStyle) -> Result<(), HostError>;
}

/// Writes every applied style as one JSON line and optionally runs a shell hook
/// whenever the style changes.
///
/// Hook output is discarded so it cannot interleave with the JSON stream.
#[derive(Debug)]
pub struct ConsoleHost<W> {
    out: W,
    hook: Option<String>,
    last_style: Option<PanelStyle>,
}

impl ConsoleHost<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self { Self::new(io::stdout()) }
}

impl<W: Write> ConsoleHost<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out, hook: None, last_style: None }
    }

    /// Sets the shell command run on style changes.
    #[must_use]
    pub fn with_hook(mut self, hook: Option<String>) -> Self {
        self.hook = hook.filter(|command| !command.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn last_style(&self) -> Option<PanelStyle> { self.last_style }

    /// The writer styles are written to.
    #[must_use]
    pub const fn writer(&self) -> &W { &self.out }

    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> PanelHost for ConsoleHost<W> {
    fn stop(&mut self) -> Result<(), HostError> {
        self.out.flush()?;
        Ok(())
    }

    fn apply_style(&mut self, applied: &AppliedStyle) -> Result<(), HostError> {
        serde_json::to_writer(&mut self.out, applied)?;
        writeln!(self.out)?;
        self.out.flush()?;

        if self.last_style == Some(applied.style) {
            return Ok(());
        }
        self.last_style = Some(applied.style);

        if let Some(command) = &self.hook {
            run_hook(command, applied)?;
        }

        Ok(())
    }
}

fn run_hook(command: &str, applied: &AppliedStyle) -> Result<(), HostError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .env(STYLE_ENV_VAR, applied.style.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null());

    if let Some(wallpaper) = &applied.wallpaper {
        cmd.env(WALLPAPER_ENV_VAR, wallpaper);
    }

    let status = cmd.status().map_err(|source| HostError::Hook {
        command: command.to_string(),
        source,
    })?;

    if status.success() {
        tracing::debug!(command, style = %applied.style, "ran style hook");
    } else {
        tracing::warn!(command, %status, "style hook exited unsuccessfully");
    }

    Ok(())
}
