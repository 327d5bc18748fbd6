//! Panel styling sessions.
//!
//! A [`Session`] is a plain value describing what the panel currently shows.
//! Events are fed through [`Session::handle`], which returns the next session
//! together with at most one [`Effect`] for the caller to carry out. The
//! [`Driver`] runs those effects against a decoder and a [`PanelHost`]; the
//! [`watcher`] turns file system changes into events.
//!
//! ```text
//!            WallpaperChanged / SettingsChanged / ColorSchemeChanged
//!   Idle ─────────────────────────────────────────────► Analyzing
//!                                                           │ AnalysisFinished
//!   Applied(style) ◄────────────────────────────────────────┘
//! ```
//!
//! A maximized window covering the panel overrides the analyzed style with
//! [`PanelStyle::Maximized`] until it goes away.

pub mod debouncer;
pub mod host;
pub mod watcher;

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub use debouncer::{Debouncer, KeyDebouncer};
pub use host::{AppliedStyle, ConsoleHost, HostError, PanelHost};
pub use watcher::{WatchHandle, WatchSpec, watch};

use crate::analysis::{AnalysisOptions, PanelStyle, StyleResult, WallpaperDecoder, analyze_with};

/// Errors that can occur while running a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("Failed to watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("Failed to start watcher thread: {0}")]
    Thread(#[from] io::Error),
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "style", rename_all = "camelCase")]
pub enum SessionState {
    /// Nothing has been applied yet.
    #[default]
    Idle,
    /// A wallpaper analysis was requested and has not finished.
    Analyzing,
    /// A style is on screen.
    Applied(PanelStyle),
}

/// Something that happened around the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The wallpaper file was set or rewritten.
    WallpaperChanged(PathBuf),
    /// Threshold or panel height changed.
    SettingsChanged(AnalysisOptions),
    /// The desktop switched between light and dark mode.
    ColorSchemeChanged,
    /// A maximized window appeared (`true`) or went away (`false`).
    MaximizedChanged(bool),
    /// An analysis requested through [`Effect::Analyze`] completed.
    AnalysisFinished(StyleResult),
}

/// Error returned when a host command line cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown session command: {0}")]
pub struct ParseEventError(String);

impl FromStr for SessionEvent {
    type Err = ParseEventError;

    /// Parses the line protocol accepted by `paneltone watch --stdin-events`:
    ///
    /// - `wallpaper <path>`
    /// - `maximized [on|off]`, `unmaximized`
    /// - `color-scheme`
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, arg) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let arg = arg.trim();

        match (command, arg) {
            ("wallpaper", path) if !path.is_empty() => {
                Ok(Self::WallpaperChanged(crate::platform::expand(path)))
            }
            ("maximized", "" | "on" | "true" | "1") => Ok(Self::MaximizedChanged(true)),
            ("maximized", "off" | "false" | "0") | ("unmaximized", "") => {
                Ok(Self::MaximizedChanged(false))
            }
            ("color-scheme", "") => Ok(Self::ColorSchemeChanged),
            _ => Err(ParseEventError(line.to_string())),
        }
    }
}

/// Work a session asks its driver to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Analyze `path` and feed the result back as [`SessionEvent::AnalysisFinished`].
    Analyze { path: PathBuf, options: AnalysisOptions },
    /// Put a style on the panel.
    Apply(AppliedStyle),
}

/// The styling state of one panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    state: SessionState,
    options: AnalysisOptions,
    wallpaper: Option<PathBuf>,
    maximized: bool,
    analyzed: Option<PanelStyle>,
}

impl Session {
    #[must_use]
    pub fn new(options: AnalysisOptions) -> Self { Self { options, ..Self::default() } }

    #[must_use]
    pub const fn state(&self) -> SessionState { self.state }

    #[must_use]
    pub const fn options(&self) -> AnalysisOptions { self.options }

    #[must_use]
    pub fn wallpaper(&self) -> Option<&PathBuf> { self.wallpaper.as_ref() }

    #[must_use]
    pub const fn is_maximized(&self) -> bool { self.maximized }

    /// Style of the last finished analysis, ignoring the maximized override.
    #[must_use]
    pub const fn analyzed_style(&self) -> Option<PanelStyle> { self.analyzed }

    /// Consumes an event and returns the next session and the effect to run.
    #[must_use]
    pub fn handle(mut self, event: SessionEvent) -> (Self, Option<Effect>) {
        match event {
            SessionEvent::WallpaperChanged(path) => {
                self.wallpaper = Some(path);
                self.request_analysis()
            }
            SessionEvent::SettingsChanged(options) => {
                if options == self.options {
                    return (self, None);
                }
                self.options = options;
                self.request_analysis()
            }
            SessionEvent::ColorSchemeChanged => self.request_analysis(),
            SessionEvent::MaximizedChanged(maximized) => {
                if maximized == self.maximized {
                    return (self, None);
                }
                self.maximized = maximized;
                if self.state == SessionState::Analyzing {
                    // Applied once the pending analysis finishes.
                    return (self, None);
                }
                self.apply(None)
            }
            SessionEvent::AnalysisFinished(result) => {
                if self.state != SessionState::Analyzing {
                    tracing::debug!(style = %result.style, "ignoring stale analysis result");
                    return (self, None);
                }
                self.analyzed = Some(result.style);
                self.apply(Some(result))
            }
        }
    }

    fn request_analysis(mut self) -> (Self, Option<Effect>) {
        let Some(path) = self.wallpaper.clone() else {
            return (self, None);
        };

        self.state = SessionState::Analyzing;
        let options = self.options;
        (self, Some(Effect::Analyze { path, options }))
    }

    /// Applies the maximized override, or the analyzed style once it is gone.
    /// Without a finished analysis the panel falls back to dark.
    fn apply(mut self, analysis: Option<StyleResult>) -> (Self, Option<Effect>) {
        let style = if self.maximized {
            PanelStyle::Maximized
        } else {
            self.analyzed.unwrap_or(PanelStyle::Dark)
        };

        self.state = SessionState::Applied(style);
        let applied = AppliedStyle {
            style,
            maximized: self.maximized,
            wallpaper: self.wallpaper.clone(),
            analysis,
        };
        (self, Some(Effect::Apply(applied)))
    }
}

/// Runs a [`Session`] against a decoder and a host.
///
/// Effects are carried out synchronously inside [`Driver::dispatch`], so a
/// wallpaper change is analyzed and applied before the call returns.
#[derive(Debug)]
pub struct Driver<H, D> {
    session: Session,
    host: H,
    decoder: D,
}

impl<H: PanelHost, D: WallpaperDecoder> Driver<H, D> {
    #[must_use]
    pub fn new(host: H, decoder: D, options: AnalysisOptions) -> Self {
        Self { session: Session::new(options), host, decoder }
    }

    #[must_use]
    pub const fn session(&self) -> &Session { &self.session }

    #[must_use]
    pub const fn host(&self) -> &H { &self.host }

    /// Starts the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails to start.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.host.start()?;
        tracing::debug!("panel host started");
        Ok(())
    }

    /// Stops the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails to stop.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.host.stop()?;
        tracing::debug!("panel host stopped");
        Ok(())
    }

    /// Feeds an event through the session and runs the resulting effects.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects a style. The session keeps the
    /// state it reached.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<SessionState, SessionError> {
        let mut next = Some(event);

        while let Some(event) = next.take() {
            let (session, effect) = std::mem::take(&mut self.session).handle(event);
            self.session = session;

            match effect {
                Some(Effect::Analyze { path, options }) => {
                    tracing::debug!(path = %path.display(), "analyzing wallpaper");
                    let result = analyze_with(&self.decoder, &path, &options);
                    next = Some(SessionEvent::AnalysisFinished(result));
                }
                Some(Effect::Apply(applied)) => {
                    tracing::info!(style = %applied.style, maximized = applied.maximized, "applying panel style");
                    self.host.apply_style(&applied)?;
                }
                None => {}
            }
        }

        Ok(self.session.state())
    }
}
