//! Wallpaper and configuration file watching.
//!
//! The parent directories are watched rather than the files themselves, since
//! wallpaper tools and editors usually replace a file by writing a temporary
//! one and renaming it over the original. Events are matched by file name and
//! debounced per file before they reach the session.
//!
//! The watcher follows the session: when the host reports a different
//! wallpaper (for example over `--stdin-events`), the new file is watched and
//! changes to the old one are ignored.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use super::debouncer::{Debouncer, KeyDebouncer};
use super::{Driver, PanelHost, SessionError, SessionEvent};
use crate::analysis::{AnalysisOptions, WallpaperDecoder};
use crate::config::{AnalysisConfig, DEFAULT_DEBOUNCE_MS, load_config_from_path};
use crate::platform::spawn_named_thread;

/// Upper bound on how long the event loop blocks before checking for a stop request.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

type NotifyReceiver = Receiver<notify::Result<notify::Event>>;

/// Which watched file an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Target {
    Wallpaper,
    Config,
}

/// What to watch and how.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSpec {
    /// Wallpaper file re-analyzed on change.
    pub wallpaper: PathBuf,
    /// Configuration file reloaded on change.
    pub config: Option<PathBuf>,
    /// Quiet time required before a change is acted on.
    pub debounce: Duration,
    /// Threshold from the command line. Wins over reloaded configuration.
    pub luminance_threshold: Option<f64>,
    /// Panel height from the command line. Wins over reloaded configuration.
    pub panel_height: Option<u32>,
}

impl WatchSpec {
    #[must_use]
    pub fn new(wallpaper: impl Into<PathBuf>) -> Self {
        Self {
            wallpaper: wallpaper.into(),
            config: None,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            luminance_threshold: None,
            panel_height: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub const fn with_overrides(mut self, luminance_threshold: Option<f64>, panel_height: Option<u32>) -> Self {
        self.luminance_threshold = luminance_threshold;
        self.panel_height = panel_height;
        self
    }

    /// Analysis options from `config` with the command line overrides applied.
    #[must_use]
    pub fn options(&self, config: &AnalysisConfig) -> AnalysisOptions {
        AnalysisOptions::new(
            self.luminance_threshold.unwrap_or(config.luminance_threshold),
            self.panel_height.unwrap_or(config.panel_height),
        )
    }

    /// Directories to register with the OS watcher, without duplicates.
    fn watched_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![parent_dir(&self.wallpaper)];

        if let Some(config) = &self.config {
            let dir = parent_dir(config);
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }

        dirs
    }

    /// Points the spec at a new wallpaper.
    ///
    /// Returns the directories that must be added to and removed from the OS
    /// watcher.
    fn retarget(&mut self, wallpaper: PathBuf) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let before = self.watched_dirs();
        self.wallpaper = wallpaper;
        let after = self.watched_dirs();

        let added = after.iter().filter(|dir| !before.contains(dir)).cloned().collect();
        let removed = before.into_iter().filter(|dir| !after.contains(dir)).collect();
        (added, removed)
    }

    /// Watched files touched by `event`.
    fn targets(&self, event: &notify::Event) -> Vec<Target> {
        if matches!(event.kind, EventKind::Access(_)) {
            return Vec::new();
        }

        let mut targets = Vec::new();

        if touches(event, &self.wallpaper) {
            targets.push(Target::Wallpaper);
        }
        if self.config.as_deref().is_some_and(|config| touches(event, config)) {
            targets.push(Target::Config);
        }

        targets
    }

    /// Session event for a settled change, if there is one to send.
    fn event_for(&self, target: Target) -> Option<SessionEvent> {
        match target {
            Target::Wallpaper => Some(SessionEvent::WallpaperChanged(self.wallpaper.clone())),
            Target::Config => {
                let path = self.config.as_deref()?;
                match load_config_from_path(path) {
                    Ok((config, _)) => {
                        tracing::info!(path = %path.display(), "configuration reloaded");
                        Some(SessionEvent::SettingsChanged(self.options(&config.analysis)))
                    }
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "keeping previous settings");
                        None
                    }
                }
            }
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn touches(event: &notify::Event, file: &Path) -> bool {
    let Some(name) = file.file_name() else {
        return false;
    };

    event.paths.iter().any(|path| path.file_name().is_some_and(|candidate| candidate == name))
}

/// A running watcher. Dropping the handle without calling [`WatchHandle::stop`]
/// leaves the watcher thread running for the rest of the process.
#[derive(Debug)]
pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Stops watching and waits for the watcher thread to exit.
    ///
    /// The thread notices the request within one poll interval.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.join_thread();
    }

    /// Blocks until the watcher thread exits.
    pub fn join(mut self) { self.join_thread(); }

    fn join_thread(&mut self) {
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("watcher thread panicked");
        }
    }
}

/// Starts watching `spec` and feeding changes into `driver`.
///
/// The driver is shared so the caller can keep dispatching its own events
/// (for example maximized window changes) while the watcher runs.
///
/// # Errors
///
/// Returns an error if a directory cannot be watched or the thread cannot be
/// spawned.
pub fn watch<H, D>(spec: WatchSpec, driver: Arc<Mutex<Driver<H, D>>>) -> Result<WatchHandle, SessionError>
where
    H: PanelHost + Send + 'static,
    D: WallpaperDecoder + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let mut watcher = notify::recommended_watcher(tx).map_err(|source| SessionError::Watch {
        path: spec.wallpaper.clone(),
        source,
    })?;

    for dir in spec.watched_dirs() {
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| SessionError::Watch { path: dir.clone(), source })?;
        tracing::debug!(dir = %dir.display(), "watching directory");
    }

    let stop = Arc::new(AtomicBool::new(false));
    let thread = spawn_named_thread("watcher", {
        let stop = Arc::clone(&stop);
        move || run_event_loop(spec, watcher, &rx, &driver, &stop)
    })?;

    Ok(WatchHandle { stop, thread: Some(thread) })
}

fn run_event_loop<H, D>(
    mut spec: WatchSpec,
    mut watcher: RecommendedWatcher,
    rx: &NotifyReceiver,
    driver: &Mutex<Driver<H, D>>,
    stop: &AtomicBool,
) where
    H: PanelHost,
    D: WallpaperDecoder,
{
    let mut pending: KeyDebouncer<Target> = Debouncer::new(spec.debounce);

    while !stop.load(Ordering::Relaxed) {
        let timeout = pending.next_deadline().map_or(POLL_INTERVAL, |deadline| {
            deadline.saturating_duration_since(Instant::now()).min(POLL_INTERVAL)
        });
        let received = rx.recv_timeout(timeout);

        let current = driver.lock().session().wallpaper().cloned();
        if let Some(current) = current
            && current != spec.wallpaper
        {
            follow_wallpaper(&mut spec, &mut watcher, current);
        }

        match received {
            Ok(Ok(event)) => {
                for target in spec.targets(&event) {
                    pending.touch(target);
                }
            }
            Ok(Err(err)) => tracing::warn!(error = %err, "watch error"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        for target in pending.drain_settled_keys() {
            let Some(event) = spec.event_for(target) else {
                continue;
            };

            let mut driver = driver.lock();
            // The host may have switched wallpapers since this change was seen.
            if let SessionEvent::WallpaperChanged(path) = &event
                && driver.session().wallpaper().is_some_and(|current| current != path)
            {
                tracing::debug!(path = %path.display(), "ignoring change to previous wallpaper");
                continue;
            }

            if let Err(err) = driver.dispatch(event) {
                tracing::warn!(error = %err, "failed to apply panel style");
            }
        }
    }

    tracing::debug!("watcher stopped");
}

/// Moves the OS watcher over to the directory of `wallpaper`.
fn follow_wallpaper(spec: &mut WatchSpec, watcher: &mut RecommendedWatcher, wallpaper: PathBuf) {
    tracing::info!(wallpaper = %wallpaper.display(), "following new wallpaper");
    let (added, removed) = spec.retarget(wallpaper);

    for dir in added {
        match watcher.watch(&dir, RecursiveMode::NonRecursive) {
            Ok(()) => tracing::debug!(dir = %dir.display(), "watching directory"),
            Err(err) => tracing::warn!(dir = %dir.display(), error = %err, "cannot watch wallpaper directory"),
        }
    }

    for dir in removed {
        if let Err(err) = watcher.unwatch(&dir) {
            tracing::debug!(dir = %dir.display(), error = %err, "failed to unwatch directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    use super::*;

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    fn spec() -> WatchSpec {
        WatchSpec::new("/walls/current.png").with_config(Some(PathBuf::from("/cfg/config.jsonc")))
    }

    #[test]
    fn test_default_debounce() {
        assert_eq!(WatchSpec::new("wall.png").debounce, Duration::from_millis(150));
    }

    #[test]
    fn test_watched_dirs_are_parents() {
        assert_eq!(spec().watched_dirs(), vec![PathBuf::from("/walls"), PathBuf::from("/cfg")]);
    }

    #[test]
    fn test_watched_dirs_deduplicate_shared_parent() {
        let spec = WatchSpec::new("/home/me/wall.png")
            .with_config(Some(PathBuf::from("/home/me/.paneltone.jsonc")));

        assert_eq!(spec.watched_dirs(), vec![PathBuf::from("/home/me")]);
    }

    #[test]
    fn test_bare_file_name_watches_current_dir() {
        assert_eq!(WatchSpec::new("wall.png").watched_dirs(), vec![PathBuf::from(".")]);
    }

    #[test]
    fn test_retarget_swaps_wallpaper_directory() {
        let mut spec = spec();

        let (added, removed) = spec.retarget(PathBuf::from("/other/next.png"));

        assert_eq!(added, vec![PathBuf::from("/other")]);
        assert_eq!(removed, vec![PathBuf::from("/walls")]);
        assert_eq!(spec.watched_dirs(), vec![PathBuf::from("/other"), PathBuf::from("/cfg")]);
    }

    #[test]
    fn test_retarget_within_directory_keeps_registration() {
        let mut spec = spec();

        let (added, removed) = spec.retarget(PathBuf::from("/walls/next.png"));

        assert!(added.is_empty());
        assert!(removed.is_empty());

        let modify = EventKind::Modify(ModifyKind::Any);
        assert!(spec.targets(&event(modify, "/walls/current.png")).is_empty());
        assert_eq!(spec.targets(&event(modify, "/walls/next.png")), vec![Target::Wallpaper]);
    }

    #[test]
    fn test_retarget_keeps_config_directory() {
        let mut spec = WatchSpec::new("/home/me/wall.png")
            .with_config(Some(PathBuf::from("/home/me/.paneltone.jsonc")));

        let (added, removed) = spec.retarget(PathBuf::from("/walls/next.png"));

        assert_eq!(added, vec![PathBuf::from("/walls")]);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_targets_match_by_file_name() {
        let spec = spec();

        let modify = EventKind::Modify(ModifyKind::Any);
        assert_eq!(spec.targets(&event(modify, "/walls/current.png")), vec![Target::Wallpaper]);
        assert_eq!(spec.targets(&event(modify, "/cfg/config.jsonc")), vec![Target::Config]);
        assert!(spec.targets(&event(modify, "/walls/other.png")).is_empty());

        // Rename-over from a temp file reports the final name too.
        let create = EventKind::Create(CreateKind::File);
        assert_eq!(spec.targets(&event(create, "/walls/current.png")), vec![Target::Wallpaper]);
    }

    #[test]
    fn test_access_events_are_ignored() {
        let access = EventKind::Access(AccessKind::Any);
        assert!(spec().targets(&event(access, "/walls/current.png")).is_empty());
    }

    #[test]
    fn test_overrides_win_over_config() {
        let config = AnalysisConfig { luminance_threshold: 0.3, panel_height: 24 };

        let plain = WatchSpec::new("wall.png");
        assert_eq!(plain.options(&config), AnalysisOptions::new(0.3, 24));

        let overridden = WatchSpec::new("wall.png").with_overrides(Some(0.7), None);
        assert_eq!(overridden.options(&config), AnalysisOptions::new(0.7, 24));
    }

    #[test]
    fn test_wallpaper_event_for_target() {
        assert_eq!(
            spec().event_for(Target::Wallpaper),
            Some(SessionEvent::WallpaperChanged(PathBuf::from("/walls/current.png")))
        );
    }

    #[test]
    fn test_config_reload_produces_settings_event() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.jsonc");
        std::fs::write(&config, r#"{ "analysis": { "panelHeight": 48 } } // comment"#).unwrap();

        let spec = WatchSpec::new(dir.path().join("wall.png")).with_config(Some(config));

        assert_eq!(
            spec.event_for(Target::Config),
            Some(SessionEvent::SettingsChanged(AnalysisOptions::default().with_panel_height(48)))
        );
    }

    #[test]
    fn test_fixed_config_reloads_after_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.jsonc");
        std::fs::write(&config, "{ not json").unwrap();

        let spec = WatchSpec::new(dir.path().join("wall.png")).with_config(Some(config.clone()));
        assert!(spec.event_for(Target::Config).is_none());

        std::fs::write(&config, r#"{ "analysis": { "luminanceThreshold": 0.4 } }"#).unwrap();
        assert_eq!(
            spec.event_for(Target::Config),
            Some(SessionEvent::SettingsChanged(AnalysisOptions::default().with_luminance_threshold(0.4)))
        );
    }

    #[test]
    fn test_broken_config_keeps_previous_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.jsonc");
        std::fs::write(&config, "{ not json").unwrap();

        let spec = WatchSpec::new(dir.path().join("wall.png")).with_config(Some(config));

        assert!(spec.event_for(Target::Config).is_none());
    }
}
