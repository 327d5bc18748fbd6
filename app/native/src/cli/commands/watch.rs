//! Watch CLI command.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use parking_lot::Mutex;

use super::parse_threshold;
use crate::analysis::ImageDecoder;
use crate::config::{self, PaneltoneConfig};
use crate::error::PaneltoneError;
use crate::platform::expand;
use crate::session::{self, ConsoleHost, Driver, SessionEvent, WatchSpec};

/// Arguments for `paneltone watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Wallpaper to watch. Defaults to `watch.wallpaper` from the configuration.
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Mean luminance below which a wallpaper counts as dark (0.0 - 1.0).
    #[arg(long, short, value_name = "F", value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Height of the panel in pixels.
    #[arg(long, short, value_name = "PX")]
    pub panel_height: Option<u32>,

    /// Shell command run whenever the style changes.
    ///
    /// The new style is in `PANELTONE_STYLE` and the wallpaper path in
    /// `PANELTONE_WALLPAPER`.
    #[arg(long, short, value_name = "CMD")]
    pub exec: Option<String>,

    /// Milliseconds a change must settle before re-analysis (100 - 1000).
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(100..=1000))]
    pub debounce: Option<u64>,

    /// Read session commands from stdin, one per line.
    ///
    /// Accepts `maximized on`, `maximized off`, `color-scheme` and
    /// `wallpaper <path>`. Watching stops when stdin closes.
    #[arg(long)]
    pub stdin_events: bool,
}

impl WatchArgs {
    /// Resolves the wallpaper from the flag or the configuration.
    fn wallpaper(&self, config: &PaneltoneConfig) -> Result<PathBuf, PaneltoneError> {
        let config_dir = config::get_config_path().and_then(|path| path.parent());

        self.path
            .as_deref()
            .map(expand)
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| config.watch.wallpaper_path(config_dir))
            .ok_or_else(|| {
                PaneltoneError::InvalidArguments(
                    "No wallpaper to watch. Pass a path or set `watch.wallpaper` in the configuration."
                        .to_string(),
                )
            })
    }

    /// Builds the watch settings, flags first.
    fn spec(&self, wallpaper: PathBuf, config: &PaneltoneConfig) -> WatchSpec {
        let debounce_ms = self.debounce.unwrap_or_else(|| config.watch.debounce_ms());

        WatchSpec::new(wallpaper)
            .with_config(config::get_config_path().cloned())
            .with_debounce(Duration::from_millis(debounce_ms))
            .with_overrides(self.threshold, self.panel_height)
    }

    fn hook(&self, config: &PaneltoneConfig) -> Option<String> {
        self.exec.clone().or_else(|| config.watch.exec_command().map(str::to_string))
    }
}

/// Execute the watch command.
///
/// Runs until the process is interrupted, or until stdin closes when
/// `--stdin-events` is set.
///
/// # Errors
///
/// Returns an error if no wallpaper is configured, the wallpaper's directory
/// cannot be watched, or styles cannot be written to stdout.
pub fn execute(args: &WatchArgs) -> Result<(), PaneltoneError> {
    let config = config::get_config();
    let wallpaper = args.wallpaper(config)?;
    let spec = args.spec(wallpaper.clone(), config);

    let host = ConsoleHost::stdout().with_hook(args.hook(config));
    let driver = Arc::new(Mutex::new(Driver::new(host, ImageDecoder, spec.options(&config.analysis))));

    {
        let mut driver = driver.lock();
        driver.start()?;
        driver.dispatch(SessionEvent::WallpaperChanged(wallpaper.clone()))?;
    }

    tracing::info!(
        wallpaper = %wallpaper.display(),
        debounce = ?spec.debounce,
        "watching wallpaper"
    );

    let handle = session::watch(spec, Arc::clone(&driver))?;

    if args.stdin_events {
        let result = forward_stdin_events(&driver);
        handle.stop();
        result?;
    } else {
        handle.join();
    }

    driver.lock().stop()?;
    Ok(())
}

/// Dispatches session commands read from stdin until it closes.
fn forward_stdin_events<H, D>(driver: &Mutex<Driver<H, D>>) -> Result<(), PaneltoneError>
where
    H: session::PanelHost,
    D: crate::analysis::WallpaperDecoder,
{
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<SessionEvent>() {
            Ok(event) => {
                if let Err(err) = driver.lock().dispatch(event) {
                    tracing::warn!(error = %err, "failed to apply panel style");
                }
            }
            Err(err) => tracing::warn!(error = %err, "ignoring stdin command"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::commands::{Cli, Commands};

    fn watch_args(args: &[&str]) -> WatchArgs {
        let argv = ["paneltone", "watch"].iter().chain(args).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Watch(args) => args,
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_wallpaper_from_flag() {
        let args = watch_args(&["/walls/a.png"]);
        assert_eq!(args.wallpaper(&PaneltoneConfig::default()).unwrap(), PathBuf::from("/walls/a.png"));
    }

    #[test]
    fn test_wallpaper_from_config() {
        let mut config = PaneltoneConfig::default();
        config.watch.wallpaper = "/walls/configured.png".to_string();

        assert_eq!(watch_args(&[]).wallpaper(&config).unwrap(), PathBuf::from("/walls/configured.png"));
    }

    #[test]
    fn test_missing_wallpaper_is_an_argument_error() {
        let err = watch_args(&[]).wallpaper(&PaneltoneConfig::default()).unwrap_err();
        assert!(matches!(err, PaneltoneError::InvalidArguments(_)));
    }

    #[test]
    fn test_spec_prefers_flags() {
        let mut config = PaneltoneConfig::default();
        config.watch.debounce_ms = 900;

        let spec = watch_args(&["--debounce", "300", "--threshold", "0.4"])
            .spec(PathBuf::from("/walls/a.png"), &config);

        assert_eq!(spec.debounce, Duration::from_millis(300));
        assert_eq!(spec.luminance_threshold, Some(0.4));
        assert_eq!(spec.panel_height, None);
    }

    #[test]
    fn test_spec_clamps_configured_debounce() {
        let mut config = PaneltoneConfig::default();
        config.watch.debounce_ms = 5;

        let spec = watch_args(&[]).spec(PathBuf::from("/walls/a.png"), &config);
        assert_eq!(spec.debounce, Duration::from_millis(100));
    }

    #[test]
    fn test_hook_prefers_flag() {
        let mut config = PaneltoneConfig::default();
        config.watch.exec = "configured".to_string();

        assert_eq!(watch_args(&["--exec", "flag"]).hook(&config).as_deref(), Some("flag"));
        assert_eq!(watch_args(&[]).hook(&config).as_deref(), Some("configured"));
        assert_eq!(watch_args(&[]).hook(&PaneltoneConfig::default()), None);
    }
}
