//! Wallpaper style classification.
//!
//! Decides how a panel drawn over the top of a wallpaper should be styled so its
//! contents stay legible. The pipeline is:
//!
//! 1. decode the wallpaper ([`decode`]),
//! 2. crop the strip behind the panel ([`region`]),
//! 3. sample luminance statistics ([`sampling`]),
//! 4. map the statistics to a [`PanelStyle`] ([`classify`]).
//!
//! [`analyze`] runs all of it and never fails: any error turns into a `dark`
//! fallback result carrying the error message, since a dark panel is the
//! safest default for legibility.
//!
//! Everything here is pure and holds no shared state, so it can be called from
//! any number of threads at once.

pub mod classify;
pub mod decode;
pub mod region;
pub mod sampling;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub use classify::{PanelStyle, Verdict, classify};
pub use decode::{ImageDecoder, WallpaperDecoder};
pub use region::{ImageBuffer, PADDING, extract_top_strip};
pub use sampling::{Rgb, SampleStatistics, analyze_pixels, analyze_region};

/// Default luminance threshold separating dark from light backgrounds.
pub const DEFAULT_LUMINANCE_THRESHOLD: f64 = 0.575;

/// Default panel height in pixels.
pub const DEFAULT_PANEL_HEIGHT: u32 = 32;

/// Mean luminance reported by fallback results.
pub const FALLBACK_MEAN_LUMINANCE: f64 = 0.5;

/// Style reported when analysis is impossible.
pub const FALLBACK_STYLE: PanelStyle = PanelStyle::Dark;

/// Errors that can occur while analyzing a wallpaper.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The file is missing, unreadable, or not a supported image.
    #[error("Failed to decode {}: {message}", path.display())]
    DecodeFailure { path: PathBuf, message: String },
    /// The panel strip contains no sampled pixels.
    #[error("Panel strip {width}x{height} contains no samples")]
    EmptySampleRegion { width: u32, height: u32 },
    /// A decoder produced pixel data that does not match its layout.
    #[error("Invalid image buffer: {0}")]
    InvalidBuffer(String),
}

/// Caller-supplied analysis parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    luminance_threshold: f64,
    panel_height: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            luminance_threshold: DEFAULT_LUMINANCE_THRESHOLD,
            panel_height: DEFAULT_PANEL_HEIGHT,
        }
    }
}

impl AnalysisOptions {
    /// Creates options, clamping the threshold into `[0, 1]`.
    ///
    /// A NaN threshold falls back to [`DEFAULT_LUMINANCE_THRESHOLD`].
    #[must_use]
    pub fn new(luminance_threshold: f64, panel_height: u32) -> Self {
        Self::default()
            .with_luminance_threshold(luminance_threshold)
            .with_panel_height(panel_height)
    }

    #[must_use]
    pub fn with_luminance_threshold(mut self, threshold: f64) -> Self {
        self.luminance_threshold = if threshold.is_nan() {
            DEFAULT_LUMINANCE_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    #[must_use]
    pub const fn with_panel_height(mut self, panel_height: u32) -> Self {
        self.panel_height = panel_height;
        self
    }

    #[must_use]
    pub const fn luminance_threshold(&self) -> f64 { self.luminance_threshold }

    #[must_use]
    pub const fn panel_height(&self) -> u32 { self.panel_height }
}

/// What an analysis produced besides the style.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// The strip was sampled successfully.
    Measured(SampleStatistics),
    /// Analysis failed; the style is the fallback.
    #[serde(rename_all = "camelCase")]
    Fallback { mean_luminance: f64, error: String },
}

/// The result of analyzing one wallpaper.
///
/// Serializes to `{ "style", ...statistics }` on success and to
/// `{ "style": "dark", "meanLuminance": 0.5, "error" }` on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleResult {
    pub style: PanelStyle,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl StyleResult {
    /// Builds the fallback result for a failed analysis.
    #[must_use]
    pub fn fallback(error: &AnalysisError) -> Self {
        Self {
            style: FALLBACK_STYLE,
            outcome: Outcome::Fallback {
                mean_luminance: FALLBACK_MEAN_LUMINANCE,
                error: error.to_string(),
            },
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool { matches!(self.outcome, Outcome::Fallback { .. }) }

    /// The sampled statistics, if analysis succeeded.
    #[must_use]
    pub const fn stats(&self) -> Option<&SampleStatistics> {
        match &self.outcome {
            Outcome::Measured(stats) => Some(stats),
            Outcome::Fallback { .. } => None,
        }
    }

    /// The failure message, if analysis failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Measured(_) => None,
            Outcome::Fallback { error, .. } => Some(error),
        }
    }

    #[must_use]
    pub const fn mean_luminance(&self) -> f64 {
        match &self.outcome {
            Outcome::Measured(stats) => stats.mean_luminance,
            Outcome::Fallback { mean_luminance, .. } => *mean_luminance,
        }
    }
}

/// Samples the panel strip of the wallpaper at `path`.
///
/// # Errors
///
/// Returns `AnalysisError::DecodeFailure` if the decoder rejects the file and
/// `AnalysisError::EmptySampleRegion` if the strip holds no samples.
pub fn measure<D: WallpaperDecoder + ?Sized>(
    decoder: &D,
    path: &Path,
    panel_height: u32,
) -> Result<SampleStatistics, AnalysisError> {
    let image = decoder.decode(path)?;
    let strip = extract_top_strip(&image, panel_height);
    let stats = analyze_region(&strip)?;

    tracing::debug!(
        path = %path.display(),
        samples = stats.sample_count,
        min = %stats.min_rgb,
        max = %stats.max_rgb,
        "sampled panel strip"
    );

    Ok(stats)
}

/// Classifies a wallpaper with an explicit decoder.
///
/// Never fails; see [`StyleResult::fallback`].
pub fn analyze_with<D: WallpaperDecoder + ?Sized>(
    decoder: &D,
    path: &Path,
    options: &AnalysisOptions,
) -> StyleResult {
    match measure(decoder, path, options.panel_height()) {
        Ok(stats) => StyleResult {
            style: classify(&stats, options.luminance_threshold()),
            outcome: Outcome::Measured(stats),
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "analysis failed, using fallback style");
            StyleResult::fallback(&err)
        }
    }
}

/// Classifies the wallpaper at `path` using the `image` crate decoder.
///
/// `luminance_threshold` is clamped into `[0, 1]`. The call always returns a
/// result; inspect [`StyleResult::error`] to detect a fallback.
pub fn analyze(path: impl AsRef<Path>, luminance_threshold: f64, panel_height: u32) -> StyleResult {
    analyze_with(
        &ImageDecoder,
        path.as_ref(),
        &AnalysisOptions::new(luminance_threshold, panel_height),
    )
}

/// Classifies the wallpaper at `path` with the default threshold and panel height.
pub fn analyze_default(path: impl AsRef<Path>) -> StyleResult {
    analyze_with(&ImageDecoder, path.as_ref(), &AnalysisOptions::default())
}
