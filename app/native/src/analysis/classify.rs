//! Panel style labels and the rules that pick one from sampled statistics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sampling::SampleStatistics;

/// Standard deviation above which a background counts as busy (45 / 255).
pub const STD_THRESHOLD: f64 = 45.0 / 255.0;

/// One-tailed z-score for a 95% confidence bound on the sampled mean.
pub const CONFIDENCE_Z: f64 = 1.645;

/// Luminosity range above which a background counts as high-contrast.
pub const CONTRAST_THRESHOLD: f64 = 0.5;

/// Visual style applied to the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelStyle {
    /// Dark background, light text.
    #[default]
    Dark,
    /// Light background, dark text.
    Light,
    /// Busy dark background; the panel gets a translucent backdrop.
    TranslucentDark,
    /// Busy light background; the panel gets a translucent backdrop.
    TranslucentLight,
    /// A maximized window covers the panel.
    ///
    /// Only assigned by the session layer, never by [`classify`].
    Maximized,
}

impl PanelStyle {
    /// The four styles the classifier can produce.
    pub const CLASSIFIED: [Self; 4] =
        [Self::Dark, Self::Light, Self::TranslucentDark, Self::TranslucentLight];

    /// The label used in configuration, output and hook environments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::TranslucentDark => "translucent-dark",
            Self::TranslucentLight => "translucent-light",
            Self::Maximized => "maximized",
        }
    }

    /// Returns `true` for `dark` and `translucent-dark`.
    #[must_use]
    pub const fn is_dark_family(self) -> bool {
        matches!(self, Self::Dark | Self::TranslucentDark)
    }

    /// Returns `true` for `light` and `translucent-light`.
    #[must_use]
    pub const fn is_light_family(self) -> bool {
        matches!(self, Self::Light | Self::TranslucentLight)
    }

    #[must_use]
    pub const fn is_translucent(self) -> bool {
        matches!(self, Self::TranslucentDark | Self::TranslucentLight)
    }
}

impl fmt::Display for PanelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for PanelStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "translucent-dark" => Ok(Self::TranslucentDark),
            "translucent-light" => Ok(Self::TranslucentLight),
            "maximized" => Ok(Self::Maximized),
            _ => Err(format!(
                "Invalid style '{s}'. Expected dark, light, translucent-dark, translucent-light or maximized."
            )),
        }
    }
}

/// The individual decisions behind a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// The sampled mean lies below the luminance threshold.
    pub is_dark: bool,
    /// The standard deviation exceeds [`STD_THRESHOLD`].
    pub high_variance: bool,
    /// The mean is below the threshold, but its 95% upper bound is not.
    pub near_boundary: bool,
    /// The luminosity range exceeds [`CONTRAST_THRESHOLD`].
    pub high_contrast: bool,
}

impl Verdict {
    /// Evaluates every rule against `stats`.
    #[must_use]
    pub fn evaluate(stats: &SampleStatistics, luminance_threshold: f64) -> Self {
        let mean = stats.mean_luminance;
        let std = stats.luminance_std;

        let is_dark = mean < luminance_threshold;

        Self {
            is_dark,
            high_variance: std > STD_THRESHOLD,
            near_boundary: is_dark && mean + CONFIDENCE_Z * std > luminance_threshold,
            high_contrast: stats.luminosity_range() > CONTRAST_THRESHOLD,
        }
    }

    /// A busy background needs a translucent panel to stay legible.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        self.high_variance || self.near_boundary || self.high_contrast
    }

    #[must_use]
    pub const fn style(self) -> PanelStyle {
        match (self.is_dark, self.is_busy()) {
            (true, true) => PanelStyle::TranslucentDark,
            (true, false) => PanelStyle::Dark,
            (false, true) => PanelStyle::TranslucentLight,
            (false, false) => PanelStyle::Light,
        }
    }
}

/// Picks the panel style for a sampled region.
#[must_use]
pub fn classify(stats: &SampleStatistics, luminance_threshold: f64) -> PanelStyle {
    let verdict = Verdict::evaluate(stats, luminance_threshold);
    let style = verdict.style();

    tracing::debug!(
        mean = stats.mean_luminance,
        std = stats.luminance_std,
        threshold = luminance_threshold,
        is_dark = verdict.is_dark,
        high_variance = verdict.high_variance,
        near_boundary = verdict.near_boundary,
        high_contrast = verdict.high_contrast,
        %style,
        "classified panel strip"
    );

    style
}
