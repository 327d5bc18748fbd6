//! Checkerboard sampling and luminance statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AnalysisError;
use super::region::ImageBuffer;

/// Luma weights applied to normalized R, G and B.
///
/// These are the BT.601 coefficients. Output parity with existing panel themes
/// depends on these exact values, so they are not swapped for BT.709 ones.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Vertical distance between sampled rows.
const ROW_STEP: usize = 2;

/// Horizontal distance between sampled columns.
const COLUMN_STEP: usize = 4;

/// Column offset applied to every other sampled row.
const ALTERNATE_ROW_OFFSET: usize = 2;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    /// Relative luminosity of this color in `[0, 1]`.
    #[must_use]
    pub fn luminosity(self) -> f64 {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b
    }

    /// Formats the color as `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String { self.to_string() }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Luminance statistics for one sampled region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleStatistics {
    /// Average luminosity of the samples, in `[0, 1]`.
    pub mean_luminance: f64,
    /// Population standard deviation of the sample luminosity.
    pub luminance_std: f64,
    pub min_luminosity: f64,
    pub max_luminosity: f64,
    /// Color of the first sample with the lowest luminosity.
    #[serde(rename = "minRGB")]
    pub min_rgb: Rgb,
    /// Color of the first sample with the highest luminosity.
    #[serde(rename = "maxRGB")]
    pub max_rgb: Rgb,
    pub sample_count: u32,
    /// Width of the analyzed region in pixels.
    pub width: u32,
    /// Height of the analyzed region in pixels.
    pub height: u32,
}

impl SampleStatistics {
    /// Difference between the brightest and darkest sample.
    #[must_use]
    pub fn luminosity_range(&self) -> f64 { self.max_luminosity - self.min_luminosity }
}

/// Running sums over the sampled pixels.
struct Accumulator {
    sum: f64,
    sum_squares: f64,
    min: Option<(f64, Rgb)>,
    max: Option<(f64, Rgb)>,
    count: u32,
}

impl Accumulator {
    const fn new() -> Self {
        Self {
            sum: 0.0,
            sum_squares: 0.0,
            min: None,
            max: None,
            count: 0,
        }
    }

    fn push(&mut self, color: Rgb) {
        let luminosity = color.luminosity();

        self.sum += luminosity;
        self.sum_squares += luminosity * luminosity;
        self.count += 1;

        // Strict comparisons: ties keep the first pixel seen.
        if self.min.is_none_or(|(min, _)| luminosity < min) {
            self.min = Some((luminosity, color));
        }
        if self.max.is_none_or(|(max, _)| luminosity > max) {
            self.max = Some((luminosity, color));
        }
    }

    fn finish(self, width: u32, height: u32) -> Result<SampleStatistics, AnalysisError> {
        let (Some((min_luminosity, min_rgb)), Some((max_luminosity, max_rgb))) =
            (self.min, self.max)
        else {
            return Err(AnalysisError::EmptySampleRegion { width, height });
        };

        let count = f64::from(self.count);

        // A single distinct value has no spread; skip the subtraction so
        // rounding cannot leave a tiny non-zero deviation behind.
        let (mean_luminance, luminance_std) = if min_luminosity == max_luminosity {
            (min_luminosity, 0.0)
        } else {
            let mean = self.sum / count;
            let variance = (self.sum_squares / count - mean * mean).max(0.0);
            (mean.clamp(min_luminosity, max_luminosity), variance.sqrt())
        };

        Ok(SampleStatistics {
            mean_luminance,
            luminance_std,
            min_luminosity,
            max_luminosity,
            min_rgb,
            max_rgb,
            sample_count: self.count,
            width,
            height,
        })
    }
}

/// Samples a raw pixel buffer and computes its luminance statistics.
///
/// Rows are visited every 2 pixels and columns every 4, starting at column 2 on
/// rows where `y % 4 != 0`, which yields a sparse checkerboard. Alpha, when
/// present, is ignored.
///
/// # Errors
///
/// Returns `AnalysisError::EmptySampleRegion` if no pixel is sampled, and
/// `AnalysisError::InvalidBuffer` if the layout does not fit in `buffer`.
pub fn analyze_pixels(
    buffer: &[u8],
    width: u32,
    height: u32,
    row_stride: usize,
    channels: usize,
) -> Result<SampleStatistics, AnalysisError> {
    if channels < 3 {
        return Err(AnalysisError::InvalidBuffer(format!(
            "cannot sample {channels}-channel pixels"
        )));
    }

    let mut acc = Accumulator::new();

    for y in (0..height as usize).step_by(ROW_STEP) {
        let start = if y % 4 == 0 { 0 } else { ALTERNATE_ROW_OFFSET };

        for x in (start..width as usize).step_by(COLUMN_STEP) {
            let offset = y * row_stride + x * channels;
            let Some(&[r, g, b]) = buffer.get(offset..offset + 3) else {
                return Err(AnalysisError::InvalidBuffer(format!(
                    "pixel ({x}, {y}) at byte {offset} lies outside a {}-byte buffer",
                    buffer.len()
                )));
            };
            acc.push(Rgb::new(r, g, b));
        }
    }

    acc.finish(width, height)
}

/// Computes the luminance statistics of a whole [`ImageBuffer`].
///
/// # Errors
///
/// Returns `AnalysisError::EmptySampleRegion` if the buffer yields no samples.
pub fn analyze_region(region: &ImageBuffer) -> Result<SampleStatistics, AnalysisError> {
    analyze_pixels(
        region.data(),
        region.width(),
        region.height(),
        region.row_stride(),
        region.channels(),
    )
}
