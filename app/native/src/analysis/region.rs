//! Decoded raster buffers and panel strip extraction.
//!
//! The panel only overlaps the top of the wallpaper, so analysis never looks
//! past the strip returned by [`extract_top_strip`].

use super::AnalysisError;

/// Margin in pixels excluded from every evaluated edge of the strip.
///
/// Rounded screen corners and anti-aliased borders tend to bleed into the
/// outermost pixels of a wallpaper.
pub const PADDING: u32 = 4;

/// A decoded raster image.
///
/// Rows may be padded: `row_stride` can exceed `width * channels`. Only RGB and
/// RGBA layouts (3 or 4 channels, 8 bits each) are representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    row_stride: usize,
    channels: usize,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Creates a buffer after checking that `data` really holds the described layout.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidBuffer` if the channel count is not 3 or 4,
    /// the stride is narrower than a row, or `data` is too short.
    pub fn new(
        width: u32,
        height: u32,
        row_stride: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, AnalysisError> {
        if channels != 3 && channels != 4 {
            return Err(AnalysisError::InvalidBuffer(format!(
                "expected 3 or 4 channels, got {channels}"
            )));
        }

        let row_bytes = width as usize * channels;
        if row_stride < row_bytes {
            return Err(AnalysisError::InvalidBuffer(format!(
                "row stride {row_stride} is smaller than a {width}px row ({row_bytes} bytes)"
            )));
        }

        // The last row does not need to carry trailing padding.
        let required = if height == 0 {
            0
        } else {
            (height as usize - 1) * row_stride + row_bytes
        };
        if data.len() < required {
            return Err(AnalysisError::InvalidBuffer(format!(
                "buffer holds {} bytes, {width}x{height} needs {required}",
                data.len()
            )));
        }

        Ok(Self { width, height, row_stride, channels, data })
    }

    /// Creates a tightly packed RGB buffer.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidBuffer` if `data` is shorter than `width * height * 3`.
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AnalysisError> {
        Self::new(width, height, width as usize * 3, 3, data)
    }

    /// Creates a tightly packed RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidBuffer` if `data` is shorter than `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AnalysisError> {
        Self::new(width, height, width as usize * 4, 4, data)
    }

    #[must_use]
    pub const fn width(&self) -> u32 { self.width }

    #[must_use]
    pub const fn height(&self) -> u32 { self.height }

    #[must_use]
    pub const fn row_stride(&self) -> usize { self.row_stride }

    #[must_use]
    pub const fn channels(&self) -> usize { self.channels }

    /// Raw pixel bytes, row by row.
    #[must_use]
    pub fn data(&self) -> &[u8] { &self.data }

    /// Returns `true` if the buffer contains no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.width == 0 || self.height == 0 }
}

/// Crops the strip of `image` that sits behind a panel `panel_height` pixels tall.
///
/// The strip starts at `(PADDING, PADDING)`, is `max(1, width - 2 * PADDING)`
/// wide and `min(panel_height, height) - PADDING` tall (saturating at zero).
/// A panel no taller than the padding yields a strip with zero rows, which the
/// sampler reports as an empty region.
///
/// Images smaller than the padding produce an empty strip instead of reading
/// outside the source.
#[must_use]
pub fn extract_top_strip(image: &ImageBuffer, panel_height: u32) -> ImageBuffer {
    let width = image
        .width
        .saturating_sub(2 * PADDING)
        .max(1)
        .min(image.width.saturating_sub(PADDING));
    let height = panel_height.min(image.height).saturating_sub(PADDING);

    let channels = image.channels;
    let row_bytes = width as usize * channels;
    let mut data = Vec::with_capacity(row_bytes * height as usize);

    if row_bytes > 0 {
        let x_offset = PADDING as usize * channels;
        for row in 0..height as usize {
            let start = (PADDING as usize + row) * image.row_stride + x_offset;
            data.extend_from_slice(&image.data[start..start + row_bytes]);
        }
    }

    tracing::trace!(
        source_width = image.width,
        source_height = image.height,
        width,
        height,
        "extracted panel strip"
    );

    ImageBuffer {
        width,
        height,
        row_stride: row_bytes,
        channels,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds an RGB image where each pixel encodes its own coordinates.
    fn coordinate_image(width: u32, height: u32) -> ImageBuffer {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 7]);
            }
        }
        ImageBuffer::from_rgb(width, height, data).unwrap()
    }

    #[test]
    fn test_new_rejects_unsupported_channel_count() {
        let err = ImageBuffer::new(2, 2, 4, 2, vec![0; 8]).unwrap_err();
        assert!(err.to_string().contains("3 or 4 channels"));
    }

    #[test]
    fn test_new_rejects_narrow_stride() {
        let err = ImageBuffer::new(4, 1, 8, 3, vec![0; 12]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidBuffer(_)));
    }

    #[test]
    fn test_new_rejects_short_buffer() {
        let err = ImageBuffer::from_rgba(4, 4, vec![0; 63]).unwrap_err();
        assert!(err.to_string().contains("needs 64"));
    }

    #[test]
    fn test_new_accepts_last_row_without_padding() {
        // Two rows of 2 RGB pixels with a 8-byte stride: 8 + 6 bytes.
        let buffer = ImageBuffer::new(2, 2, 8, 3, vec![0; 14]).unwrap();
        assert_eq!(buffer.row_stride(), 8);
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_strip_dimensions() {
        let image = coordinate_image(100, 60);
        let strip = extract_top_strip(&image, 32);

        assert_eq!(strip.width(), 92);
        assert_eq!(strip.height(), 28);
        assert_eq!(strip.channels(), 3);
        assert_eq!(strip.row_stride(), 92 * 3);
        assert_eq!(strip.data().len(), 92 * 28 * 3);
    }

    #[test]
    fn test_strip_starts_at_padding_offset() {
        let image = coordinate_image(40, 40);
        let strip = extract_top_strip(&image, 20);

        assert_eq!(&strip.data()[0..3], &[4, 4, 7]);
        let second_row = strip.row_stride();
        assert_eq!(&strip.data()[second_row..second_row + 3], &[4, 5, 7]);
    }

    #[test]
    fn test_strip_height_is_capped_by_image_height() {
        let image = coordinate_image(20, 10);
        let strip = extract_top_strip(&image, 500);
        assert_eq!(strip.height(), 6);
    }

    #[test]
    fn test_panel_shorter_than_padding_yields_zero_rows() {
        let image = coordinate_image(100, 100);
        let strip = extract_top_strip(&image, 2);

        assert_eq!(strip.height(), 0);
        assert!(strip.is_empty());
        assert!(strip.data().is_empty());
    }

    #[test]
    fn test_narrow_image_keeps_single_column() {
        let image = coordinate_image(6, 20);
        let strip = extract_top_strip(&image, 10);

        assert_eq!(strip.width(), 1);
        assert_eq!(&strip.data()[0..3], &[4, 4, 7]);
    }

    #[test]
    fn test_image_narrower_than_padding_yields_empty_strip() {
        let image = coordinate_image(3, 20);
        let strip = extract_top_strip(&image, 10);

        assert_eq!(strip.width(), 0);
        assert!(strip.is_empty());
    }

    #[test]
    fn test_strip_respects_source_row_padding() {
        // 10x10 RGBA image with 8 bytes of padding at the end of each row.
        let stride = 10 * 4 + 8;
        let mut data = vec![0u8; stride * 10];
        for y in 0..10 {
            for x in 0..10 {
                let offset = y * stride + x * 4;
                data[offset] = (y * 10 + x) as u8;
            }
        }
        let image = ImageBuffer::new(10, 10, stride, 4, data).unwrap();
        let strip = extract_top_strip(&image, 8);

        assert_eq!(strip.width(), 2);
        assert_eq!(strip.height(), 4);
        assert_eq!(strip.data()[0], 44);
        assert_eq!(strip.data()[strip.row_stride()], 54);
    }
}
