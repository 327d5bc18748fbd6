//! Wallpaper decoding.
//!
//! Decoding is delegated to a [`WallpaperDecoder`] so hosts can plug in their own
//! image loader. [`ImageDecoder`] is the default and reads any format enabled in
//! the `image` crate.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use natord::compare;

use super::AnalysisError;
use super::region::ImageBuffer;

/// Extensions recognised when expanding a directory of wallpapers.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

/// Turns a wallpaper file into an [`ImageBuffer`].
pub trait WallpaperDecoder {
    /// Decodes the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::DecodeFailure` if the file is missing, unreadable
    /// or not a supported raster format.
    fn decode(&self, path: &Path) -> Result<ImageBuffer, AnalysisError>;
}

/// Decoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl WallpaperDecoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<ImageBuffer, AnalysisError> {
        let decode_failure = |message: String| AnalysisError::DecodeFailure {
            path: path.to_path_buf(),
            message,
        };

        // Sniff the format from the file contents; wallpapers are often misnamed.
        let img = ImageReader::open(path)
            .map_err(|err| decode_failure(err.to_string()))?
            .with_guessed_format()
            .map_err(|err| decode_failure(err.to_string()))?
            .decode()
            .map_err(|err| decode_failure(err.to_string()))?;

        buffer_from_dynamic(img)
    }
}

/// Converts a decoded image into an 8-bit RGB or RGBA buffer.
///
/// Images with an alpha channel keep it (4 channels); everything else,
/// including grayscale and 16-bit images, is converted to RGB.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidBuffer` only if the converted data does not
/// match its dimensions, which indicates a bug in the conversion.
pub fn buffer_from_dynamic(img: DynamicImage) -> Result<ImageBuffer, AnalysisError> {
    let (width, height) = (img.width(), img.height());

    if img.color().has_alpha() {
        ImageBuffer::from_rgba(width, height, img.into_rgba8().into_raw())
    } else {
        ImageBuffer::from_rgb(width, height, img.into_rgb8().into_raw())
    }
}

/// Checks if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Lists the supported images directly inside `dir`, in natural order.
#[must_use]
pub fn list_images_in_directory(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut images: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();

    images.sort_by(|a, b| compare(&a.to_string_lossy(), &b.to_string_lossy()));
    images
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("wall.jpg")));
        assert!(is_supported_image(Path::new("wall.JPEG")));
        assert!(is_supported_image(Path::new("/a/b/wall.WebP")));
        assert!(is_supported_image(Path::new("scan.tiff")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("wallpaper")));
    }

    #[test]
    fn test_is_supported_image_checks_last_extension() {
        assert!(is_supported_image(Path::new("backup.tar.png")));
        assert!(!is_supported_image(Path::new("wall.png.bak")));
    }

    #[test]
    fn test_buffer_from_rgb_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 3, Rgb([1, 2, 3])));
        let buffer = buffer_from_dynamic(img).unwrap();

        assert_eq!(buffer.channels(), 3);
        assert_eq!(buffer.row_stride(), 15);
        assert_eq!(&buffer.data()[0..3], &[1, 2, 3]);
    }

    #[test]
    fn test_buffer_from_rgba_image_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([9, 8, 7, 6])));
        let buffer = buffer_from_dynamic(img).unwrap();

        assert_eq!(buffer.channels(), 4);
        assert_eq!(&buffer.data()[0..4], &[9, 8, 7, 6]);
    }

    #[test]
    fn test_buffer_from_grayscale_expands_to_rgb() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([42])));
        let buffer = buffer_from_dynamic(img).unwrap();

        assert_eq!(buffer.channels(), 3);
        assert_eq!(&buffer.data()[0..3], &[42, 42, 42]);
    }

    #[test]
    fn test_decode_missing_file_is_decode_failure() {
        let err = ImageDecoder.decode(Path::new("/nonexistent/wallpaper.png")).unwrap_err();
        assert!(matches!(err, AnalysisError::DecodeFailure { .. }));
        assert!(err.to_string().contains("/nonexistent/wallpaper.png"));
    }

    #[test]
    fn test_decode_garbage_is_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        let err = ImageDecoder.decode(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::DecodeFailure { .. }));
    }

    #[test]
    fn test_decode_sniffs_misnamed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actually-a-png.jpg");
        RgbImage::from_pixel(8, 8, Rgb([200, 10, 10]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();

        let buffer = ImageDecoder.decode(&path).unwrap();
        assert_eq!(buffer.width(), 8);
        assert_eq!(&buffer.data()[0..3], &[200, 10, 10]);
    }

    #[test]
    fn test_list_images_in_directory_uses_natural_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["wall10.png", "wall2.png", "wall1.png", "readme.md"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = list_images_in_directory(dir.path())
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();

        assert_eq!(names, vec!["wall1.png", "wall2.png", "wall10.png"]);
    }

    #[test]
    fn test_list_images_in_missing_directory_is_empty() {
        assert!(list_images_in_directory(Path::new("/nonexistent/wallpapers")).is_empty());
    }
}
