//!
//! # Avatar Normalization
//!
//! Uploaded avatars are accepted as jpg/jpeg/png, capped at 1 MB, and
//! normalized to a fixed 250x250 PNG before storage, so the public avatar
//! route always serves `image/png` regardless of what was uploaded.

use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;

use crate::error::AppError;

/// Maximum accepted upload size in bytes.
pub const MAX_AVATAR_BYTES: usize = 1_000_000;

/// Output dimensions of every stored avatar.
pub const AVATAR_SIZE: u32 = 250;

/// Returns true when the uploaded filename carries an accepted extension.
pub fn has_allowed_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg") || lower.ends_with(".png")
}

/// Decodes the uploaded bytes, resizes to exactly 250x250 and re-encodes
/// as PNG. Undecodable input is a validation failure (the client sent
/// something that is not an image); an encoding failure is internal.
pub fn normalize(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| AppError::Validation(format!("File is not a valid image: {}", e)))?;

    let resized = decoded.resize_exact(AVATAR_SIZE, AVATAR_SIZE, FilterType::Lanczos3);

    let mut output = Cursor::new(Vec::new());
    resized
        .write_to(&mut output, ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("Failed to encode avatar: {}", e)))?;

    Ok(output.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Jpeg).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_extension_filter() {
        assert!(has_allowed_extension("profile-pic.jpg"));
        assert!(has_allowed_extension("profile-pic.JPEG"));
        assert!(has_allowed_extension("me.png"));
        assert!(!has_allowed_extension("document.pdf"));
        assert!(!has_allowed_extension("archive.jpg.zip"));
        assert!(!has_allowed_extension("noextension"));
    }

    #[test]
    fn test_normalize_produces_250_square_png() {
        let input = sample_jpeg(640, 480);
        let output = normalize(&input).unwrap();

        let normalized = image::load_from_memory_with_format(&output, ImageFormat::Png).unwrap();
        assert_eq!(normalized.width(), AVATAR_SIZE);
        assert_eq!(normalized.height(), AVATAR_SIZE);
    }

    #[test]
    fn test_normalize_rejects_non_image_data() {
        let result = normalize(b"%PDF-1.4 definitely not an image");
        match result {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("not a valid image"));
            }
            other => panic!("Expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_upscales_small_images() {
        let input = sample_jpeg(16, 16);
        let output = normalize(&input).unwrap();

        let normalized = image::load_from_memory(&output).unwrap();
        assert_eq!(normalized.width(), AVATAR_SIZE);
        assert_eq!(normalized.height(), AVATAR_SIZE);
    }
}
