use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use std::path::{Path, PathBuf};

use crate::error::Result;

// Fixed-point BT.601 luma weights, scaled by 2^14
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// A decoded image reduced to what the comparison needs.
///
/// Only the grayscale plane is kept; the colour buffer is dropped as soon as
/// the record is built so that one record costs one byte per pixel.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub gray: GrayImage,
    pub width: u32,
    pub height: u32,
    /// Channel count of the decoded source image
    pub channels: u8,
}

impl ImageRecord {
    /// Build a record from a decoded image
    pub fn from_dynamic(path: impl Into<PathBuf>, image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            path: path.into(),
            gray: to_grayscale(image),
            width,
            height,
            channels: image.color().channel_count(),
        }
    }

    /// Pixel-area resolution (`width * height`)
    pub fn resolution(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Source of decoded images for the deduplicator
pub trait ImageLoader: Send + Sync {
    /// Load the image at `path`; any failure means the path cannot be compared
    fn load(&self, path: &Path) -> Result<ImageRecord>;
}

/// Loads images from the file system with the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageLoader;

impl ImageLoader for FsImageLoader {
    fn load(&self, path: &Path) -> Result<ImageRecord> {
        let image = image::open(path)?;
        Ok(ImageRecord::from_dynamic(path, &image))
    }
}

/// Convert to 8-bit grayscale with rounded BT.601 weights; alpha is ignored
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    let mut gray = GrayImage::new(rgb.width(), rgb.height());

    for (src, dst) in rgb.pixels().zip(gray.pixels_mut()) {
        let [r, g, b] = src.0;
        let luma = (r as u32 * LUMA_R
            + g as u32 * LUMA_G
            + b as u32 * LUMA_B
            + (1 << (LUMA_SHIFT - 1)))
            >> LUMA_SHIFT;
        *dst = Luma([luma as u8]);
    }

    gray
}
