#![allow(dead_code)]

use image::{imageops, Rgb, RgbImage};
use ssim_deduper_core::processing::{rotate, Orientation};
use std::path::{Path, PathBuf};

/// Deterministic noise so that distinct seeds give unrelated images
fn noise(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = x.wrapping_mul(374_761_393)
        ^ y.wrapping_mul(668_265_263)
        ^ seed.wrapping_mul(2_246_822_519);
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

/// A colour test image whose content depends only on `seed`
pub fn test_image(width: u32, height: u32, seed: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let n = noise(x, y, seed);
        Rgb([n as u8, (n >> 8) as u8, (n >> 16) as u8])
    })
}

/// `image` turned counter-clockwise by `degrees`
pub fn rotated(image: &RgbImage, degrees: u32) -> RgbImage {
    let orientation = Orientation::from_degrees(degrees).unwrap();
    rotate(image, orientation).into_owned()
}

/// `image` scaled by an integer factor
pub fn upscaled(image: &RgbImage, factor: u32) -> RgbImage {
    imageops::resize(
        image,
        image.width() * factor,
        image.height() * factor,
        imageops::FilterType::Nearest,
    )
}

/// Save `image` as a lossless PNG named `name` inside `dir`
pub fn write_png(dir: &Path, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

/// Write a file with an image extension that cannot be decoded
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"DUMMY IMAGE DATA").unwrap();
    path
}
