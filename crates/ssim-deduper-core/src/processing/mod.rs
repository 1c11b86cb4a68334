// Image decoding and comparison primitives
pub mod loader;
pub mod orientation;
pub mod similarity;

pub use loader::{to_grayscale, FsImageLoader, ImageLoader, ImageRecord};
pub use orientation::{rotate, Orientation};
pub use similarity::similarity;

#[cfg(test)]
mod tests;
