use image::{imageops, ImageBuffer, Pixel};
use std::borrow::Cow;

/// The four axis-aligned orientations, measured counter-clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// All orientations in ascending angle order
    pub const ALL: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg90,
        Orientation::Deg180,
        Orientation::Deg270,
    ];

    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Dimensions of a `(width, height)` image after rotation
    pub fn rotated_dimensions(self, (width, height): (u32, u32)) -> (u32, u32) {
        match self {
            Self::Deg0 | Self::Deg180 => (width, height),
            Self::Deg90 | Self::Deg270 => (height, width),
        }
    }
}

/// Rotate an image buffer about its center.
///
/// Quarter turns are pixel-exact: the pixel count is preserved and width and
/// height are swapped for 90° and 270°. `Deg0` borrows the input.
pub fn rotate<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    orientation: Orientation,
) -> Cow<'_, ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel + 'static,
{
    // imageops turns clockwise
    match orientation {
        Orientation::Deg0 => Cow::Borrowed(image),
        Orientation::Deg90 => Cow::Owned(imageops::rotate270(image)),
        Orientation::Deg180 => Cow::Owned(imageops::rotate180(image)),
        Orientation::Deg270 => Cow::Owned(imageops::rotate90(image)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn numbered(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([(y * width + x) as u8]))
    }

    #[test]
    fn test_degrees_round_trip() {
        for orientation in Orientation::ALL {
            assert_eq!(
                Orientation::from_degrees(orientation.degrees()),
                Some(orientation)
            );
        }
        assert_eq!(Orientation::from_degrees(45), None);
    }

    #[test]
    fn test_zero_borrows_input() {
        let img = numbered(3, 2);
        let rotated = rotate(&img, Orientation::Deg0);
        assert!(matches!(rotated, Cow::Borrowed(_)));
        assert_eq!(*rotated, img);
    }

    #[test]
    fn test_quarter_turn_is_counter_clockwise() {
        // 0 1 2
        // 3 4 5
        let img = numbered(3, 2);
        let rotated = rotate(&img, Orientation::Deg90);

        // 2 5
        // 1 4
        // 0 3
        assert_eq!(rotated.dimensions(), (2, 3));
        assert_eq!(rotated.get_pixel(0, 0)[0], 2);
        assert_eq!(rotated.get_pixel(1, 0)[0], 5);
        assert_eq!(rotated.get_pixel(0, 2)[0], 0);
        assert_eq!(rotated.get_pixel(1, 2)[0], 3);
    }

    #[test]
    fn test_half_turn() {
        let img = numbered(3, 2);
        let rotated = rotate(&img, Orientation::Deg180);

        assert_eq!(rotated.dimensions(), (3, 2));
        assert_eq!(rotated.get_pixel(0, 0)[0], 5);
        assert_eq!(rotated.get_pixel(2, 1)[0], 0);
    }

    #[test]
    fn test_rotations_compose() {
        let img = numbered(5, 4);
        let once = rotate(&img, Orientation::Deg90).into_owned();
        let twice = rotate(&once, Orientation::Deg90).into_owned();
        let thrice = rotate(&twice, Orientation::Deg90).into_owned();
        let full = rotate(&thrice, Orientation::Deg90).into_owned();

        assert_eq!(twice, *rotate(&img, Orientation::Deg180));
        assert_eq!(thrice, *rotate(&img, Orientation::Deg270));
        assert_eq!(full, img);
    }

    #[test]
    fn test_colour_buffers_rotate() {
        let img = RgbImage::from_fn(4, 2, |x, y| Rgb([x as u8, y as u8, 7]));
        let rotated = rotate(&img, Orientation::Deg270);

        assert_eq!(rotated.dimensions(), (2, 4));
        assert_eq!(rotated.len(), img.len());
        for orientation in Orientation::ALL {
            assert_eq!(
                rotate(&img, orientation).dimensions(),
                orientation.rotated_dimensions(img.dimensions())
            );
        }
    }
}
