#[allow(clippy::module_inception)]
#[cfg(test)]
mod tests {
    use crate::processing::{rotate, similarity, to_grayscale, Orientation};
    use image::{DynamicImage, Rgb, RgbImage};

    fn colour_pattern(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 7 + y * 13) % 256) as u8,
                ((x * x + y) % 256) as u8,
                (((x ^ y) * 3) % 256) as u8,
            ])
        })
    }

    #[test]
    fn test_grayscale_commutes_with_rotation() {
        let colour = colour_pattern(21, 13);

        for orientation in Orientation::ALL {
            let rotated_colour = rotate(&colour, orientation).into_owned();
            let gray_of_rotated = to_grayscale(&DynamicImage::ImageRgb8(rotated_colour));

            let gray = to_grayscale(&DynamicImage::ImageRgb8(colour.clone()));
            let rotated_gray = rotate(&gray, orientation);

            assert_eq!(gray_of_rotated, *rotated_gray, "{:?}", orientation);
        }
    }

    #[test]
    fn test_rotated_copy_matches_in_one_orientation() {
        let original = to_grayscale(&DynamicImage::ImageRgb8(colour_pattern(40, 40)));
        let turned = rotate(&original, Orientation::Deg180).into_owned();

        let scores: Vec<f64> = Orientation::ALL
            .iter()
            .map(|&o| similarity(&original, &rotate(&turned, o)))
            .collect();

        assert_eq!(scores[2], 1.0);
        assert!(scores[0] < 0.95);
    }

    #[test]
    fn test_non_square_rotation_changes_shape() {
        let original = to_grayscale(&DynamicImage::ImageRgb8(colour_pattern(30, 20)));
        let turned = rotate(&original, Orientation::Deg90).into_owned();

        // Upright the shapes differ, so the metric reports no similarity
        assert_eq!(similarity(&original, &turned), 0.0);
        assert_eq!(
            similarity(&original, &rotate(&turned, Orientation::Deg270)),
            1.0
        );
    }
}
