//! # Structural Similarity
//!
//! Mean structural similarity (SSIM) of two grayscale buffers of equal shape.
//!
//! Every 7×7 window that lies fully inside the image contributes one local
//! index; the result is the mean over all windows (stride 1). Local statistics
//! use sample covariance (`N / (N - 1)` normalisation) and the usual
//! stabilising constants for an 8-bit data range:
//!
//! - `C1 = (0.01 * 255)^2`
//! - `C2 = (0.03 * 255)^2`
//!
//! Window sums are maintained incrementally as running column sums, so the
//! cost is linear in the pixel count and memory is linear in the width. All
//! sums are exact integers, which makes identical buffers score exactly 1.0.

use image::GrayImage;
use std::ops::{AddAssign, SubAssign};

/// Side length of the square comparison window
pub const WINDOW_SIZE: usize = 7;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DATA_RANGE: f64 = 255.0;

/// Raw moments of a pixel pair accumulated over a set of pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Moments {
    x: u64,
    y: u64,
    xx: u64,
    yy: u64,
    xy: u64,
}

impl Moments {
    #[inline]
    fn of(a: u8, b: u8) -> Self {
        let (a, b) = (a as u64, b as u64);
        Self {
            x: a,
            y: b,
            xx: a * a,
            yy: b * b,
            xy: a * b,
        }
    }
}

impl AddAssign for Moments {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.xx += rhs.xx;
        self.yy += rhs.yy;
        self.xy += rhs.xy;
    }
}

impl SubAssign for Moments {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.xx -= rhs.xx;
        self.yy -= rhs.yy;
        self.xy -= rhs.xy;
    }
}

/// Constants of the local index for one window size
struct WindowParams {
    n: f64,
    cov_norm: f64,
    c1: f64,
    c2: f64,
}

impl WindowParams {
    fn new(window: usize) -> Self {
        let n = (window * window) as f64;
        Self {
            n,
            cov_norm: if n > 1.0 { n / (n - 1.0) } else { 1.0 },
            c1: (K1 * DATA_RANGE).powi(2),
            c2: (K2 * DATA_RANGE).powi(2),
        }
    }

    /// SSIM index of one window from its moments
    #[inline]
    fn index(&self, m: &Moments) -> f64 {
        let ux = m.x as f64 / self.n;
        let uy = m.y as f64 / self.n;
        let vx = self.cov_norm * (m.xx as f64 / self.n - ux * ux);
        let vy = self.cov_norm * (m.yy as f64 / self.n - uy * uy);
        let vxy = self.cov_norm * (m.xy as f64 / self.n - ux * uy);

        let numerator = (2.0 * ux * uy + self.c1) * (2.0 * vxy + self.c2);
        let denominator = (ux * ux + uy * uy + self.c1) * (vx + vy + self.c2);
        numerator / denominator
    }
}

/// Compute the mean structural similarity of two grayscale images.
///
/// Returns a value in `[-1.0, 1.0]`, 1.0 only for identical buffers. Callers
/// are expected to pass equally shaped buffers; a shape mismatch yields 0.0.
/// Images smaller than the window in either dimension are compared with a
/// window the size of their smaller side.
pub fn similarity(a: &GrayImage, b: &GrayImage) -> f64 {
    if a.dimensions() != b.dimensions() {
        return 0.0;
    }

    let width = a.width() as usize;
    let height = a.height() as usize;
    if width == 0 || height == 0 {
        return 0.0;
    }

    let window = WINDOW_SIZE.min(width).min(height);
    let params = WindowParams::new(window);
    let (pa, pb) = (a.as_raw(), b.as_raw());

    let row_moments = |row: usize, col: usize| {
        let idx = row * width + col;
        Moments::of(pa[idx], pb[idx])
    };

    // Column sums over the rows currently covered by the window
    let mut columns = vec![Moments::default(); width];
    for row in 0..window {
        for (col, sum) in columns.iter_mut().enumerate() {
            *sum += row_moments(row, col);
        }
    }

    let mut total = 0.0;
    let mut count = 0u64;

    for top in 0..=(height - window) {
        if top > 0 {
            let leaving = top - 1;
            let entering = top + window - 1;
            for (col, sum) in columns.iter_mut().enumerate() {
                *sum -= row_moments(leaving, col);
                *sum += row_moments(entering, col);
            }
        }

        let mut moments = Moments::default();
        for sum in &columns[..window] {
            moments += *sum;
        }

        for left in 0..=(width - window) {
            if left > 0 {
                moments -= columns[left - 1];
                moments += columns[left + window - 1];
            }
            total += params.index(&moments);
            count += 1;
        }
    }

    total / count as f64
}
