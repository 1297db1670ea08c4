//! # Binarization
//!
//! Converts a grayscale intensity buffer into black/white dots for thermal
//! printing, then packs the dots into printer bytes.
//!
//! Intensities are darkness values in `[0.0, 1.0]`: `0.0` is white paper,
//! `1.0` is a fully black dot.
//!
//! ## Methods
//!
//! | Method | Behavior | Selected by |
//! |--------|----------|-------------|
//! | Floyd–Steinberg | Error diffusion, preserves gray tones | `diffusion: true` |
//! | Threshold | Dots darker than 50 % print | `diffusion: false` |
//!
//! ## Floyd–Steinberg Kernel
//!
//! ```text
//!            *    7/16
//!    3/16  5/16   1/16
//! ```
//!
//! The quantization error of each pixel is pushed onto its unvisited
//! neighbours, so a 50 % gray field comes out as a checkerboard-like
//! pattern with about half the dots set.

/// Print threshold for both methods.
pub const THRESHOLD: f32 = 0.5;

/// Binarize with a fixed 50 % threshold. Returns one `bool` per pixel,
/// row-major, `true` = print.
pub fn threshold(intensity: &[f32]) -> Vec<bool> {
    intensity.iter().map(|&v| v >= THRESHOLD).collect()
}

/// Binarize with Floyd–Steinberg error diffusion.
///
/// `intensity.len()` must equal `width * height`.
pub fn floyd_steinberg(intensity: &[f32], width: usize, height: usize) -> Vec<bool> {
    debug_assert_eq!(intensity.len(), width * height);

    let mut buf = intensity.to_vec();
    let mut out = vec![false; width * height];

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = buf[idx];
            let on = old >= THRESHOLD;
            out[idx] = on;
            let err = old - if on { 1.0 } else { 0.0 };

            if x + 1 < width {
                buf[idx + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < height {
                let below = idx + width;
                if x > 0 {
                    buf[below - 1] += err * 3.0 / 16.0;
                }
                buf[below] += err * 5.0 / 16.0;
                if x + 1 < width {
                    buf[below + 1] += err * 1.0 / 16.0;
                }
            }
        }
    }

    out
}

/// Pack a row of pixels into bytes.
///
/// ## Bit Packing
///
/// - Bit 7 (MSB) = leftmost pixel
/// - Bit 0 (LSB) = rightmost pixel
/// - 1 = black (print dot), 0 = white (no dot)
///
/// If the row length is not a multiple of 8, the last byte is padded
/// with zeros (white) on the right.
///
/// ```
/// use cometa::render::dither::pack_row;
///
/// let row = vec![true, true, true, true, false, false, false, false];
/// assert_eq!(pack_row(&row), vec![0xF0]);
///
/// let row = vec![true; 12];
/// assert_eq!(pack_row(&row), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }

    bytes
}

/// Pack a row-major dot buffer, one [`pack_row`] per row.
pub fn pack(dots: &[bool], width: usize) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    dots.chunks(width).flat_map(pack_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_extremes() {
        assert_eq!(threshold(&[0.0, 0.49, 0.5, 1.0]), vec![false, false, true, true]);
    }

    #[test]
    fn test_floyd_steinberg_solid_fields() {
        let white = floyd_steinberg(&[0.0; 64], 8, 8);
        assert!(white.iter().all(|&d| !d));

        let black = floyd_steinberg(&[1.0; 64], 8, 8);
        assert!(black.iter().all(|&d| d));
    }

    #[test]
    fn test_floyd_steinberg_preserves_mean() {
        let (w, h) = (32, 32);
        let dots = floyd_steinberg(&vec![0.25; w * h], w, h);
        let on = dots.iter().filter(|&&d| d).count() as f32 / (w * h) as f32;
        assert!((on - 0.25).abs() < 0.05, "got {on}");
    }

    #[test]
    fn test_diffusion_differs_from_threshold_on_gray() {
        let gray = vec![0.4; 16 * 16];
        let diffused = floyd_steinberg(&gray, 16, 16);
        let thresholded = threshold(&gray);
        assert!(thresholded.iter().all(|&d| !d));
        assert!(diffused.iter().any(|&d| d));
    }

    #[test]
    fn test_pack_pads_rows() {
        let dots = vec![true; 10 * 2];
        assert_eq!(pack(&dots, 10), vec![0xFF, 0xC0, 0xFF, 0xC0]);
    }
}
