//! Image → packed 1-bit bitmap conversion.
//!
//! Pipeline: rotate → scale to the target width → flatten onto white →
//! luma → diffuse or threshold → MSB-first packed rows.

use image::imageops::FilterType;
use image::DynamicImage;

use super::dither;
use crate::error::CometaError;
use crate::job::BitmapParams;
use crate::options::BitmapRotation;

/// A monochrome image ready for a raster command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    /// Width in dots.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
    /// `ceil(width / 8) * height` bytes, row-major, MSB = leftmost dot.
    pub data: Vec<u8>,
}

impl MonoBitmap {
    pub fn width_bytes(&self) -> usize {
        self.width.div_ceil(8) as usize
    }
}

/// Convert a decoded image using the descriptor's bitmap parameters.
pub fn convert(image: &DynamicImage, params: &BitmapParams) -> Result<MonoBitmap, CometaError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CometaError::Image("image has no pixels".to_string()));
    }
    if params.width == 0 {
        return Err(CometaError::Image("target width is zero".to_string()));
    }

    let rotated = match params.rotation {
        BitmapRotation::Normal => image.clone(),
        BitmapRotation::Right90 => image.rotate90(),
        BitmapRotation::Left90 => image.rotate270(),
        BitmapRotation::Rotate180 => image.rotate180(),
    };

    let target_width = u32::from(params.width);
    let target_height = if params.both_scale {
        let aspect = rotated.height() as f32 / rotated.width() as f32;
        ((target_width as f32 * aspect).round() as u32).max(1)
    } else {
        rotated.height()
    };
    let target_height = target_height.min(u32::from(u16::MAX));
    let scaled = rotated.resize_exact(target_width, target_height, FilterType::Lanczos3);

    let width = scaled.width() as usize;
    let height = scaled.height() as usize;
    let intensity = darkness(&scaled);

    let dots = if params.diffusion {
        dither::floyd_steinberg(&intensity, width, height)
    } else {
        dither::threshold(&intensity)
    };

    Ok(MonoBitmap {
        width: width as u16,
        height: height as u16,
        data: dither::pack(&dots, width),
    })
}

/// Per-pixel darkness, with transparent pixels treated as white paper.
fn darkness(image: &DynamicImage) -> Vec<f32> {
    image
        .to_luma_alpha8()
        .pixels()
        .map(|p| {
            let luma = f32::from(p[0]) / 255.0;
            let alpha = f32::from(p[1]) / 255.0;
            let on_white = luma * alpha + (1.0 - alpha);
            1.0 - on_white
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    fn params(width: u16) -> BitmapParams {
        BitmapParams {
            width,
            ..BitmapParams::default()
        }
    }

    #[test]
    fn test_black_square_scales_with_aspect() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 5, Luma([0])));
        let bmp = convert(&img, &params(16)).unwrap();
        assert_eq!(bmp.width, 16);
        assert_eq!(bmp.height, 8);
        assert_eq!(bmp.data, vec![0xFF; 2 * 8]);
    }

    #[test]
    fn test_width_only_scaling_keeps_height() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 5, Luma([255])));
        let bmp = convert(
            &img,
            &BitmapParams {
                width: 40,
                both_scale: false,
                ..BitmapParams::default()
            },
        )
        .unwrap();
        assert_eq!((bmp.width, bmp.height), (40, 5));
        assert!(bmp.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rotation_swaps_axes() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 10, Luma([0])));
        let bmp = convert(
            &img,
            &BitmapParams {
                width: 10,
                rotation: BitmapRotation::Right90,
                ..BitmapParams::default()
            },
        )
        .unwrap();
        assert_eq!((bmp.width, bmp.height), (10, 20));
    }

    #[test]
    fn test_transparent_is_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0])));
        let bmp = convert(&img, &params(8)).unwrap();
        assert!(bmp.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_width_is_an_error() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([0])));
        assert!(convert(&img, &params(0)).is_err());
    }
}
