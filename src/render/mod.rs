//! # Rendering Module
//!
//! Everything between "some picture" and "packed dots for a raster command".
//!
//! ## Modules
//!
//! - [`decode`]: [`ImageDecoder`] trait and the default URL/file/bytes decoder
//! - [`rasterize`]: [`Rasterizer`] trait and the default Spleen text renderer
//! - [`bitmap`]: rotate, scale and binarize a decoded image into a [`MonoBitmap`]
//! - [`dither`]: Floyd–Steinberg diffusion, thresholding and row packing
//!
//! ## Usage Example
//!
//! ```
//! use cometa::job::BitmapParams;
//! use cometa::render::{bitmap, Rasterizer, SpleenRasterizer};
//!
//! let image = SpleenRasterizer.rasterize("TOTAL 12.50", 24.0, 384).unwrap();
//! let params = BitmapParams { width: 384, ..BitmapParams::default() };
//! let mono = bitmap::convert(&image, &params).unwrap();
//!
//! assert_eq!(mono.width, 384);
//! assert_eq!(mono.data.len(), 48 * mono.height as usize);
//! ```

pub mod bitmap;
pub mod decode;
pub mod dither;
pub mod rasterize;

pub use bitmap::MonoBitmap;
pub use decode::{DefaultImageDecoder, ImageDecoder};
pub use rasterize::{Rasterizer, SpleenRasterizer};
