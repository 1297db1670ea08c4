//! # Printer Command Builders
//!
//! Low-level byte builders for the three command dialects the compiler
//! targets. Every function returns a fresh `Vec<u8>`; nothing here keeps
//! state.
//!
//! ## Module Structure
//!
//! - [`commands`]: Escape constants and Star Line Mode control (init, feed, cut, status)
//! - [`text`]: Star Line Mode character styling and positioning
//! - [`barcode`]: Star Line Mode barcodes and NV logos
//! - [`graphics`]: Star raster/band images and the Star Graphic command set
//! - [`escpos`]: The ESC/POS equivalents of all of the above
//!
//! ## Usage Example
//!
//! ```
//! use cometa::options::{Alignment, CutPaperAction};
//! use cometa::protocol::{commands, text};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(text::align(Alignment::Center));
//! data.extend(text::emphasis_on());
//! data.extend_from_slice(b"RECEIPT\n");
//! data.extend(text::emphasis_off());
//! data.extend(text::align(Alignment::Left));
//! data.extend(commands::cut(CutPaperAction::PartialCutWithFeed));
//! ```

pub mod barcode;
pub mod commands;
pub mod escpos;
pub mod graphics;
pub mod text;
