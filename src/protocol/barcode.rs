//! # Star Line Mode Barcodes and Logos
//!
//! ## 1D Barcodes (ESC b)
//!
//! | Format  | Bytes |
//! |---------|-------|
//! | ASCII   | ESC b n1 n2 n3 n4 data RS |
//! | Hex     | 1B 62 n1 n2 n3 n4 data 1E |
//!
//! - `n1`: symbology (48 = UPC-E ... 56 = NW-7)
//! - `n2`: HRI selection, `'2'` prints text under the bars, `'1'` prints none;
//!   both feed one line afterwards
//! - `n3`: module width mode, `'1'`..=`'9'`
//! - `n4`: bar height in dots (1-255)
//!
//! ## Logos (ESC FS p n m)
//!
//! Prints logo number `n` stored in the printer's NV memory at
//! magnification `m`.

use super::commands::{ESC, FS, RS};
use crate::options::{BarcodeSymbology, BarcodeWidth, LogoSize};

/// Symbology code `n1`.
pub fn symbology_code(symbology: BarcodeSymbology) -> u8 {
    match symbology {
        BarcodeSymbology::UpcE => 48,
        BarcodeSymbology::UpcA => 49,
        BarcodeSymbology::Jan8 => 50,
        BarcodeSymbology::Jan13 => 51,
        BarcodeSymbology::Code39 => 52,
        BarcodeSymbology::Itf => 53,
        BarcodeSymbology::Code128 => 54,
        BarcodeSymbology::Code93 => 55,
        BarcodeSymbology::Nw7 => 56,
    }
}

/// # Print 1D Barcode (ESC b n1 n2 n3 n4 data RS)
///
/// ```
/// use cometa::options::{BarcodeSymbology, BarcodeWidth};
/// use cometa::protocol::barcode;
///
/// let cmd = barcode::barcode(BarcodeSymbology::Code39, BarcodeWidth::Mode2, 40, true, b"AB");
/// assert_eq!(cmd, vec![0x1B, 0x62, 52, 50, 50, 40, b'A', b'B', 0x1E]);
/// ```
pub fn barcode(
    symbology: BarcodeSymbology,
    width: BarcodeWidth,
    height: u8,
    hri: bool,
    data: &[u8],
) -> Vec<u8> {
    let n2 = if hri { b'2' } else { b'1' };
    let n3 = b'0' + width.mode_number();

    let mut cmd = Vec::with_capacity(7 + data.len());
    cmd.push(ESC);
    cmd.push(b'b');
    cmd.push(symbology_code(symbology));
    cmd.push(n2);
    cmd.push(n3);
    cmd.push(height.max(1));
    cmd.extend_from_slice(data);
    cmd.push(RS);
    cmd
}

/// # Print NV Logo (ESC FS p n m)
pub fn logo(key: u8, size: LogoSize) -> Vec<u8> {
    vec![ESC, FS, b'p', key, size.code()]
}
