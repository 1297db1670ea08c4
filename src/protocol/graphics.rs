//! # Star Graphics Commands
//!
//! Raster and band image commands for Star Line Mode printers, plus the
//! Star Graphic (raster-only) command set.
//!
//! ## Graphics Modes Overview
//!
//! | Mode | Command | Description | Used for |
//! |------|---------|-------------|----------|
//! | Raster | ESC GS S | Arbitrary height | Thermal Star Line Mode printers |
//! | Band | ESC k | 24-row strips | Dot-impact printers |
//! | Star Graphic | ESC * r ... | One command per row | Raster-only printers |
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```

use super::commands::{ESC, FF, GS, NUL, u16_le};

/// Rows per `ESC GS S` command when a raster image is split.
pub const RASTER_CHUNK_ROWS: usize = 256;

/// Rows per `ESC k` band.
pub const BAND_ROWS: usize = 24;

/// Dots fed after each band (3mm at 203 DPI).
pub const BAND_FEED_DOTS: u8 = 24;

// ============================================================================
// STAR LINE MODE RASTER (ESC GS S)
// ============================================================================

/// # Raster Graphics (ESC GS S m xL xH yL yH n d1...dk)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC GS S m xL xH yL yH n d1...dk |
/// | Hex     | 1B 1D 53 m xL xH yL yH n d1...dk |
///
/// - `m`: 1 (monochrome)
/// - `x`: width in **bytes**
/// - `y`: height in rows
/// - `n`: 0 (black)
///
/// ```
/// use cometa::protocol::graphics;
///
/// let cmd = graphics::raster(16, 1, &[0xFF, 0x00]);
/// assert_eq!(cmd, vec![0x1B, 0x1D, 0x53, 1, 2, 0, 1, 0, 0, 0xFF, 0x00]);
/// ```
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);
    debug_assert_eq!(data.len(), width_bytes as usize * height as usize);

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(9 + data.len());
    cmd.extend([ESC, GS, b'S', 1, xl, xh, yl, yh, 0]);
    cmd.extend_from_slice(data);
    cmd
}

/// Raster image split into commands of at most [`RASTER_CHUNK_ROWS`] rows,
/// so a large image never overruns the printer's receive buffer.
pub fn raster_chunked(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8) as usize;
    let mut out = Vec::with_capacity(data.len() + 9 * (height as usize / RASTER_CHUNK_ROWS + 1));
    if width_bytes == 0 {
        return out;
    }
    for chunk in data.chunks(width_bytes * RASTER_CHUNK_ROWS) {
        let rows = (chunk.len() / width_bytes) as u16;
        out.extend(raster(width_dots, rows, chunk));
    }
    out
}

// ============================================================================
// BAND MODE (ESC k)
// ============================================================================

/// # Bit Image Band (ESC k n1 n2 d1...dk)
///
/// - `n1`: width in bytes
/// - `n2`: always 0
/// - `d1...dk`: k = n1 × 24 bytes, row-major
pub fn band(width_bytes: u8, data: &[u8]) -> Vec<u8> {
    debug_assert_eq!(data.len(), width_bytes as usize * BAND_ROWS);

    let mut cmd = Vec::with_capacity(4 + data.len());
    cmd.extend([ESC, b'k', width_bytes, 0]);
    cmd.extend_from_slice(data);
    cmd
}

/// Image split into 24-row bands, each followed by a unit feed.
///
/// The last band is padded with white rows. Rows wider than 255 bytes are
/// cropped on the right.
pub fn bands(width_dots: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8) as usize;
    if width_bytes == 0 {
        return Vec::new();
    }
    let n1 = width_bytes.min(u8::MAX as usize);
    let mut out = Vec::new();

    for rows in data.chunks(width_bytes * BAND_ROWS) {
        let mut band_data = Vec::with_capacity(n1 * BAND_ROWS);
        for row in rows.chunks(width_bytes) {
            band_data.extend_from_slice(&row[..n1.min(row.len())]);
        }
        band_data.resize(n1 * BAND_ROWS, 0x00);
        out.extend(band(n1 as u8, &band_data));
        out.extend(super::commands::unit_feed(u32::from(BAND_FEED_DOTS)));
    }
    out
}

// ============================================================================
// STAR GRAPHIC MODE (ESC * r)
// ============================================================================

/// Enter raster mode (ESC * r A).
#[inline]
pub fn enter_raster_mode() -> Vec<u8> {
    vec![ESC, b'*', b'r', b'A']
}

/// Quit raster mode (ESC * r B).
#[inline]
pub fn quit_raster_mode() -> Vec<u8> {
    vec![ESC, b'*', b'r', b'B']
}

/// # Transfer One Raster Line (b nL nH d1...dk)
pub fn raster_line(row: &[u8]) -> Vec<u8> {
    let len = row.len().min(u16::MAX as usize);
    let [nl, nh] = u16_le(len as u16);
    let mut cmd = Vec::with_capacity(3 + len);
    cmd.extend([b'b', nl, nh]);
    cmd.extend_from_slice(&row[..len]);
    cmd
}

/// Every row of a packed image as raster line commands.
pub fn raster_lines(width_dots: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8) as usize;
    if width_bytes == 0 {
        return Vec::new();
    }
    data.chunks(width_bytes).flat_map(raster_line).collect()
}

/// # Move Vertical Position (ESC * r Y n NUL)
///
/// `n` is sent as ASCII decimal digits.
pub fn raster_feed(dots: u32) -> Vec<u8> {
    let mut cmd = vec![ESC, b'*', b'r', b'Y'];
    cmd.extend(dots.to_string().into_bytes());
    cmd.push(NUL);
    cmd
}

/// # Eject and Cut (ESC FF NUL)
#[inline]
pub fn raster_form_feed() -> Vec<u8> {
    vec![ESC, FF, NUL]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_header() {
        let data = vec![0xFF; 72 * 10];
        let cmd = raster(576, 10, &data);
        assert_eq!(&cmd[..9], &[0x1B, 0x1D, 0x53, 1, 72, 0, 10, 0, 0]);
        assert_eq!(cmd.len(), 9 + 720);
    }

    #[test]
    fn test_raster_chunked_splits_at_256_rows() {
        let data = vec![0xAA; 2 * 300];
        let cmd = raster_chunked(16, 300, &data);
        // two commands: 256 rows + 44 rows
        assert_eq!(cmd.len(), 9 + 2 * 256 + 9 + 2 * 44);
        assert_eq!(&cmd[..9], &[0x1B, 0x1D, 0x53, 1, 2, 0, 0, 1, 0]);
        let second = 9 + 2 * 256;
        assert_eq!(&cmd[second..second + 9], &[0x1B, 0x1D, 0x53, 1, 2, 0, 44, 0, 0]);
    }

    #[test]
    fn test_bands_pad_last_band() {
        let data = vec![0xFF; 30];
        let cmd = bands(8, &data);
        // 2 bands of 24 rows, each followed by ESC J 24
        assert_eq!(cmd.len(), 2 * (4 + 24 + 3));
        assert_eq!(&cmd[..4], &[0x1B, 0x6B, 1, 0]);
        let second = 4 + 24 + 3;
        assert_eq!(cmd[second + 4 + 5], 0xFF);
        assert_eq!(cmd[second + 4 + 6], 0x00);
    }

    #[test]
    fn test_star_graphic_commands() {
        assert_eq!(enter_raster_mode(), b"\x1b*rA".to_vec());
        assert_eq!(quit_raster_mode(), b"\x1b*rB".to_vec());
        assert_eq!(raster_feed(120), b"\x1b*rY120\x00".to_vec());
        assert_eq!(raster_form_feed(), vec![0x1B, 0x0C, 0x00]);
        assert_eq!(raster_line(&[0x80, 0x01]), vec![b'b', 2, 0, 0x80, 0x01]);
    }

    #[test]
    fn test_raster_lines() {
        let cmd = raster_lines(16, &[1, 2, 3, 4]);
        assert_eq!(cmd, vec![b'b', 2, 0, 1, 2, b'b', 2, 0, 3, 4]);
    }
}
