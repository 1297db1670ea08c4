//! # ESC/POS Commands
//!
//! Command builders for Epson-compatible printers (the `EscPos` and
//! `EscPosMobile` emulations). Same shapes as the Star Line Mode builders,
//! different bytes.
//!
//! | Function | ESC/POS | Star Line Mode |
//! |----------|---------|----------------|
//! | Code page | ESC t n | ESC GS t n |
//! | Emphasis | ESC E 1/0 | ESC E / ESC F |
//! | Invert | GS B 1/0 | ESC 4 / ESC 5 |
//! | Font | ESC M n | ESC RS F n |
//! | Alignment | ESC a n | ESC GS a n |
//! | Absolute position | ESC $ nL nH | ESC GS A nL nH |
//! | Magnification | GS ! n | ESC i n1 n2 |
//! | Cut | GS V m \[n\] | ESC d n |
//! | Drawer | ESC p m t1 t2 | BEL / SUB |
//! | Logo | FS p n m | ESC FS p n m |
//! | Raster | GS v 0 | ESC GS S |

use super::commands::{DLE, EOT, ESC, FS, GS, NUL, u16_le};
use crate::options::{
    Alignment, BarcodeSymbology, BarcodeWidth, CodePage, CutPaperAction, FontStyle,
    International, LogoSize, PeripheralChannel,
};

/// Feed before a "with feed" cut, in dots.
pub const CUT_FEED_DOTS: u8 = 0x40;

/// Drawer pulse on-time and off-time, in 2 ms units.
const DRAWER_PULSE: (u8, u8) = (0x19, 0xFA);

/// Initialize printer (ESC @)
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// Character spacing (ESC SP n)
#[inline]
pub fn character_space(dots: u8) -> Vec<u8> {
    vec![ESC, b' ', dots]
}

/// ESC/POS character table number. Tables without an ESC/POS counterpart
/// map to PC437.
pub fn escpos_code_page(page: CodePage) -> u8 {
    match page {
        CodePage::Cp437 => 0,
        CodePage::Cp932 => 1,
        CodePage::Cp860 => 3,
        CodePage::Cp863 => 4,
        CodePage::Cp865 => 5,
        CodePage::Cp851 => 11,
        CodePage::Cp857 => 13,
        CodePage::Cp737 => 14,
        CodePage::Cp1252 => 16,
        CodePage::Cp866 => 17,
        CodePage::Cp852 => 18,
        CodePage::Cp858 => 19,
        CodePage::Cp874 => 21,
        CodePage::Cp772 => 25,
        CodePage::Cp774 => 26,
        CodePage::Cp855 => 34,
        CodePage::Cp861 => 35,
        CodePage::Cp862 => 36,
        CodePage::Cp864 => 37,
        CodePage::Cp869 => 38,
        CodePage::Cp928 => 39,
        CodePage::Cp1250 => 45,
        CodePage::Cp1251 => 46,
        CodePage::Blank => 255,
        other => {
            tracing::debug!(code_page = ?other, "no ESC/POS table, using PC437");
            0
        }
    }
}

/// Select character code table (ESC t n)
pub fn code_page(page: CodePage) -> Vec<u8> {
    vec![ESC, b't', escpos_code_page(page)]
}

/// Emphasized mode (ESC E n)
#[inline]
pub fn emphasis(on: bool) -> Vec<u8> {
    vec![ESC, b'E', u8::from(on)]
}

/// White/black reverse (GS B n)
#[inline]
pub fn invert(on: bool) -> Vec<u8> {
    vec![GS, b'B', u8::from(on)]
}

/// Underline (ESC - n)
#[inline]
pub fn underline(on: bool) -> Vec<u8> {
    vec![ESC, b'-', u8::from(on)]
}

/// International character set (ESC R n). `Legal` has no ESC/POS set and
/// maps to USA.
pub fn international(set: International) -> Vec<u8> {
    let n = match set {
        International::Legal => 0,
        other => other.code(),
    };
    vec![ESC, b'R', n]
}

/// Print and feed n lines (ESC d n), split above 255.
pub fn line_feed(lines: u32) -> Vec<u8> {
    split_feed(b'd', lines)
}

/// Print and feed n dots (ESC J n), split above 255.
pub fn unit_feed(dots: u32) -> Vec<u8> {
    split_feed(b'J', dots)
}

fn split_feed(command: u8, amount: u32) -> Vec<u8> {
    let mut out = Vec::new();
    let mut remaining = amount;
    while remaining > 0 {
        let step = remaining.min(255);
        out.extend([ESC, command, step as u8]);
        remaining -= step;
    }
    out
}

/// Line spacing (ESC 3 n)
#[inline]
pub fn line_space(dots: u8) -> Vec<u8> {
    vec![ESC, b'3', dots]
}

/// Character font (ESC M n)
pub fn font(style: FontStyle) -> Vec<u8> {
    let n = match style {
        FontStyle::A => 0,
        FontStyle::B => 1,
    };
    vec![ESC, b'M', n]
}

/// # Cut Paper (GS V m \[n\])
///
/// | Action | Bytes |
/// |--------|-------|
/// | FullCut | GS V 0 |
/// | PartialCut | GS V 1 |
/// | FullCutWithFeed | GS V 65 n |
/// | PartialCutWithFeed | GS V 66 n |
pub fn cut(action: CutPaperAction) -> Vec<u8> {
    match action {
        CutPaperAction::FullCut => vec![GS, b'V', 0],
        CutPaperAction::PartialCut => vec![GS, b'V', 1],
        CutPaperAction::FullCutWithFeed => vec![GS, b'V', 65, CUT_FEED_DOTS],
        CutPaperAction::PartialCutWithFeed => vec![GS, b'V', 66, CUT_FEED_DOTS],
    }
}

/// Generate drawer pulse (ESC p m t1 t2)
pub fn peripheral(channel: PeripheralChannel) -> Vec<u8> {
    let m = match channel {
        PeripheralChannel::No1 => 0,
        PeripheralChannel::No2 => 1,
    };
    vec![ESC, b'p', m, DRAWER_PULSE.0, DRAWER_PULSE.1]
}

/// Absolute print position (ESC $ nL nH)
pub fn absolute_position(dots: u16) -> Vec<u8> {
    let [nl, nh] = u16_le(dots);
    vec![ESC, b'$', nl, nh]
}

/// Justification (ESC a n)
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment.code()]
}

/// Horizontal tab positions (ESC D n1 ... nk NUL)
pub fn tab_positions(stops: &[u8]) -> Vec<u8> {
    let mut cmd = vec![ESC, b'D'];
    cmd.extend(stops.iter().copied().filter(|&s| s != NUL));
    cmd.push(NUL);
    cmd
}

/// Print NV bit image (FS p n m)
pub fn logo(key: u8, size: LogoSize) -> Vec<u8> {
    vec![FS, b'p', key, size.code()]
}

/// Character size (GS ! n). Multipliers are 1-based.
pub fn magnify(height: u8, width: u8) -> Vec<u8> {
    let h = height.clamp(1, 8) - 1;
    let w = width.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

/// Barcode symbology `m` for the length-prefixed `GS k` form.
fn barcode_system(symbology: BarcodeSymbology) -> u8 {
    match symbology {
        BarcodeSymbology::UpcA => 65,
        BarcodeSymbology::UpcE => 66,
        BarcodeSymbology::Jan13 => 67,
        BarcodeSymbology::Jan8 => 68,
        BarcodeSymbology::Code39 => 69,
        BarcodeSymbology::Itf => 70,
        BarcodeSymbology::Nw7 => 71,
        BarcodeSymbology::Code93 => 72,
        BarcodeSymbology::Code128 => 73,
    }
}

/// # Print Barcode
///
/// `GS H n` (HRI below or none), `GS h n` (height), `GS w n` (module width),
/// then `GS k m n data`. Code128 data without a code-set prefix gets `{B`.
///
/// `n` is a single byte, so `None` when the payload exceeds 255 bytes.
pub fn barcode(
    symbology: BarcodeSymbology,
    width: BarcodeWidth,
    height: u8,
    hri: bool,
    data: &[u8],
) -> Option<Vec<u8>> {
    let mut payload = Vec::with_capacity(data.len() + 2);
    if symbology == BarcodeSymbology::Code128 && !data.starts_with(b"{") {
        payload.extend_from_slice(b"{B");
    }
    payload.extend_from_slice(data);
    let len = u8::try_from(payload.len()).ok()?;

    // GS w accepts 2..=6
    let module = width.mode_number().clamp(2, 6);

    let mut cmd = Vec::with_capacity(13 + payload.len());
    cmd.extend([GS, b'H', if hri { 2 } else { 0 }]);
    cmd.extend([GS, b'h', height.max(1)]);
    cmd.extend([GS, b'w', module]);
    cmd.extend([GS, b'k', barcode_system(symbology), len]);
    cmd.extend(payload);
    Some(cmd)
}

/// # Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// `x` is the width in bytes, `y` the height in rows.
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);
    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.extend([GS, b'v', b'0', 0, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd
}

/// Real-time status request (DLE EOT n), `n` in 1..=4.
#[inline]
pub fn status_request(n: u8) -> Vec<u8> {
    vec![DLE, EOT, n]
}

/// Transmit printer ID (GS I n). 67 = model name, 65 = firmware version.
#[inline]
pub fn printer_id_request(n: u8) -> Vec<u8> {
    vec![GS, b'I', n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut() {
        assert_eq!(cut(CutPaperAction::FullCut), vec![0x1D, 0x56, 0]);
        assert_eq!(
            cut(CutPaperAction::PartialCutWithFeed),
            vec![0x1D, 0x56, 66, CUT_FEED_DOTS]
        );
    }

    #[test]
    fn test_styles() {
        assert_eq!(emphasis(true), vec![0x1B, 0x45, 1]);
        assert_eq!(invert(false), vec![0x1D, 0x42, 0]);
        assert_eq!(underline(true), vec![0x1B, 0x2D, 1]);
        assert_eq!(magnify(2, 2), vec![0x1D, 0x21, 0x11]);
        assert_eq!(magnify(1, 1), vec![0x1D, 0x21, 0x00]);
    }

    #[test]
    fn test_code128_prefix() {
        let cmd = barcode(
            BarcodeSymbology::Code128,
            BarcodeWidth::Mode2,
            40,
            true,
            b"123",
        )
        .unwrap();
        assert_eq!(
            cmd,
            vec![
                0x1D, b'H', 2, 0x1D, b'h', 40, 0x1D, b'w', 2, 0x1D, b'k', 73, 5, b'{', b'B',
                b'1', b'2', b'3'
            ]
        );
    }

    #[test]
    fn test_code128_keeps_explicit_code_set() {
        let cmd = barcode(
            BarcodeSymbology::Code128,
            BarcodeWidth::Mode1,
            40,
            false,
            b"{C12",
        )
        .unwrap();
        assert_eq!(&cmd[..3], &[0x1D, b'H', 0]);
        assert_eq!(&cmd[6..9], &[0x1D, b'w', 2]);
        assert_eq!(&cmd[9..], &[0x1D, b'k', 73, 4, b'{', b'C', b'1', b'2']);
    }

    #[test]
    fn test_barcode_length_limit() {
        let fits = vec![b'7'; 253];
        let cmd = barcode(BarcodeSymbology::Code128, BarcodeWidth::Mode2, 40, true, &fits).unwrap();
        assert_eq!(cmd[12], 255);

        let too_long = vec![b'7'; 254];
        assert_eq!(
            barcode(BarcodeSymbology::Code128, BarcodeWidth::Mode2, 40, true, &too_long),
            None
        );
    }

    #[test]
    fn test_raster() {
        let cmd = raster(9, 1, &[0xFF, 0x80]);
        assert_eq!(cmd, vec![0x1D, 0x76, 0x30, 0, 2, 0, 1, 0, 0xFF, 0x80]);
    }

    #[test]
    fn test_feeds_split() {
        assert_eq!(line_feed(2), vec![0x1B, 0x64, 2]);
        assert_eq!(unit_feed(256), vec![0x1B, 0x4A, 255, 0x1B, 0x4A, 1]);
    }

    #[test]
    fn test_code_page_fallback() {
        assert_eq!(code_page(CodePage::Cp1252), vec![0x1B, 0x74, 16]);
        assert_eq!(code_page(CodePage::Cp3840), vec![0x1B, 0x74, 0]);
    }

    #[test]
    fn test_drawer() {
        assert_eq!(peripheral(PeripheralChannel::No2)[..3], [0x1B, 0x70, 1]);
    }
}
