//! # Star Line Mode Control Commands
//!
//! Escape constants shared by every dialect plus the Star Line Mode commands
//! for initialization, paper movement, cutting, peripherals and status.
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`
//!
//! ## Reference
//!
//! Based on "StarPRNT Command Specifications Rev. 4.10" and the
//! "Star Line Mode Command Specifications" by Star Micronics Co., Ltd.

use crate::options::{BlackMark, CutPaperAction, PeripheralChannel};

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// NUL - Parameter list terminator
pub const NUL: u8 = 0x00;

/// SOH - Used as parameter of the status request
pub const SOH: u8 = 0x01;

/// EOT - ESC/POS real-time status prefix (with DLE)
pub const EOT: u8 = 0x04;

/// ACK - Used with ESC for Automatic Status Back requests
pub const ACK: u8 = 0x06;

/// BEL - Drive peripheral device #1 (cash drawer 1)
pub const BEL: u8 = 0x07;

/// LF (Line Feed) - Print and advance one line
pub const LF: u8 = 0x0A;

/// FF (Form Feed) - Page eject; in Star Graphic mode combined with ESC
pub const FF: u8 = 0x0C;

/// DLE - ESC/POS real-time command prefix
pub const DLE: u8 = 0x10;

/// SUB - Drive peripheral device #2 (cash drawer 2)
pub const SUB: u8 = 0x1A;

/// ESC (Escape) - Command prefix byte
///
/// Most commands begin with ESC (0x1B). This byte signals the start of a
/// control sequence rather than printable text.
pub const ESC: u8 = 0x1B;

/// FS (File Separator) - Logo command prefix
pub const FS: u8 = 0x1C;

/// GS (Group Separator) - Extended command prefix
///
/// Used in combination with ESC for extended Star commands (`ESC GS a`,
/// `ESC GS S`) and on its own for ESC/POS (`GS V`, `GS k`).
pub const GS: u8 = 0x1D;

/// RS (Record Separator) - Configuration command prefix and barcode terminator
pub const RS: u8 = 0x1E;

/// Largest unit feed a single `ESC J n` can express.
pub const MAX_UNIT_FEED: u8 = 255;

/// Convert u16 to little-endian bytes [low, high].
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on state. Emitted at the start of every
/// compiled document.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ## Example
///
/// ```
/// use cometa::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

// ============================================================================
// PAPER MOVEMENT
// ============================================================================

/// # Line Feed (LF × n)
///
/// Prints the line buffer and advances `lines` lines at the current line
/// spacing.
pub fn line_feed(lines: u32) -> Vec<u8> {
    vec![LF; lines as usize]
}

/// # Unit Feed (ESC J n)
///
/// Feeds paper by `units` dots. Amounts above 255 are split into several
/// commands.
///
/// ## Protocol Details
///
/// | Format  | Bytes     |
/// |---------|-----------|
/// | ASCII   | ESC J n   |
/// | Hex     | 1B 4A n   |
///
/// ```
/// use cometa::protocol::commands;
///
/// assert_eq!(commands::unit_feed(300), vec![0x1B, 0x4A, 255, 0x1B, 0x4A, 45]);
/// ```
pub fn unit_feed(units: u32) -> Vec<u8> {
    let mut out = Vec::new();
    let mut remaining = units;
    while remaining > 0 {
        let step = remaining.min(u32::from(MAX_UNIT_FEED));
        out.extend([ESC, b'J', step as u8]);
        remaining -= step;
    }
    out
}

/// # Line Spacing (ESC 3 n)
///
/// Sets the line pitch to `dots` dots.
#[inline]
pub fn line_space(dots: u8) -> Vec<u8> {
    vec![ESC, b'3', dots]
}

// ============================================================================
// CUTTER
// ============================================================================

/// # Cut Paper (ESC d n)
///
/// ## Protocol Details
///
/// | n | Action |
/// |---|--------|
/// | 0 | Full cut at current position |
/// | 1 | Partial cut at current position |
/// | 2 | Feed to cut position, full cut |
/// | 3 | Feed to cut position, partial cut |
pub fn cut(action: CutPaperAction) -> Vec<u8> {
    let n = match action {
        CutPaperAction::FullCut => 0,
        CutPaperAction::PartialCut => 1,
        CutPaperAction::FullCutWithFeed => 2,
        CutPaperAction::PartialCutWithFeed => 3,
    };
    vec![ESC, b'd', n]
}

// ============================================================================
// PERIPHERALS
// ============================================================================

/// # Drive Peripheral (BEL / SUB)
///
/// Fires the cash drawer connected to the given channel.
///
/// | Channel | Byte |
/// |---------|------|
/// | 1       | BEL (0x07) |
/// | 2       | SUB (0x1A) |
pub fn peripheral(channel: PeripheralChannel) -> Vec<u8> {
    match channel {
        PeripheralChannel::No1 => vec![BEL],
        PeripheralChannel::No2 => vec![SUB],
    }
}

/// # Black Mark Sensing (ESC RS m n)
///
/// | n | Mode |
/// |---|------|
/// | 0 | Invalid (sensor disabled) |
/// | 1 | Valid |
/// | 2 | Valid with detection at power-on |
pub fn black_mark(mode: BlackMark) -> Vec<u8> {
    let n = match mode {
        BlackMark::Invalid => 0,
        BlackMark::Valid => 1,
        BlackMark::ValidWithDetection => 2,
    };
    vec![ESC, RS, b'm', n]
}

// ============================================================================
// STATUS
// ============================================================================

/// # Request Automatic Status (ESC ACK SOH)
///
/// The printer answers with an ASB block (see
/// [`transport::status`](crate::transport::status)).
#[inline]
pub fn status_request() -> Vec<u8> {
    vec![ESC, ACK, SOH]
}

/// # Request Firmware Version (ESC # * LF NUL)
///
/// The printer answers `"<model> Ver<version>"` terminated by LF NUL.
#[inline]
pub fn firmware_request() -> Vec<u8> {
    vec![ESC, b'#', b'*', LF, NUL]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_unit_feed_splits() {
        assert!(unit_feed(0).is_empty());
        assert_eq!(unit_feed(24), vec![0x1B, 0x4A, 24]);
        assert_eq!(
            unit_feed(510),
            vec![0x1B, 0x4A, 255, 0x1B, 0x4A, 255]
        );
    }

    #[test]
    fn test_line_feed() {
        assert_eq!(line_feed(3), vec![LF, LF, LF]);
        assert!(line_feed(0).is_empty());
    }

    #[test]
    fn test_cut_actions() {
        assert_eq!(cut(CutPaperAction::FullCut), vec![0x1B, 0x64, 0]);
        assert_eq!(cut(CutPaperAction::PartialCutWithFeed), vec![0x1B, 0x64, 3]);
    }

    #[test]
    fn test_peripheral_channels() {
        assert_eq!(peripheral(PeripheralChannel::No1), vec![0x07]);
        assert_eq!(peripheral(PeripheralChannel::No2), vec![0x1A]);
    }

    #[test]
    fn test_black_mark() {
        assert_eq!(black_mark(BlackMark::Valid), vec![0x1B, 0x1E, b'm', 1]);
    }

    #[test]
    fn test_status_requests() {
        assert_eq!(status_request(), vec![0x1B, 0x06, 0x01]);
        assert_eq!(firmware_request(), vec![0x1B, 0x23, 0x2A, 0x0A, 0x00]);
    }

    #[test]
    fn test_u16_le() {
        assert_eq!(u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(u16_le(576), [0x40, 0x02]);
    }
}
