//! # Printer Status
//!
//! Parsing of printer status responses into a [`PrinterStatus`] snapshot.
//!
//! ## Star Automatic Status Back (ASB)
//!
//! Requested with `ESC ACK SOH`. The first byte encodes the block length:
//!
//! ```text
//! length = ((b0 & 0x0E) >> 1) | ((b0 & 0x20) >> 2)
//! ```
//!
//! | Byte | Bit | Meaning |
//! |------|-----|---------|
//! | 2 | 0x08 | Offline |
//! | 2 | 0x20 | Cover open |
//! | 3 | 0x08 | Auto-cutter error |
//! | 3 | 0x40 | Head over temperature |
//! | 4 | 0x08 | Paper jam |
//! | 5 | 0x04 | Paper near end (inner sensor) |
//! | 5 | 0x02 | Paper near end (outer sensor) |
//! | 5 | 0x08 | Receipt paper empty |
//!
//! ## ESC/POS Real-Time Status
//!
//! Four single-byte answers to `DLE EOT 1..=4`:
//!
//! | n | Bit | Meaning |
//! |---|-----|---------|
//! | 1 | 0x08 | Offline |
//! | 2 | 0x04 | Cover open |
//! | 3 | 0x08 | Auto-cutter error |
//! | 3 | 0x40 | Auto-recoverable error (over temperature) |
//! | 4 | 0x0C | Paper near end |
//! | 4 | 0x60 | Paper end |

use crate::error::CometaError;

/// Hardware status captured at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrinterStatus {
    pub offline: bool,
    pub cover_open: bool,
    pub cutter_error: bool,
    pub receipt_paper_empty: bool,
    pub paper_jam: bool,
    pub paper_near_empty_inner: bool,
    pub paper_near_empty_outer: bool,
    pub over_temp: bool,
}

impl PrinterStatus {
    pub fn paper_near_empty(&self) -> bool {
        self.paper_near_empty_inner || self.paper_near_empty_outer
    }
}

/// Model and firmware version reported by the printer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmwareInfo {
    pub model_name: String,
    pub firmware_version: String,
}

/// How status is requested and decoded on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusProtocol {
    #[default]
    StarAsb,
    EscPos,
}

impl StatusProtocol {
    /// Pick the protocol from a connection-profile string.
    pub fn from_settings(settings: &str) -> Self {
        match settings {
            "escpos" | "mini" => StatusProtocol::EscPos,
            _ => StatusProtocol::StarAsb,
        }
    }
}

/// Total ASB block length announced by its first byte.
pub fn asb_length(first: u8) -> usize {
    (((first & 0x0E) >> 1) | ((first & 0x20) >> 2)) as usize
}

/// Parse a complete ASB block.
pub fn parse_asb(block: &[u8]) -> Result<PrinterStatus, CometaError> {
    if block.len() < 6 {
        return Err(CometaError::Transport(format!(
            "status block too short: {} bytes",
            block.len()
        )));
    }
    Ok(PrinterStatus {
        offline: block[2] & 0x08 != 0,
        cover_open: block[2] & 0x20 != 0,
        cutter_error: block[3] & 0x08 != 0,
        over_temp: block[3] & 0x40 != 0,
        paper_jam: block[4] & 0x08 != 0,
        paper_near_empty_inner: block[5] & 0x04 != 0,
        paper_near_empty_outer: block[5] & 0x02 != 0,
        receipt_paper_empty: block[5] & 0x08 != 0,
    })
}

/// Parse the four ESC/POS real-time status bytes (`DLE EOT 1..=4`).
pub fn parse_escpos(bytes: [u8; 4]) -> PrinterStatus {
    let [printer, offline, error, paper] = bytes;
    PrinterStatus {
        offline: printer & 0x08 != 0,
        cover_open: offline & 0x04 != 0,
        cutter_error: error & 0x08 != 0,
        over_temp: error & 0x40 != 0,
        paper_jam: false,
        paper_near_empty_inner: paper & 0x0C != 0,
        paper_near_empty_outer: false,
        receipt_paper_empty: paper & 0x60 != 0,
    }
}

/// Parse a Star firmware answer, `"<model> Ver<version>"` with trailing
/// LF/NUL.
pub fn parse_firmware(raw: &[u8]) -> Result<FirmwareInfo, CometaError> {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end_matches(['\0', '\n', '\r']).trim();
    let Some((model, version)) = text.split_once(" Ver") else {
        return Err(CometaError::Transport(format!(
            "unexpected firmware response: {text:?}"
        )));
    };
    Ok(FirmwareInfo {
        model_name: model.trim().to_string(),
        firmware_version: version.trim().to_string(),
    })
}

/// Parse an ESC/POS printer ID answer (`GS I n`): `0x5F data NUL`.
pub fn parse_escpos_id(raw: &[u8]) -> String {
    let body = raw.strip_prefix(&[0x5F]).unwrap_or(raw);
    let body = body.split(|&b| b == 0).next().unwrap_or(body);
    String::from_utf8_lossy(body).trim().to_string()
}
