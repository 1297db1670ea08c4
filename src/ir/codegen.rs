//! # Code Generation
//!
//! Converts IR programs to printer bytes for one emulation.
//!
//! | Dialect | Document start | Document end |
//! |---------|----------------|--------------|
//! | Star Line Mode | `ESC @` | none |
//! | ESC/POS | `ESC @` | none |
//! | Star Graphic | `ESC * r A` | `ESC * r B` |
//!
//! Star Graphic printers only understand raster data: character-mode ops
//! and positioning are dropped there (logged at debug level).

use super::ops::{Op, Program};
use crate::emulation::{Dialect, Emulation};
use crate::protocol::{barcode, commands, escpos, graphics, text};

/// Dots fed per line feed in Star Graphic mode.
pub const STAR_GRAPHIC_LINE_DOTS: u32 = 24;

impl Program {
    /// Compile the program to the byte grammar of `emulation`.
    pub fn to_bytes(&self, emulation: Emulation) -> Vec<u8> {
        let mut out = Vec::new();
        match emulation.dialect() {
            Dialect::StarLine => {
                out.extend(commands::init());
                let bands = emulation.uses_band_graphics();
                for op in &self.ops {
                    star_line(op, bands, &mut out);
                }
            }
            Dialect::EscPos => {
                out.extend(escpos::init());
                for op in &self.ops {
                    esc_pos(op, &mut out);
                }
            }
            Dialect::StarGraphic => {
                out.extend(graphics::enter_raster_mode());
                for op in &self.ops {
                    star_graphic(op, &mut out);
                }
                out.extend(graphics::quit_raster_mode());
            }
        }
        out
    }
}

fn star_line(op: &Op, bands: bool, out: &mut Vec<u8>) {
    match op {
        // ===== Character Settings =====
        Op::CharacterSpace(dots) => out.extend(text::character_space(*dots)),
        Op::SetCodePage(page) => out.extend(text::code_page(*page)),
        Op::SetInternational(set) => out.extend(text::international(*set)),
        Op::SetFont(style) => out.extend(text::font(*style)),
        Op::SetEmphasis(true) => out.extend(text::emphasis_on()),
        Op::SetEmphasis(false) => out.extend(text::emphasis_off()),
        Op::SetInvert(true) => out.extend(text::invert_on()),
        Op::SetInvert(false) => out.extend(text::invert_off()),
        Op::SetUnderline(true) => out.extend(text::underline_on()),
        Op::SetUnderline(false) => out.extend(text::underline_off()),
        Op::SetMagnification { height, width } => out.extend(text::magnify(*height, *width)),

        // ===== Content =====
        Op::Text(bytes) | Op::Raw(bytes) => out.extend_from_slice(bytes),

        // ===== Paper Movement =====
        Op::LineFeed(lines) => out.extend(commands::line_feed(*lines)),
        Op::UnitFeed(dots) => out.extend(commands::unit_feed(*dots)),
        Op::SetLineSpace(dots) => out.extend(commands::line_space(*dots)),
        Op::Cut(action) => out.extend(commands::cut(*action)),

        // ===== Layout =====
        Op::SetAlign(alignment) => out.extend(text::align(*alignment)),
        Op::AbsolutePosition(dots) => out.extend(text::absolute_position(*dots)),
        Op::TabStops(stops) => out.extend(text::tab_positions(stops)),

        // ===== Devices =====
        Op::Peripheral(channel) => out.extend(commands::peripheral(*channel)),
        Op::SetBlackMark(mode) => out.extend(commands::black_mark(*mode)),

        // ===== Graphics =====
        Op::Logo { key, size } => out.extend(barcode::logo(*key, *size)),
        Op::Barcode {
            symbology,
            width,
            height,
            hri,
            data,
        } => out.extend(barcode::barcode(*symbology, *width, *height, *hri, data)),
        Op::Raster {
            width,
            height,
            data,
        } => {
            if bands {
                out.extend(graphics::bands(*width, data));
            } else {
                out.extend(graphics::raster_chunked(*width, *height, data));
            }
        }
    }
}

fn esc_pos(op: &Op, out: &mut Vec<u8>) {
    match op {
        Op::CharacterSpace(dots) => out.extend(escpos::character_space(*dots)),
        Op::SetCodePage(page) => out.extend(escpos::code_page(*page)),
        Op::SetInternational(set) => out.extend(escpos::international(*set)),
        Op::SetFont(style) => out.extend(escpos::font(*style)),
        Op::SetEmphasis(on) => out.extend(escpos::emphasis(*on)),
        Op::SetInvert(on) => out.extend(escpos::invert(*on)),
        Op::SetUnderline(on) => out.extend(escpos::underline(*on)),
        Op::SetMagnification { height, width } => out.extend(escpos::magnify(*height, *width)),

        Op::Text(bytes) | Op::Raw(bytes) => out.extend_from_slice(bytes),

        Op::LineFeed(lines) => out.extend(escpos::line_feed(*lines)),
        Op::UnitFeed(dots) => out.extend(escpos::unit_feed(*dots)),
        Op::SetLineSpace(dots) => out.extend(escpos::line_space(*dots)),
        Op::Cut(action) => out.extend(escpos::cut(*action)),

        Op::SetAlign(alignment) => out.extend(escpos::align(*alignment)),
        Op::AbsolutePosition(dots) => out.extend(escpos::absolute_position(*dots)),
        Op::TabStops(stops) => out.extend(escpos::tab_positions(stops)),

        Op::Peripheral(channel) => out.extend(escpos::peripheral(*channel)),
        Op::SetBlackMark(mode) => {
            tracing::debug!(?mode, "black mark has no ESC/POS command, skipping");
        }

        Op::Logo { key, size } => out.extend(escpos::logo(*key, *size)),
        Op::Barcode {
            symbology,
            width,
            height,
            hri,
            data,
        } => match escpos::barcode(*symbology, *width, *height, *hri, data) {
            Some(cmd) => out.extend(cmd),
            None => tracing::warn!(
                ?symbology,
                len = data.len(),
                "barcode data too long for ESC/POS, skipping"
            ),
        },
        Op::Raster {
            width,
            height,
            data,
        } => out.extend(escpos::raster(*width, *height, data)),
    }
}

fn star_graphic(op: &Op, out: &mut Vec<u8>) {
    match op {
        Op::Raw(bytes) => out.extend_from_slice(bytes),
        Op::LineFeed(lines) => {
            out.extend(graphics::raster_feed(lines.saturating_mul(STAR_GRAPHIC_LINE_DOTS)))
        }
        Op::UnitFeed(dots) => out.extend(graphics::raster_feed(*dots)),
        Op::Cut(_) => out.extend(graphics::raster_form_feed()),
        Op::Peripheral(channel) => out.extend(commands::peripheral(*channel)),
        Op::Raster { width, data, .. } => out.extend(graphics::raster_lines(*width, data)),
        other if other.is_character_mode() => {
            tracing::debug!(op = ?other, "character-mode op has no raster form, skipping");
        }
        other => {
            tracing::debug!(op = ?other, "not supported in Star Graphic mode, skipping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Alignment, BarcodeSymbology, BarcodeWidth, CutPaperAction};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_program_is_document_frame() {
        let program = Program::new();
        assert_eq!(program.to_bytes(Emulation::StarPrnt), vec![0x1B, 0x40]);
        assert_eq!(program.to_bytes(Emulation::EscPos), vec![0x1B, 0x40]);
        assert_eq!(
            program.to_bytes(Emulation::StarGraphic),
            b"\x1b*rA\x1b*rB".to_vec()
        );
    }

    #[test]
    fn test_star_line_text_and_cut() {
        let program: Program = vec![
            Op::SetEmphasis(true),
            Op::Text(b"Hi".to_vec()),
            Op::SetEmphasis(false),
            Op::Cut(CutPaperAction::FullCutWithFeed),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            program.to_bytes(Emulation::StarLine),
            vec![0x1B, 0x40, 0x1B, 0x45, b'H', b'i', 0x1B, 0x46, 0x1B, 0x64, 2]
        );
    }

    #[test]
    fn test_escpos_text_and_cut() {
        let program: Program = vec![
            Op::SetAlign(Alignment::Center),
            Op::Text(b"Hi".to_vec()),
            Op::Cut(CutPaperAction::PartialCut),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            program.to_bytes(Emulation::EscPosMobile),
            vec![0x1B, 0x40, 0x1B, 0x61, 1, b'H', b'i', 0x1D, 0x56, 1]
        );
    }

    #[test]
    fn test_star_graphic_skips_text() {
        let program: Program = vec![
            Op::Text(b"ignored".to_vec()),
            Op::Barcode {
                symbology: BarcodeSymbology::Code39,
                width: BarcodeWidth::Mode2,
                height: 40,
                hri: true,
                data: b"1".to_vec(),
            },
            Op::Raster {
                width: 8,
                height: 1,
                data: vec![0xF0],
            },
            Op::Cut(CutPaperAction::FullCut),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            program.to_bytes(Emulation::StarGraphic),
            b"\x1b*rAb\x01\x00\xf0\x1b\x0c\x00\x1b*rB".to_vec()
        );
    }

    #[test]
    fn test_dot_impact_uses_bands() {
        let program: Program = vec![Op::Raster {
            width: 8,
            height: 2,
            data: vec![0xFF, 0xFF],
        }]
        .into_iter()
        .collect();
        let bytes = program.to_bytes(Emulation::StarDotImpact);
        assert_eq!(&bytes[2..6], &[0x1B, b'k', 1, 0]);

        let bytes = program.to_bytes(Emulation::StarPrnt);
        assert_eq!(&bytes[2..5], &[0x1B, 0x1D, b'S']);
    }

    #[test]
    fn test_raw_passes_through_every_dialect() {
        let program: Program = vec![Op::Raw(vec![0x07])].into_iter().collect();
        for emulation in Emulation::ALL {
            let bytes = program.to_bytes(emulation);
            assert!(bytes.contains(&0x07), "{emulation}");
        }
    }

    #[test]
    fn test_escpos_skips_oversized_barcode() {
        let program: Program = vec![
            Op::Barcode {
                symbology: BarcodeSymbology::Code128,
                width: BarcodeWidth::Mode2,
                height: 40,
                hri: true,
                data: vec![b'9'; 300],
            },
            Op::Text(b"ok".to_vec()),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            program.to_bytes(Emulation::EscPos),
            vec![0x1B, 0x40, b'o', b'k']
        );
    }
}
