//! # IR Opcodes
//!
//! The intermediate representation between typed print commands and
//! dialect bytes. Text is already encoded (the compiler applies the active
//! encoding while lowering), options are already resolved, and placement is
//! already expanded into explicit positioning ops.
//!
//! ```text
//! PrintCommand → Vec<Op> (inspectable) → Codegen(dialect) → Bytes
//! ```

use crate::options::{
    Alignment, BarcodeSymbology, BarcodeWidth, BlackMark, CodePage, CutPaperAction, FontStyle,
    International, LogoSize, PeripheralChannel,
};

/// IR opcodes.
///
/// Style changes are individual on/off ops; scoped styling (`appendEmphasis`
/// and friends) lowers to an on op, the text, and an off op.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // ========== Character Settings ==========
    /// Extra dots between characters.
    CharacterSpace(u8),
    SetCodePage(CodePage),
    SetInternational(International),
    SetFont(FontStyle),
    SetEmphasis(bool),
    SetInvert(bool),
    SetUnderline(bool),
    /// Character magnification, 1-based multipliers.
    SetMagnification { height: u8, width: u8 },

    // ========== Content ==========
    /// Encoded text bytes.
    Text(Vec<u8>),
    /// Bytes passed through untouched by every dialect.
    Raw(Vec<u8>),

    // ========== Paper Movement ==========
    LineFeed(u32),
    /// Feed in dots.
    UnitFeed(u32),
    /// Line pitch in dots.
    SetLineSpace(u8),
    Cut(CutPaperAction),

    // ========== Layout ==========
    SetAlign(Alignment),
    /// Horizontal print position in dots from the left margin.
    AbsolutePosition(u16),
    TabStops(Vec<u8>),

    // ========== Devices ==========
    Peripheral(PeripheralChannel),
    SetBlackMark(BlackMark),

    // ========== Graphics ==========
    /// NV logo stored in the printer.
    Logo { key: u8, size: LogoSize },
    /// 1D barcode with encoded data.
    Barcode {
        symbology: BarcodeSymbology,
        width: BarcodeWidth,
        height: u8,
        hri: bool,
        data: Vec<u8>,
    },
    /// Packed monochrome image, `ceil(width / 8) * height` bytes.
    Raster {
        width: u16,
        height: u16,
        data: Vec<u8>,
    },
}

impl Op {
    /// Whether the op prints or configures characters (as opposed to images,
    /// paper movement or devices).
    pub fn is_character_mode(&self) -> bool {
        matches!(
            self,
            Op::CharacterSpace(_)
                | Op::SetCodePage(_)
                | Op::SetInternational(_)
                | Op::SetFont(_)
                | Op::SetEmphasis(_)
                | Op::SetInvert(_)
                | Op::SetUnderline(_)
                | Op::SetMagnification { .. }
                | Op::Text(_)
                | Op::SetLineSpace(_)
                | Op::TabStops(_)
                | Op::Barcode { .. }
        )
    }
}

/// A lowered print job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = Op>) {
        self.ops.extend(ops);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }
}

impl FromIterator<Op> for Program {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Program {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_push() {
        let mut program = Program::new();
        assert!(program.is_empty());
        program.push(Op::SetEmphasis(true));
        program.push(Op::Text(b"Hello".to_vec()));
        program.push(Op::SetEmphasis(false));
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn test_character_mode_classification() {
        assert!(Op::Text(vec![]).is_character_mode());
        assert!(Op::SetCodePage(CodePage::Cp437).is_character_mode());
        assert!(!Op::Raw(vec![]).is_character_mode());
        assert!(!Op::Cut(CutPaperAction::FullCut).is_character_mode());
        assert!(
            !Op::Raster {
                width: 8,
                height: 1,
                data: vec![0]
            }
            .is_character_mode()
        );
    }
}
