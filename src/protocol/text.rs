//! # Star Line Mode Text Commands
//!
//! Character-mode styling: spacing, code page, emphasis, inversion,
//! underline, international set, font, magnification, positioning and tabs.
//!
//! Toggle commands come in on/off pairs.

use super::commands::{ESC, GS, NUL, RS};
use crate::options::{Alignment, CodePage, FontStyle, International};

/// # Character Spacing (ESC SP n)
///
/// Adds `dots` dots of space to the right of every character.
#[inline]
pub fn character_space(dots: u8) -> Vec<u8> {
    vec![ESC, b' ', dots]
}

/// Star code table number for a code page.
///
/// | n | Table |
/// |---|-------|
/// | 0 | Normal (CP998) |
/// | 1 | CP437 USA |
/// | 2 | Katakana (CP932) |
/// | 4 | CP858 |
/// | 5..=21 | CP852 ... CP874 |
/// | 32..=34 | Windows CP1252/CP1250/CP1251 |
/// | 64..=79 | Star national tables (CP3840 ...) |
/// | 128 | UTF-8 |
/// | 255 | Blank (user-defined) |
pub fn star_code_page(page: CodePage) -> u8 {
    match page {
        CodePage::Cp998 => 0,
        CodePage::Cp437 => 1,
        CodePage::Cp932 => 2,
        CodePage::Cp858 => 4,
        CodePage::Cp852 => 5,
        CodePage::Cp860 => 6,
        CodePage::Cp861 => 7,
        CodePage::Cp863 => 8,
        CodePage::Cp865 => 9,
        CodePage::Cp866 => 10,
        CodePage::Cp855 => 11,
        CodePage::Cp857 => 12,
        CodePage::Cp862 => 13,
        CodePage::Cp864 => 14,
        CodePage::Cp737 => 15,
        CodePage::Cp851 => 16,
        CodePage::Cp869 => 17,
        CodePage::Cp928 => 18,
        CodePage::Cp772 => 19,
        CodePage::Cp774 => 20,
        CodePage::Cp874 => 21,
        CodePage::Cp1252 => 32,
        CodePage::Cp1250 => 33,
        CodePage::Cp1251 => 34,
        CodePage::Cp3840 => 64,
        CodePage::Cp3841 => 65,
        CodePage::Cp3843 => 66,
        CodePage::Cp3845 => 68,
        CodePage::Cp3846 => 69,
        CodePage::Cp3847 => 70,
        CodePage::Cp3848 => 71,
        CodePage::Cp1001 => 72,
        CodePage::Cp2001 => 73,
        CodePage::Cp3001 => 74,
        CodePage::Cp3002 => 75,
        CodePage::Cp3011 => 76,
        CodePage::Cp3012 => 77,
        CodePage::Cp3021 => 78,
        CodePage::Cp3041 => 79,
        CodePage::Cp999 => 96,
        CodePage::Utf8 => 128,
        CodePage::Blank => 255,
    }
}

/// # Select Code Page (ESC GS t n)
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC GS t n |
/// | Hex     | 1B 1D 74 n |
///
/// ```
/// use cometa::options::CodePage;
/// use cometa::protocol::text;
///
/// assert_eq!(text::code_page(CodePage::Cp437), vec![0x1B, 0x1D, 0x74, 0x01]);
/// ```
pub fn code_page(page: CodePage) -> Vec<u8> {
    vec![ESC, GS, b't', star_code_page(page)]
}

/// Emphasis on (ESC E)
#[inline]
pub fn emphasis_on() -> Vec<u8> {
    vec![ESC, b'E']
}

/// Emphasis off (ESC F)
#[inline]
pub fn emphasis_off() -> Vec<u8> {
    vec![ESC, b'F']
}

/// White/black inversion on (ESC 4)
#[inline]
pub fn invert_on() -> Vec<u8> {
    vec![ESC, b'4']
}

/// White/black inversion off (ESC 5)
#[inline]
pub fn invert_off() -> Vec<u8> {
    vec![ESC, b'5']
}

/// Underline on (ESC - 1)
#[inline]
pub fn underline_on() -> Vec<u8> {
    vec![ESC, b'-', 1]
}

/// Underline off (ESC - 0)
#[inline]
pub fn underline_off() -> Vec<u8> {
    vec![ESC, b'-', 0]
}

/// # International Character Set (ESC R n)
#[inline]
pub fn international(set: International) -> Vec<u8> {
    vec![ESC, b'R', set.code()]
}

/// # Select Font (ESC RS F n)
///
/// | n | Font |
/// |---|------|
/// | 0 | Font A (12 × 24) |
/// | 1 | Font B (9 × 24) |
pub fn font(style: FontStyle) -> Vec<u8> {
    let n = match style {
        FontStyle::A => 0,
        FontStyle::B => 1,
    };
    vec![ESC, RS, b'F', n]
}

/// # Character Magnification (ESC i n1 n2)
///
/// `height` and `width` are multipliers (1 = normal); the command takes them
/// zero-based.
pub fn magnify(height: u8, width: u8) -> Vec<u8> {
    vec![
        ESC,
        b'i',
        height.clamp(1, 6) - 1,
        width.clamp(1, 6) - 1,
    ]
}

/// # Alignment (ESC GS a n)
///
/// ```
/// use cometa::options::Alignment;
/// use cometa::protocol::text;
///
/// assert_eq!(text::align(Alignment::Center), vec![0x1B, 0x1D, 0x61, 0x01]);
/// ```
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, GS, b'a', alignment.code()]
}

/// # Absolute Position (ESC GS A nL nH)
///
/// Moves the print position to `dots` from the left margin.
pub fn absolute_position(dots: u16) -> Vec<u8> {
    let [nl, nh] = super::commands::u16_le(dots);
    vec![ESC, GS, b'A', nl, nh]
}

/// # Horizontal Tab Stops (ESC D n1 ... nk NUL)
///
/// Stops are column numbers; zero entries would terminate the list early
/// and are dropped.
pub fn tab_positions(stops: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(stops.len() + 3);
    cmd.push(ESC);
    cmd.push(b'D');
    cmd.extend(stops.iter().copied().filter(|&s| s != NUL));
    cmd.push(NUL);
    cmd
}
