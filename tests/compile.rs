//! # Compiler Tests
//!
//! End-to-end checks of descriptor lists compiled to printer bytes through
//! the public API.

use cometa::job::parse_job;
use cometa::{compile, CommandDescriptor, Emulation};
use pretty_assertions::assert_eq;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ============================================================================
// ENCODING
// ============================================================================

#[test]
fn encoding_change_applies_to_later_text_only() {
    let job = vec![
        CommandDescriptor::new().with("append", "あ"),
        CommandDescriptor::new().with("appendEncoding", "Shift-JIS"),
        CommandDescriptor::new().with("append", "あ"),
    ];
    assert_eq!(
        compile(&job, Emulation::StarLine),
        vec![ESC, b'@', b'?', 0x82, 0xA0]
    );
}

#[test]
fn unknown_encoding_name_falls_back_to_ascii() {
    let job = vec![
        CommandDescriptor::new().with("appendEncoding", "UTF-8"),
        CommandDescriptor::new().with("appendEncoding", "Klingon"),
        CommandDescriptor::new().with("append", "é"),
    ];
    assert_eq!(compile(&job, Emulation::EscPos), vec![ESC, b'@', b'?']);
}

// ============================================================================
// LENIENT DISPATCH
// ============================================================================

#[test]
fn unrecognized_descriptors_are_skipped() {
    let job = vec![
        CommandDescriptor::new().with("appendSparkles", true),
        CommandDescriptor::new().with("append", "A"),
        CommandDescriptor::new().with("appendLineFeed", "many"),
    ];
    assert_eq!(compile(&job, Emulation::StarPrnt), vec![ESC, b'@', b'A']);
}

#[test]
fn huge_feed_amounts_stay_bounded() {
    let lines = vec![CommandDescriptor::new().with("appendLineFeed", 4_294_967_295i64)];
    let bytes = compile(&lines, Emulation::StarLine);
    assert_eq!(bytes.len(), 2 + 255);
    assert!(bytes[2..].iter().all(|&b| b == b'\n'));

    let dots = vec![CommandDescriptor::new().with("appendUnitFeed", 4_294_967_295i64)];
    assert!(compile(&dots, Emulation::StarLine).len() < 1000);
    assert!(compile(&dots, Emulation::EscPos).len() < 1000);
}

#[test]
fn bad_bitmap_is_dropped_and_job_continues() {
    let job = vec![
        CommandDescriptor::new().with("appendBitmap", "/definitely/not/here.png"),
        CommandDescriptor::new().with("appendBitmapByteArray", vec![1u8, 2, 3]),
        CommandDescriptor::new().with("append", "ok"),
    ];
    assert_eq!(compile(&job, Emulation::StarLine), vec![ESC, b'@', b'o', b'k']);
}

// ============================================================================
// PLACEMENT
// ============================================================================

#[test]
fn barcode_absolute_position_beats_alignment() {
    let job = vec![CommandDescriptor::new()
        .with("appendBarcode", "12345")
        .with("absolutePosition", 40)
        .with("alignment", "Center")];
    let bytes = compile(&job, Emulation::StarLine);

    assert_eq!(&bytes[2..7], &[ESC, GS, b'A', 40, 0]);
    assert!(!contains(&bytes, &[ESC, GS, b'a']));
    // Code128, HRI on, Mode2, height 40
    assert_eq!(&bytes[7..13], &[ESC, b'b', b'6', b'2', b'2', 40]);
    assert!(bytes.ends_with(b"12345\x1e"));
}

#[test]
fn barcode_alignment_is_restored_to_left() {
    let job = vec![CommandDescriptor::new()
        .with("appendBarcode", "12345")
        .with("alignment", "Right")
        .with("hri", false)
        .with("height", 80)];
    let bytes = compile(&job, Emulation::StarLine);

    assert_eq!(&bytes[2..6], &[ESC, GS, b'a', 2]);
    assert_eq!(&bytes[6..12], &[ESC, b'b', b'6', b'1', b'2', 80]);
    assert!(bytes.ends_with(&[ESC, GS, b'a', 0]));
}

// ============================================================================
// DIALECTS
// ============================================================================

#[test]
fn bitmap_text_becomes_raster() {
    let job = vec![CommandDescriptor::new()
        .with("appendBitmapText", "TOTAL 12.00")
        .with("width", 96)];

    let pos = compile(&job, Emulation::EscPos);
    assert!(contains(&pos, &[GS, b'v', b'0', 0, 12, 0]));

    let star = compile(&job, Emulation::StarGraphic);
    assert!(star.starts_with(b"\x1b*rA"));
    assert!(star.ends_with(b"\x1b*rB"));
    assert!(contains(&star, &[b'b', 12, 0]));
}

#[test]
fn json_job_compiles_for_every_emulation() {
    let job = parse_job(
        r#"[
            {"appendInternational": "UK"},
            {"appendEmphasis": "SALE\n"},
            {"appendMultiple": "BIG\n"},
            {"appendLineFeed": 2},
            {"openCashDrawer": 1},
            {"appendCutPaper": "PartialCutWithFeed"}
        ]"#,
    )
    .unwrap();

    for emulation in Emulation::ALL {
        let bytes = compile(&job, emulation);
        assert!(!bytes.is_empty(), "{emulation}");
    }
    let star = compile(&job, Emulation::StarPrnt);
    assert!(contains(&star, &[ESC, b'E', b'S', b'A', b'L', b'E']));
    assert!(star.ends_with(&[ESC, b'd', 3]));

    let pos = compile(&job, Emulation::EscPosMobile);
    assert!(contains(&pos, &[ESC, b'E', 1, b'S']));
    assert!(contains(&pos, &[ESC, b'p', 0]));
}

#[test]
fn non_array_job_is_rejected() {
    assert!(parse_job(r#"{"append": "x"}"#).is_err());
}
