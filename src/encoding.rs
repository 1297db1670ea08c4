//! # Text Encoding Resolver
//!
//! Maps the symbolic encoding names accepted by `appendEncoding` to a byte
//! encoder. Resolution never fails:
//!
//! | Name | Encoder |
//! |------|---------|
//! | `US-ASCII` | 7-bit ASCII, unmappable characters become `?` |
//! | `Windows-1252` | Western European code page |
//! | `Windows-1251` | Cyrillic code page |
//! | `Shift-JIS` | Japanese double-byte |
//! | `GB2312` | Simplified Chinese (GBK superset) |
//! | `Big5` | Traditional Chinese |
//! | `UTF-8` | Universal variable-width |
//! | anything else | `US-ASCII` |
//!
//! The compiler starts every job with [`TextEncoding::Ascii`] and swaps the
//! encoder whenever an `appendEncoding` descriptor is processed.

use encoding_rs::Encoding;

/// A resolved text encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// 7-bit ASCII. Characters above U+007F are replaced with `?`.
    #[default]
    Ascii,
    /// A multi-byte or single-byte table encoding backed by `encoding_rs`.
    Table(&'static Encoding),
    /// UTF-8 (pass-through).
    Utf8,
}

impl TextEncoding {
    /// Encode `text` into printer bytes.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Ascii => text
                .chars()
                .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
                .collect(),
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Table(encoding) => {
                let (bytes, _, had_errors) = encoding.encode(text);
                if had_errors {
                    tracing::debug!(
                        encoding = encoding.name(),
                        "text contained characters outside the encoding"
                    );
                }
                bytes.into_owned()
            }
        }
    }

    /// Canonical name of the encoder.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Ascii => "US-ASCII",
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Table(encoding) => encoding.name(),
        }
    }
}

/// Look up a table encoding by WHATWG label, falling back to UTF-8 when the
/// platform table is unavailable.
fn table_or_utf8(label: &str) -> TextEncoding {
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) => TextEncoding::Table(encoding),
        None => {
            tracing::warn!(label, "encoding table unavailable, using UTF-8");
            TextEncoding::Utf8
        }
    }
}

/// Resolve a symbolic encoding name.
///
/// ```
/// use cometa::encoding::{resolve, TextEncoding};
///
/// assert_eq!(resolve("UTF-8"), TextEncoding::Utf8);
/// assert_eq!(resolve("no-such-encoding"), TextEncoding::Ascii);
/// ```
pub fn resolve(name: &str) -> TextEncoding {
    match name {
        "US-ASCII" => TextEncoding::Ascii,
        "Windows-1252" => table_or_utf8("windows-1252"),
        "Shift-JIS" => table_or_utf8("shift_jis"),
        "Windows-1251" => table_or_utf8("windows-1251"),
        "GB2312" => table_or_utf8("gbk"),
        "Big5" => table_or_utf8("big5"),
        "UTF-8" => TextEncoding::Utf8,
        other => {
            tracing::warn!(name = other, "unrecognized encoding, using US-ASCII");
            TextEncoding::Ascii
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 7] = [
        "US-ASCII",
        "Windows-1252",
        "Shift-JIS",
        "Windows-1251",
        "GB2312",
        "Big5",
        "UTF-8",
    ];

    #[test]
    fn test_known_names_are_distinct() {
        let resolved: Vec<_> = KNOWN.iter().map(|n| resolve(n)).collect();
        for (i, a) in resolved.iter().enumerate() {
            for b in &resolved[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        for name in KNOWN {
            assert_eq!(resolve(name), resolve(name));
        }
    }

    #[test]
    fn test_unknown_falls_back_to_ascii() {
        assert_eq!(resolve("EBCDIC"), TextEncoding::Ascii);
        assert_eq!(resolve(""), TextEncoding::Ascii);
        assert_eq!(resolve("utf-8"), TextEncoding::Ascii); // names are case-sensitive
    }

    #[test]
    fn test_ascii_replaces_non_ascii() {
        assert_eq!(TextEncoding::Ascii.encode("café"), b"caf?".to_vec());
    }

    #[test]
    fn test_shift_jis_encodes_kana() {
        // HIRAGANA LETTER A is 0x82 0xA0 in Shift-JIS
        assert_eq!(resolve("Shift-JIS").encode("あ"), vec![0x82, 0xA0]);
    }

    #[test]
    fn test_windows_1252_euro() {
        assert_eq!(resolve("Windows-1252").encode("€"), vec![0x80]);
    }

    #[test]
    fn test_windows_1251_cyrillic() {
        // CYRILLIC CAPITAL LETTER A
        assert_eq!(resolve("Windows-1251").encode("А"), vec![0xC0]);
    }
}
