//! Closed set of print operations.
//!
//! [`PrintCommand::from_descriptor`] turns one loosely-typed descriptor into a
//! typed command. Operation keys are tried in a fixed priority order
//! ([`OPERATION_KEYS`]); the first key present wins and the remaining keys of
//! the descriptor are only read as modifiers of that operation.

use std::fmt;

use crate::encoding::{self, TextEncoding};
use crate::options::{
    resolve, resolve_value, Alignment, BarcodeSymbology, BarcodeWidth, BitmapRotation, BlackMark,
    CodePage, CutPaperAction, FontStyle, International, LogoSize, OptionValue, PeripheralChannel,
};

use super::descriptor::{CommandDescriptor, Payload, Value};

/// Operation keys in dispatch priority order.
pub const OPERATION_KEYS: [&str; 30] = [
    "appendCharacterSpace",
    "appendEncoding",
    "appendCodePage",
    "append",
    "appendRaw",
    "appendMultiple",
    "appendEmphasis",
    "enableEmphasis",
    "appendInvert",
    "enableInvert",
    "appendUnderline",
    "enableUnderline",
    "appendInternational",
    "appendLineFeed",
    "appendUnitFeed",
    "appendLineSpace",
    "appendFontStyle",
    "appendCutPaper",
    "openCashDrawer",
    "appendBlackMark",
    "appendBytes",
    "appendRawBytes",
    "appendAbsolutePosition",
    "appendAlignment",
    "appendHorizontalTabPosition",
    "appendLogo",
    "appendBarcode",
    "appendBitmap",
    "appendBitmapText",
    "appendBitmapByteArray",
];

/// Barcode height in dots when `height` is absent.
pub const DEFAULT_BARCODE_HEIGHT: u8 = 40;
/// Bitmap target width in dots when `width` is absent.
pub const DEFAULT_BITMAP_WIDTH: u16 = 576;
/// Rasterizer font size when `fontSize` is absent.
pub const DEFAULT_FONT_SIZE: f32 = 25.0;

/// Most lines a single `appendLineFeed` may advance.
pub const MAX_LINE_FEED: u32 = 255;
/// Most dots a single `appendUnitFeed` may advance.
pub const MAX_UNIT_FEED: u32 = u16::MAX as u32;

/// Where a barcode or bitmap lands on the line.
///
/// Chosen by modifier precedence: `absolutePosition` beats `alignment`, and
/// with neither the element is emitted at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Inline,
    Absolute(u16),
    Aligned(Alignment),
}

impl Placement {
    fn from_modifiers(descriptor: &CommandDescriptor) -> Self {
        if let Some(value) = descriptor.get("absolutePosition") {
            match value.as_int() {
                Some(position) => return Placement::Absolute(clamp_u16(position)),
                None => tracing::warn!(
                    value = %value.to_text(),
                    "absolutePosition is not an integer, ignoring"
                ),
            }
        }
        if let Some(value) = descriptor.get("alignment") {
            return Placement::Aligned(resolve_value::<Alignment>(&value.to_text()));
        }
        Placement::Inline
    }
}

/// Conversion parameters shared by every bitmap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapParams {
    /// Error diffusion (`true`) or plain threshold (`false`).
    pub diffusion: bool,
    /// Target width in dots.
    pub width: u16,
    /// Keep aspect ratio when scaling (`true`) or scale width only.
    pub both_scale: bool,
    pub rotation: BitmapRotation,
}

impl Default for BitmapParams {
    fn default() -> Self {
        Self {
            diffusion: true,
            width: DEFAULT_BITMAP_WIDTH,
            both_scale: true,
            rotation: BitmapRotation::Normal,
        }
    }
}

impl BitmapParams {
    fn from_modifiers(descriptor: &CommandDescriptor) -> Self {
        let defaults = Self::default();
        Self {
            diffusion: bool_modifier(descriptor, "diffusion", defaults.diffusion),
            width: descriptor
                .get("width")
                .and_then(|v| int_modifier("width", v))
                .map(clamp_u16)
                .unwrap_or(defaults.width),
            both_scale: bool_modifier(descriptor, "bothScale", defaults.both_scale),
            rotation: option_modifier(descriptor, "rotation"),
        }
    }
}

/// Where bitmap pixels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum BitmapSource {
    /// URL or file path, resolved by the image decoder.
    Uri(String),
    /// Text rendered by the rasterizer.
    Text { text: String, font_size: f32 },
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Vec<u8>),
}

/// One typed print operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintCommand {
    CharacterSpace(u8),
    SetEncoding(TextEncoding),
    CodePage(CodePage),
    Append(Payload),
    /// Verbatim bytes, passed through even by dialects without text support.
    AppendRaw(Payload),
    /// Double width and height text.
    Multiple(Payload),
    Emphasis(Payload),
    EnableEmphasis(bool),
    Invert(Payload),
    EnableInvert(bool),
    Underline(Payload),
    EnableUnderline(bool),
    International(International),
    LineFeed(u32),
    UnitFeed(u32),
    LineSpace(u8),
    FontStyle(FontStyle),
    CutPaper(CutPaperAction),
    OpenCashDrawer(PeripheralChannel),
    BlackMark(BlackMark),
    AbsolutePosition {
        position: u16,
        data: Option<Payload>,
    },
    Alignment {
        alignment: Alignment,
        data: Option<Payload>,
    },
    HorizontalTabPosition(Vec<u8>),
    Logo {
        key: u8,
        size: LogoSize,
    },
    Barcode {
        data: Payload,
        symbology: BarcodeSymbology,
        width: BarcodeWidth,
        height: u8,
        hri: bool,
        placement: Placement,
    },
    Bitmap {
        source: BitmapSource,
        params: BitmapParams,
        placement: Placement,
    },
}

/// Why a descriptor produced no command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// None of the operation keys is present.
    NoOperation { keys: Vec<String> },
    /// The operation key is present but its value has the wrong shape.
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::NoOperation { keys } => {
                write!(f, "no recognized operation among keys [{}]", keys.join(", "))
            }
            Skip::InvalidValue { key, value } => write!(f, "invalid value {value:?} for {key}"),
        }
    }
}

impl PrintCommand {
    /// Build the command selected by the highest-priority operation key.
    pub fn from_descriptor(descriptor: &CommandDescriptor) -> Result<Self, Skip> {
        let Some((key, value)) = OPERATION_KEYS
            .iter()
            .find_map(|&key| descriptor.get(key).map(|value| (key, value)))
        else {
            let mut keys: Vec<String> = descriptor.keys().map(str::to_string).collect();
            keys.sort();
            return Err(Skip::NoOperation { keys });
        };

        let invalid = || Skip::InvalidValue {
            key,
            value: value.to_text(),
        };
        let int = || value.as_int().ok_or_else(invalid);
        let payload = || Payload::from_value(value).ok_or_else(invalid);
        let symbol = value.to_text();

        let command = match key {
            "appendCharacterSpace" => PrintCommand::CharacterSpace(clamp_u8(int()?)),
            "appendEncoding" => PrintCommand::SetEncoding(encoding::resolve(&symbol)),
            "appendCodePage" => PrintCommand::CodePage(resolve_value(&symbol)),
            "append" | "appendBytes" => PrintCommand::Append(payload()?),
            "appendRaw" | "appendRawBytes" => PrintCommand::AppendRaw(payload()?),
            "appendMultiple" => PrintCommand::Multiple(payload()?),
            "appendEmphasis" => PrintCommand::Emphasis(payload()?),
            "enableEmphasis" => PrintCommand::EnableEmphasis(value.as_bool()),
            "appendInvert" => PrintCommand::Invert(payload()?),
            "enableInvert" => PrintCommand::EnableInvert(value.as_bool()),
            "appendUnderline" => PrintCommand::Underline(payload()?),
            "enableUnderline" => PrintCommand::EnableUnderline(value.as_bool()),
            "appendInternational" => PrintCommand::International(resolve_value(&symbol)),
            "appendLineFeed" => PrintCommand::LineFeed(clamp_feed(key, int()?, MAX_LINE_FEED)),
            "appendUnitFeed" => PrintCommand::UnitFeed(clamp_feed(key, int()?, MAX_UNIT_FEED)),
            "appendLineSpace" => PrintCommand::LineSpace(clamp_u8(int()?)),
            "appendFontStyle" => PrintCommand::FontStyle(resolve_value(&symbol)),
            "appendCutPaper" => PrintCommand::CutPaper(resolve_value(&symbol)),
            "openCashDrawer" => PrintCommand::OpenCashDrawer(resolve_value(&symbol)),
            "appendBlackMark" => PrintCommand::BlackMark(resolve_value(&symbol)),
            "appendAbsolutePosition" => PrintCommand::AbsolutePosition {
                position: clamp_u16(int()?),
                data: data_modifier(descriptor)?,
            },
            "appendAlignment" => PrintCommand::Alignment {
                alignment: resolve_value(&symbol),
                data: data_modifier(descriptor)?,
            },
            "appendHorizontalTabPosition" => {
                let stops = value.as_int_list().ok_or_else(invalid)?;
                PrintCommand::HorizontalTabPosition(stops.into_iter().map(clamp_u8).collect())
            }
            "appendLogo" => PrintCommand::Logo {
                key: clamp_u8(int()?),
                size: option_modifier(descriptor, "logoSize"),
            },
            "appendBarcode" => PrintCommand::Barcode {
                data: payload()?,
                symbology: option_modifier(descriptor, "BarcodeSymbology"),
                width: option_modifier(descriptor, "BarcodeWidth"),
                height: descriptor
                    .get("height")
                    .and_then(|v| int_modifier("height", v))
                    .map(clamp_u8)
                    .unwrap_or(DEFAULT_BARCODE_HEIGHT),
                hri: bool_modifier(descriptor, "hri", true),
                placement: Placement::from_modifiers(descriptor),
            },
            "appendBitmap" => PrintCommand::Bitmap {
                source: BitmapSource::Uri(symbol),
                params: BitmapParams::from_modifiers(descriptor),
                placement: Placement::from_modifiers(descriptor),
            },
            "appendBitmapText" => PrintCommand::Bitmap {
                source: BitmapSource::Text {
                    text: symbol,
                    font_size: descriptor
                        .get("fontSize")
                        .and_then(Value::as_float)
                        .unwrap_or(DEFAULT_FONT_SIZE),
                },
                params: BitmapParams::from_modifiers(descriptor),
                placement: Placement::from_modifiers(descriptor),
            },
            "appendBitmapByteArray" => PrintCommand::Bitmap {
                source: BitmapSource::Bytes(value.as_bytes().ok_or_else(invalid)?),
                params: BitmapParams::from_modifiers(descriptor),
                placement: Placement::from_modifiers(descriptor),
            },
            _ => unreachable!("every entry of OPERATION_KEYS is handled"),
        };
        Ok(command)
    }
}

fn data_modifier(descriptor: &CommandDescriptor) -> Result<Option<Payload>, Skip> {
    descriptor
        .get("data")
        .map(|value| {
            Payload::from_value(value).ok_or_else(|| Skip::InvalidValue {
                key: "data",
                value: value.to_text(),
            })
        })
        .transpose()
}

fn option_modifier<T: OptionValue>(descriptor: &CommandDescriptor, key: &str) -> T {
    match descriptor.get(key) {
        Some(value) => resolve::<T>(&value.to_text()).value,
        None => T::DEFAULT,
    }
}

fn bool_modifier(descriptor: &CommandDescriptor, key: &str, default: bool) -> bool {
    descriptor.get(key).map_or(default, Value::as_bool)
}

fn int_modifier(key: &str, value: &Value) -> Option<i64> {
    let parsed = value.as_int();
    if parsed.is_none() {
        tracing::warn!(modifier = key, value = %value.to_text(), "not an integer, using default");
    }
    parsed
}

fn clamp_u8(v: i64) -> u8 {
    v.clamp(0, i64::from(u8::MAX)) as u8
}

fn clamp_u16(v: i64) -> u16 {
    v.clamp(0, i64::from(u16::MAX)) as u16
}

fn clamp_feed(key: &str, v: i64, max: u32) -> u32 {
    if v > i64::from(max) {
        tracing::warn!(operation = key, requested = v, max, "feed amount capped");
    }
    v.clamp(0, i64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(descriptor: CommandDescriptor) -> PrintCommand {
        PrintCommand::from_descriptor(&descriptor).unwrap()
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let skip = PrintCommand::from_descriptor(&CommandDescriptor::new().with("apend", "x"));
        assert_eq!(
            skip,
            Err(Skip::NoOperation {
                keys: vec!["apend".to_string()]
            })
        );
    }

    #[test]
    fn test_priority_order_picks_first_key() {
        // appendEncoding precedes append in the dispatch order
        let descriptor = CommandDescriptor::new()
            .with("append", "text")
            .with("appendEncoding", "UTF-8");
        assert_eq!(
            parse(descriptor),
            PrintCommand::SetEncoding(TextEncoding::Utf8)
        );
    }

    #[test]
    fn test_line_feed_requires_integer() {
        let descriptor = CommandDescriptor::new().with("appendLineFeed", "lots");
        assert!(matches!(
            PrintCommand::from_descriptor(&descriptor),
            Err(Skip::InvalidValue {
                key: "appendLineFeed",
                ..
            })
        ));
        assert_eq!(
            parse(CommandDescriptor::new().with("appendLineFeed", 3)),
            PrintCommand::LineFeed(3)
        );
    }

    #[test]
    fn test_barcode_defaults() {
        let cmd = parse(CommandDescriptor::new().with("appendBarcode", "12345"));
        assert_eq!(
            cmd,
            PrintCommand::Barcode {
                data: Payload::Text("12345".into()),
                symbology: BarcodeSymbology::Code128,
                width: BarcodeWidth::Mode2,
                height: 40,
                hri: true,
                placement: Placement::Inline,
            }
        );
    }

    #[test]
    fn test_absolute_position_beats_alignment() {
        let cmd = parse(
            CommandDescriptor::new()
                .with("appendBarcode", "12345")
                .with("alignment", "Center")
                .with("absolutePosition", 40),
        );
        let PrintCommand::Barcode { placement, .. } = cmd else {
            panic!("expected barcode, got {cmd:?}");
        };
        assert_eq!(placement, Placement::Absolute(40));
    }

    #[test]
    fn test_alignment_placement() {
        let cmd = parse(
            CommandDescriptor::new()
                .with("appendBitmapText", "Total")
                .with("alignment", "Right")
                .with("fontSize", 40),
        );
        let PrintCommand::Bitmap {
            source, placement, ..
        } = cmd
        else {
            panic!("expected bitmap, got {cmd:?}");
        };
        assert_eq!(placement, Placement::Aligned(Alignment::Right));
        assert_eq!(
            source,
            BitmapSource::Text {
                text: "Total".into(),
                font_size: 40.0
            }
        );
    }

    #[test]
    fn test_bitmap_modifiers() {
        let cmd = parse(
            CommandDescriptor::new()
                .with("appendBitmap", "https://example.com/logo.png")
                .with("diffusion", false)
                .with("width", "384")
                .with("bothScale", "false")
                .with("rotation", "Left90"),
        );
        let PrintCommand::Bitmap { params, .. } = cmd else {
            panic!("expected bitmap, got {cmd:?}");
        };
        assert_eq!(
            params,
            BitmapParams {
                diffusion: false,
                width: 384,
                both_scale: false,
                rotation: BitmapRotation::Left90,
            }
        );
    }

    #[test]
    fn test_alignment_with_data() {
        let cmd = parse(
            CommandDescriptor::new()
                .with("appendAlignment", "Center")
                .with("data", "Title\n"),
        );
        assert_eq!(
            cmd,
            PrintCommand::Alignment {
                alignment: Alignment::Center,
                data: Some(Payload::Text("Title\n".into())),
            }
        );
    }

    #[test]
    fn test_logo_size_modifier() {
        let cmd = parse(
            CommandDescriptor::new()
                .with("appendLogo", 1)
                .with("logoSize", "DoubleWidth"),
        );
        assert_eq!(
            cmd,
            PrintCommand::Logo {
                key: 1,
                size: LogoSize::DoubleWidth
            }
        );
    }

    #[test]
    fn test_cash_drawer_channel_from_integer() {
        assert_eq!(
            parse(CommandDescriptor::new().with("openCashDrawer", 2)),
            PrintCommand::OpenCashDrawer(PeripheralChannel::No2)
        );
    }

    #[test]
    fn test_tab_positions() {
        assert_eq!(
            parse(CommandDescriptor::new().with("appendHorizontalTabPosition", vec![8u8, 16, 24])),
            PrintCommand::HorizontalTabPosition(vec![8, 16, 24])
        );
    }

    #[test]
    fn test_enable_toggles() {
        assert_eq!(
            parse(CommandDescriptor::new().with("enableEmphasis", "true")),
            PrintCommand::EnableEmphasis(true)
        );
        assert_eq!(
            parse(CommandDescriptor::new().with("enableUnderline", false)),
            PrintCommand::EnableUnderline(false)
        );
    }

    #[test]
    fn test_feed_amounts_are_capped() {
        assert_eq!(
            parse(CommandDescriptor::new().with("appendLineFeed", 5_000_000_000i64)),
            PrintCommand::LineFeed(MAX_LINE_FEED)
        );
        assert_eq!(
            parse(CommandDescriptor::new().with("appendUnitFeed", 5_000_000_000i64)),
            PrintCommand::UnitFeed(MAX_UNIT_FEED)
        );
        assert_eq!(
            parse(CommandDescriptor::new().with("appendLineFeed", -4)),
            PrintCommand::LineFeed(0)
        );
    }

    #[test]
    fn test_byte_lists_out_of_range_are_skipped() {
        let descriptor = CommandDescriptor::new().with("appendBytes", Value::List(vec![0x1B, 256]));
        assert!(matches!(
            PrintCommand::from_descriptor(&descriptor),
            Err(Skip::InvalidValue { key: "appendBytes", .. })
        ));

        let descriptor =
            CommandDescriptor::new().with("appendBitmapByteArray", Value::List(vec![137, -1]));
        assert!(matches!(
            PrintCommand::from_descriptor(&descriptor),
            Err(Skip::InvalidValue { key: "appendBitmapByteArray", .. })
        ));

        let descriptor = CommandDescriptor::new()
            .with("appendAlignment", "Center")
            .with("data", Value::List(vec![300]));
        assert!(matches!(
            PrintCommand::from_descriptor(&descriptor),
            Err(Skip::InvalidValue { key: "data", .. })
        ));
    }
}
