//! # Option Resolvers
//!
//! Lookup tables mapping the symbolic strings used in print-job descriptors
//! (`"PartialCutWithFeed"`, `"Code128"`, `"Center"`, ...) to typed option
//! values. Every table has a documented default that is used when the input
//! does not match.
//!
//! A fallback is never an error, but it is never silent either: [`resolve`]
//! reports it through [`Resolved::fell_back`] and logs a warning, so a typo
//! can be told apart from an explicit choice of the default.
//!
//! ```
//! use cometa::options::{resolve, CutPaperAction};
//!
//! let cut = resolve::<CutPaperAction>("FullCut");
//! assert_eq!(cut.value, CutPaperAction::FullCut);
//! assert!(!cut.fell_back);
//!
//! let typo = resolve::<CutPaperAction>("FulCut");
//! assert_eq!(typo.value, CutPaperAction::PartialCutWithFeed);
//! assert!(typo.fell_back);
//! ```

/// A closed option table with a default.
pub trait OptionValue: Sized + Copy {
    /// Table name used in log messages.
    const KIND: &'static str;
    /// Value used when the input does not match any entry.
    const DEFAULT: Self;

    /// Exact lookup, `None` when the symbol is not in the table.
    fn from_symbol(symbol: &str) -> Option<Self>;
}

/// Result of a lookup, remembering whether the default was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub fell_back: bool,
}

/// Resolve `symbol` against the table for `T`, falling back to `T::DEFAULT`.
pub fn resolve<T: OptionValue>(symbol: &str) -> Resolved<T> {
    match T::from_symbol(symbol) {
        Some(value) => Resolved {
            value,
            fell_back: false,
        },
        None => {
            tracing::warn!(
                option = T::KIND,
                input = symbol,
                "unrecognized option value, using default"
            );
            Resolved {
                value: T::DEFAULT,
                fell_back: true,
            }
        }
    }
}

/// Shorthand for `resolve(symbol).value`.
#[inline]
pub fn resolve_value<T: OptionValue>(symbol: &str) -> T {
    resolve::<T>(symbol).value
}

macro_rules! option_table {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, default = $default:ident,
        { $($variant:ident => $symbol:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl OptionValue for $name {
            const KIND: &'static str = $kind;
            const DEFAULT: Self = $name::$default;

            fn from_symbol(symbol: &str) -> Option<Self> {
                match symbol {
                    $($symbol => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as OptionValue>::DEFAULT
            }
        }
    };
}

option_table! {
    /// Printer-side code page (character table). Default: `CP998`.
    CodePage, "code page", default = Cp998,
    {
        Cp437 => "CP437", Cp737 => "CP737", Cp772 => "CP772", Cp774 => "CP774",
        Cp851 => "CP851", Cp852 => "CP852", Cp855 => "CP855", Cp857 => "CP857",
        Cp858 => "CP858", Cp860 => "CP860", Cp861 => "CP861", Cp862 => "CP862",
        Cp863 => "CP863", Cp864 => "CP864", Cp865 => "CP865", Cp866 => "CP866",
        Cp869 => "CP869", Cp874 => "CP874", Cp928 => "CP928", Cp932 => "CP932",
        Cp998 => "CP998", Cp999 => "CP999", Cp1001 => "CP1001", Cp1250 => "CP1250",
        Cp1251 => "CP1251", Cp1252 => "CP1252", Cp2001 => "CP2001", Cp3001 => "CP3001",
        Cp3002 => "CP3002", Cp3011 => "CP3011", Cp3012 => "CP3012", Cp3021 => "CP3021",
        Cp3041 => "CP3041", Cp3840 => "CP3840", Cp3841 => "CP3841", Cp3843 => "CP3843",
        Cp3845 => "CP3845", Cp3846 => "CP3846", Cp3847 => "CP3847", Cp3848 => "CP3848",
        Utf8 => "UTF8", Blank => "Blank",
    }
}

option_table! {
    /// International character set. Default: `USA`.
    International, "international", default = Usa,
    {
        Uk => "UK", Usa => "USA", France => "France", Germany => "Germany",
        Denmark => "Denmark", Sweden => "Sweden", Italy => "Italy", Spain => "Spain",
        Japan => "Japan", Norway => "Norway", Denmark2 => "Denmark2", Spain2 => "Spain2",
        LatinAmerica => "LatinAmerica", Korea => "Korea", Ireland => "Ireland",
        Legal => "Legal",
    }
}

option_table! {
    /// Device font. Default: `A`.
    FontStyle, "font style", default = A,
    { A => "A", B => "B" }
}

option_table! {
    /// Cutter action. Default: `PartialCutWithFeed`.
    CutPaperAction, "cut paper action", default = PartialCutWithFeed,
    {
        FullCut => "FullCut",
        FullCutWithFeed => "FullCutWithFeed",
        PartialCut => "PartialCut",
        PartialCutWithFeed => "PartialCutWithFeed",
    }
}

option_table! {
    /// Peripheral (cash drawer) drive channel. Default: `No1`.
    PeripheralChannel, "peripheral channel", default = No1,
    { No1 => "1", No2 => "2" }
}

option_table! {
    /// Black-mark sensing mode. Default: `Valid`.
    BlackMark, "black mark", default = Valid,
    {
        Valid => "Valid",
        Invalid => "Invalid",
        ValidWithDetection => "ValidWithDetection",
    }
}

option_table! {
    /// Horizontal alignment. Default: `Left`.
    Alignment, "alignment", default = Left,
    { Left => "Left", Center => "Center", Right => "Right" }
}

option_table! {
    /// Stored logo magnification. Default: `Normal`.
    LogoSize, "logo size", default = Normal,
    {
        Normal => "Normal",
        DoubleWidth => "DoubleWidth",
        DoubleHeight => "DoubleHeight",
        DoubleWidthDoubleHeight => "DoubleWidthDoubleHeight",
    }
}

option_table! {
    /// 1D barcode symbology. Default: `Code128`.
    BarcodeSymbology, "barcode symbology", default = Code128,
    {
        Code128 => "Code128", Code39 => "Code39", Code93 => "Code93",
        Itf => "ITF", Jan8 => "JAN8", Jan13 => "JAN13", Nw7 => "NW7",
        UpcA => "UPCA", UpcE => "UPCE",
    }
}

option_table! {
    /// Barcode module-width mode. Default: `Mode2`.
    BarcodeWidth, "barcode width", default = Mode2,
    {
        Mode1 => "Mode1", Mode2 => "Mode2", Mode3 => "Mode3",
        Mode4 => "Mode4", Mode5 => "Mode5", Mode6 => "Mode6",
        Mode7 => "Mode7", Mode8 => "Mode8", Mode9 => "Mode9",
    }
}

option_table! {
    /// Bitmap rotation applied before conversion. Default: `Normal`.
    BitmapRotation, "bitmap rotation", default = Normal,
    {
        Normal => "Normal", Left90 => "Left90",
        Right90 => "Right90", Rotate180 => "Rotate180",
    }
}

impl BarcodeWidth {
    /// Mode number 1-9.
    pub fn mode_number(self) -> u8 {
        match self {
            BarcodeWidth::Mode1 => 1,
            BarcodeWidth::Mode2 => 2,
            BarcodeWidth::Mode3 => 3,
            BarcodeWidth::Mode4 => 4,
            BarcodeWidth::Mode5 => 5,
            BarcodeWidth::Mode6 => 6,
            BarcodeWidth::Mode7 => 7,
            BarcodeWidth::Mode8 => 8,
            BarcodeWidth::Mode9 => 9,
        }
    }
}

impl Alignment {
    /// Alignment parameter shared by `ESC GS a n` and `ESC a n`.
    pub fn code(self) -> u8 {
        match self {
            Alignment::Left => 0,
            Alignment::Center => 1,
            Alignment::Right => 2,
        }
    }
}

impl LogoSize {
    /// Magnification parameter `m` for the logo print commands.
    pub fn code(self) -> u8 {
        match self {
            LogoSize::Normal => 0,
            LogoSize::DoubleWidth => 1,
            LogoSize::DoubleHeight => 2,
            LogoSize::DoubleWidthDoubleHeight => 3,
        }
    }
}

impl International {
    /// Character set number for `ESC R n`.
    pub fn code(self) -> u8 {
        match self {
            International::Usa => 0,
            International::France => 1,
            International::Germany => 2,
            International::Uk => 3,
            International::Denmark => 4,
            International::Sweden => 5,
            International::Italy => 6,
            International::Spain => 7,
            International::Japan => 8,
            International::Norway => 9,
            International::Denmark2 => 10,
            International::Spain2 => 11,
            International::LatinAmerica => 12,
            International::Korea => 13,
            International::Ireland => 14,
            International::Legal => 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_does_not_fall_back() {
        let r = resolve::<BarcodeSymbology>("JAN13");
        assert_eq!(r.value, BarcodeSymbology::Jan13);
        assert!(!r.fell_back);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(resolve_value::<CodePage>("CP000"), CodePage::Cp998);
        assert_eq!(resolve_value::<International>("Mars"), International::Usa);
        assert_eq!(resolve_value::<FontStyle>("Z"), FontStyle::A);
        assert_eq!(
            resolve_value::<CutPaperAction>(""),
            CutPaperAction::PartialCutWithFeed
        );
        assert_eq!(resolve_value::<PeripheralChannel>("3"), PeripheralChannel::No1);
        assert_eq!(resolve_value::<BlackMark>("?"), BlackMark::Valid);
        assert_eq!(resolve_value::<Alignment>("Middle"), Alignment::Left);
        assert_eq!(resolve_value::<LogoSize>("Huge"), LogoSize::Normal);
        assert_eq!(
            resolve_value::<BarcodeSymbology>("QR"),
            BarcodeSymbology::Code128
        );
        assert_eq!(resolve_value::<BarcodeWidth>("Mode10"), BarcodeWidth::Mode2);
        assert_eq!(
            resolve_value::<BitmapRotation>("Upside"),
            BitmapRotation::Normal
        );
    }

    #[test]
    fn test_explicit_default_is_not_a_fallback() {
        let r = resolve::<Alignment>("Left");
        assert_eq!(r.value, Alignment::Left);
        assert!(!r.fell_back);

        let r = resolve::<Alignment>("left");
        assert_eq!(r.value, Alignment::Left);
        assert!(r.fell_back);
    }

    #[test]
    fn test_peripheral_channel_from_integers() {
        assert_eq!(resolve_value::<PeripheralChannel>("2"), PeripheralChannel::No2);
        assert_eq!(resolve_value::<PeripheralChannel>("1"), PeripheralChannel::No1);
    }

    #[test]
    fn test_barcode_width_mode_numbers() {
        assert_eq!(BarcodeWidth::Mode1.mode_number(), 1);
        assert_eq!(BarcodeWidth::default().mode_number(), 2);
        assert_eq!(BarcodeWidth::Mode9.mode_number(), 9);
    }
}
