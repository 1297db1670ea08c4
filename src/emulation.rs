//! # Printer Emulations
//!
//! An emulation selects both the command grammar the compiler emits and the
//! connection-profile string handed to the transport when a port is opened.
//!
//! | Selector | Dialect | Profile string |
//! |----------|---------|----------------|
//! | `StarPRNT` | Star Line Mode | `Portable;l` |
//! | `StarPRNTL` | Star Line Mode | `Portable;l` |
//! | `StarLine` | Star Line Mode | `StarLine` |
//! | `StarGraphic` | Star Graphic (raster) | `StarGraphic` |
//! | `StarDotImpact` | Star Line Mode, band graphics | `StarDotImpact` |
//! | `EscPos` | ESC/POS | `escpos` |
//! | `EscPosMobile` | ESC/POS | `mini` |
//!
//! Unrecognized selectors compile as `StarLine`, but the profile string is
//! derived from the raw selector and passed through unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Command-language dialect of a printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Emulation {
    #[serde(rename = "StarPRNT")]
    StarPrnt,
    #[serde(rename = "StarPRNTL")]
    StarPrntL,
    #[default]
    StarLine,
    StarGraphic,
    EscPos,
    EscPosMobile,
    StarDotImpact,
}

/// Byte grammar family shared by several emulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Star Line Mode (StarPRNT family).
    StarLine,
    /// Star Graphic mode: raster data only.
    StarGraphic,
    /// Epson ESC/POS.
    EscPos,
}

impl Emulation {
    pub const ALL: [Emulation; 7] = [
        Emulation::StarPrnt,
        Emulation::StarPrntL,
        Emulation::StarLine,
        Emulation::StarGraphic,
        Emulation::EscPos,
        Emulation::EscPosMobile,
        Emulation::StarDotImpact,
    ];

    /// Parse a selector string. Unrecognized input yields `StarLine`.
    pub fn parse(selector: &str) -> Self {
        match selector {
            "StarPRNT" => Emulation::StarPrnt,
            "StarPRNTL" => Emulation::StarPrntL,
            "StarLine" => Emulation::StarLine,
            "StarGraphic" => Emulation::StarGraphic,
            "EscPos" => Emulation::EscPos,
            "EscPosMobile" => Emulation::EscPosMobile,
            "StarDotImpact" => Emulation::StarDotImpact,
            other => {
                tracing::warn!(selector = other, "unrecognized emulation, using StarLine");
                Emulation::StarLine
            }
        }
    }

    /// Canonical selector string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emulation::StarPrnt => "StarPRNT",
            Emulation::StarPrntL => "StarPRNTL",
            Emulation::StarLine => "StarLine",
            Emulation::StarGraphic => "StarGraphic",
            Emulation::EscPos => "EscPos",
            Emulation::EscPosMobile => "EscPosMobile",
            Emulation::StarDotImpact => "StarDotImpact",
        }
    }

    /// Grammar family used by the code generator.
    pub fn dialect(&self) -> Dialect {
        match self {
            Emulation::StarPrnt
            | Emulation::StarPrntL
            | Emulation::StarLine
            | Emulation::StarDotImpact => Dialect::StarLine,
            Emulation::StarGraphic => Dialect::StarGraphic,
            Emulation::EscPos | Emulation::EscPosMobile => Dialect::EscPos,
        }
    }

    /// Whether bitmaps go out as 24-row bands instead of raster blocks.
    pub fn uses_band_graphics(&self) -> bool {
        matches!(self, Emulation::StarDotImpact)
    }

    /// Connection-profile string for this emulation.
    pub fn port_settings(&self) -> &'static str {
        match self {
            Emulation::EscPosMobile => "mini",
            Emulation::EscPos => "escpos",
            Emulation::StarPrnt | Emulation::StarPrntL => "Portable;l",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Emulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection-profile string for a raw selector.
///
/// Unlike [`Emulation::parse`], unknown selectors pass through verbatim.
pub fn port_settings_for(selector: &str) -> String {
    match selector {
        "EscPosMobile" => "mini".to_string(),
        "EscPos" => "escpos".to_string(),
        "StarPRNT" | "StarPRNTL" => "Portable;l".to_string(),
        other => other.to_string(),
    }
}

/// A selector as the caller gave it: the emulation the job compiles as and
/// the profile string the port is opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmulationSelector {
    pub emulation: Emulation,
    pub port_settings: String,
}

impl EmulationSelector {
    pub fn parse(selector: &str) -> Self {
        Self {
            emulation: Emulation::parse(selector),
            port_settings: port_settings_for(selector),
        }
    }
}

impl From<Emulation> for EmulationSelector {
    fn from(emulation: Emulation) -> Self {
        Self {
            emulation,
            port_settings: emulation.port_settings().to_string(),
        }
    }
}

impl From<&str> for EmulationSelector {
    fn from(selector: &str) -> Self {
        Self::parse(selector)
    }
}
