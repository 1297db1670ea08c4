//! Printer health evaluation.
//!
//! Only one fault is ever reported. When several are raised at once the
//! first one in this order wins:
//!
//! 1. offline
//! 2. cover open
//! 3. receipt paper empty
//! 4. paper jam
//!
//! Paper near empty is informational and never a fault.

use crate::transport::PrinterStatus;

pub const NEAR_EMPTY_MESSAGE: &str = "Paper near empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Offline,
    CoverOpen,
    PaperEmpty,
    PaperJam,
}

impl Fault {
    pub fn message(&self) -> &'static str {
        match self {
            Fault::Offline => "A printer is offline",
            Fault::CoverOpen => "Printer cover is open",
            Fault::PaperEmpty => "Paper empty",
            Fault::PaperJam => "Paper Jam",
        }
    }
}

/// The highest-priority fault raised by `status`, if any.
pub fn evaluate(status: &PrinterStatus) -> Option<Fault> {
    if status.offline {
        Some(Fault::Offline)
    } else if status.cover_open {
        Some(Fault::CoverOpen)
    } else if status.receipt_paper_empty {
        Some(Fault::PaperEmpty)
    } else if status.paper_jam {
        Some(Fault::PaperJam)
    } else {
        None
    }
}
