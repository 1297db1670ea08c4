//! # USB Line-Printer Transport
//!
//! USB printers appear as `usblp` nodes (`/dev/usb/lp0`, ...). The kernel
//! exposes each device's IEEE 1284 ID string in sysfs, which carries the
//! model (`MDL:`) and serial number (`SN:`) used by discovery.

use std::fs;
use std::path::Path;

use super::device::DeviceLink;
use crate::error::CometaError;

pub const DEFAULT_DEVICE: &str = "/dev/usb/lp0";
const DEVICE_DIR: &str = "/dev/usb";
const SYSFS_CLASS: &str = "/sys/class/usbmisc";

/// A line-printer node with its identification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsbPrinter {
    pub path: String,
    pub model: String,
    pub serial: String,
}

/// Open a USB line-printer node. An empty path opens [`DEFAULT_DEVICE`].
pub fn open(path: &str) -> Result<DeviceLink, CometaError> {
    let path = if path.is_empty() { DEFAULT_DEVICE } else { path };
    tracing::debug!(device = path, "opening USB printer");
    DeviceLink::open(path)
}

/// List line-printer nodes.
///
/// Fails when the USB device directory is missing (no controller or no
/// `usblp` driver); the caller decides whether that matters.
pub fn list_printers() -> Result<Vec<UsbPrinter>, CometaError> {
    let entries = fs::read_dir(DEVICE_DIR)
        .map_err(|e| CometaError::Transport(format!("Cannot list {DEVICE_DIR}: {e}")))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("lp"))
        .collect();
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| {
            let id = fs::read_to_string(Path::new(SYSFS_CLASS).join(&name).join("device/ieee1284_id"))
                .unwrap_or_default();
            let (model, serial) = parse_device_id(&id);
            UsbPrinter {
                path: format!("{DEVICE_DIR}/{name}"),
                model,
                serial,
            }
        })
        .collect())
}

/// Extract `(model, serial)` from an IEEE 1284 device ID.
///
/// The serial comes back in `" SN:<serial>"` form, so a device without one
/// yields the bare `" SN:"` placeholder.
pub fn parse_device_id(id: &str) -> (String, String) {
    let mut model = String::new();
    let mut serial = String::new();
    for field in id.split(';') {
        let Some((key, value)) = field.split_once(':') else {
            continue;
        };
        match key.trim() {
            "MDL" | "MODEL" => model = value.trim().to_string(),
            "SN" | "SERN" => serial = value.trim().to_string(),
            _ => {}
        }
    }
    (model, format!(" SN:{serial}"))
}
