//! # Bluetooth RFCOMM Transport
//!
//! Star printers speak Serial Port Profile over RFCOMM. The printer must be
//! paired and bound to an RFCOMM device node first:
//!
//! ```bash
//! $ bluetoothctl pair 00:11:62:XX:XX:XX
//! $ sudo rfcomm bind 0 00:11:62:XX:XX:XX
//! # This creates /dev/rfcomm0
//! ```
//!
//! `BT:<mac>` port names are resolved to the bound node through
//! `/proc/net/rfcomm` (falling back to `rfcomm -a`). `BT:/dev/rfcommN` opens
//! the node directly.
//!
//! ## TTY Configuration
//!
//! The node is switched to raw mode so binary data passes unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, etc. cleared
//! - **No output processing**: OPOST cleared (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical mode**: ICANON and ECHO cleared

use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use super::device::DeviceLink;
use crate::error::CometaError;

/// One line of `/proc/net/rfcomm` or `rfcomm -a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfcommBinding {
    /// Device name, e.g. `rfcomm0`.
    pub device: String,
    /// Remote MAC address, upper case.
    pub mac: String,
}

/// Open the RFCOMM node for `target` (a MAC address or a device path).
pub fn open(target: &str) -> Result<DeviceLink, CometaError> {
    let path = if is_valid_mac(target) {
        find_rfcomm_for_mac(target)?.ok_or_else(|| {
            CometaError::Transport(format!("No RFCOMM device bound to {target}"))
        })?
    } else if target.starts_with("/dev/") {
        target.to_string()
    } else {
        return Err(CometaError::Transport(format!(
            "Invalid Bluetooth address: {target}"
        )));
    };

    tracing::debug!(device = %path, "opening RFCOMM device");
    let link = DeviceLink::open(&path)?;
    if let Some(fd) = link.raw_fd() {
        configure_tty_raw(fd)?;
    }
    Ok(link)
}

/// Configure a file descriptor for raw TTY mode.
///
/// IXON/IXOFF/IXANY are cleared too: 0x11 and 0x13 appear in raster data
/// and must not be taken as flow control.
fn configure_tty_raw(fd: i32) -> Result<(), CometaError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(CometaError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(CometaError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Parse the binding table (format: `rfcomm0: XX:XX:XX:XX:XX:XX channel N ...`).
pub fn parse_bindings(table: &str) -> Vec<RfcommBinding> {
    table
        .lines()
        .filter_map(|line| {
            let (device, rest) = line.split_once(':')?;
            let mac = rest.split_whitespace().next()?;
            is_valid_mac(mac).then(|| RfcommBinding {
                device: device.trim().to_string(),
                mac: mac.to_uppercase(),
            })
        })
        .collect()
}

/// All RFCOMM bindings known to the kernel.
pub fn list_bindings() -> Result<Vec<RfcommBinding>, CometaError> {
    if let Ok(contents) = fs::read_to_string("/proc/net/rfcomm") {
        return Ok(parse_bindings(&contents));
    }

    let output = Command::new("rfcomm")
        .arg("-a")
        .output()
        .map_err(|e| CometaError::Transport(format!("Failed to run 'rfcomm -a': {}", e)))?;
    Ok(parse_bindings(&String::from_utf8_lossy(&output.stdout)))
}

/// Find an existing RFCOMM device bound to the given MAC address.
///
/// Returns the device path (e.g., "/dev/rfcomm0") if found.
pub fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>, CometaError> {
    let mac_upper = mac.to_uppercase();
    Ok(list_bindings()?
        .into_iter()
        .filter(|binding| binding.mac == mac_upper)
        .map(|binding| format!("/dev/{}", binding.device))
        .find(|path| Path::new(path).exists()))
}
