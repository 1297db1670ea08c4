//! # Port Discovery
//!
//! Discovery runs up to three sub-scans, chosen by an [`InterfaceFilter`],
//! and concatenates their results in Bluetooth → LAN → USB order. A USB scan
//! that fails (no controller, no `usblp` driver) is logged and skipped; the
//! other scans propagate their errors.
//!
//! Raw entries are normalized into [`PortDescriptor`]s:
//!
//! | Raw entry | `portName` | `macAddress` | `modelName` | `USBSerialNumber` |
//! |-----------|------------|--------------|-------------|-------------------|
//! | Bluetooth with MAC | `BT:<mac>` | mac | raw port name | |
//! | Other with MAC | raw | mac | model if any | |
//! | No MAC, USB/All filter | raw | | model if any | serial unless `" SN:"` |
//! | No MAC, other filter | raw | | | |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CometaError;
use crate::transport::{bluetooth, tcp, usb};

/// Placeholder serial reported for USB devices without one.
pub const NO_SERIAL: &str = " SN:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterfaceFilter {
    Bluetooth,
    #[serde(rename = "LAN")]
    Lan,
    #[serde(rename = "USB")]
    Usb,
    #[default]
    All,
}

impl InterfaceFilter {
    /// Anything unrecognized means all interfaces.
    pub fn parse(name: &str) -> Self {
        match name {
            "Bluetooth" => InterfaceFilter::Bluetooth,
            "LAN" => InterfaceFilter::Lan,
            "USB" => InterfaceFilter::Usb,
            _ => InterfaceFilter::All,
        }
    }

    fn includes(&self, target: ScanTarget) -> bool {
        matches!(
            (self, target),
            (InterfaceFilter::All, _)
                | (InterfaceFilter::Bluetooth, ScanTarget::Bluetooth)
                | (InterfaceFilter::Lan, ScanTarget::Tcp)
                | (InterfaceFilter::Usb, ScanTarget::Usb)
        )
    }

    fn reports_usb_details(&self) -> bool {
        matches!(self, InterfaceFilter::Usb | InterfaceFilter::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    Bluetooth,
    Tcp,
    Usb,
}

/// A port as a sub-scan reports it. Empty strings mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPortInfo {
    pub port_name: String,
    pub mac_address: String,
    pub model_name: String,
    pub usb_serial_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    #[serde(rename = "portName")]
    pub port_name: String,
    #[serde(rename = "macAddress", skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(rename = "modelName", skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(rename = "USBSerialNumber", skip_serializing_if = "Option::is_none")]
    pub usb_serial_number: Option<String>,
}

/// Source of raw port entries.
pub trait PortScanner: Send + Sync {
    fn scan(&self, target: ScanTarget) -> Result<Vec<RawPortInfo>, CometaError>;
}

/// Reshape raw entries into descriptors, preserving order.
pub fn normalize(entries: &[RawPortInfo], filter: InterfaceFilter) -> Vec<PortDescriptor> {
    entries.iter().map(|raw| normalize_one(raw, filter)).collect()
}

fn normalize_one(raw: &RawPortInfo, filter: InterfaceFilter) -> PortDescriptor {
    let bluetooth = raw.port_name.starts_with("BT:");
    let has_mac = !raw.mac_address.is_empty();
    let mut port = PortDescriptor {
        port_name: if bluetooth && has_mac {
            format!("BT:{}", raw.mac_address)
        } else {
            raw.port_name.clone()
        },
        ..Default::default()
    };

    if has_mac {
        port.mac_address = Some(raw.mac_address.clone());
        if bluetooth {
            port.model_name = Some(raw.port_name.clone());
        } else if !raw.model_name.is_empty() {
            port.model_name = Some(raw.model_name.clone());
        }
    } else if filter.reports_usb_details() {
        if !raw.model_name.is_empty() {
            port.model_name = Some(raw.model_name.clone());
        }
        if !raw.usb_serial_number.is_empty() && raw.usb_serial_number != NO_SERIAL {
            port.usb_serial_number = Some(raw.usb_serial_number.clone());
        }
    }
    port
}

/// Run the sub-scans selected by `filter` and normalize the result.
pub fn discover(
    scanner: &dyn PortScanner,
    filter: InterfaceFilter,
) -> Result<Vec<PortDescriptor>, CometaError> {
    let mut raw = Vec::new();
    for target in [ScanTarget::Bluetooth, ScanTarget::Tcp, ScanTarget::Usb] {
        if !filter.includes(target) {
            continue;
        }
        match scanner.scan(target) {
            Ok(found) => {
                tracing::debug!(?target, count = found.len(), "scan finished");
                raw.extend(found);
            }
            Err(e) if target == ScanTarget::Usb => {
                tracing::warn!(error = %e, "usb not connected");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(normalize(&raw, filter))
}

/// Scans the local machine: bound RFCOMM devices, reachable LAN hosts and
/// USB line printers.
#[derive(Debug, Clone)]
pub struct SystemScanner {
    /// Hosts probed on port 9100 by the LAN scan.
    pub lan_hosts: Vec<String>,
    pub probe_timeout: Duration,
}

impl Default for SystemScanner {
    fn default() -> Self {
        Self {
            lan_hosts: Vec::new(),
            probe_timeout: Duration::from_millis(500),
        }
    }
}

impl PortScanner for SystemScanner {
    fn scan(&self, target: ScanTarget) -> Result<Vec<RawPortInfo>, CometaError> {
        match target {
            ScanTarget::Bluetooth => Ok(bluetooth::list_bindings()?
                .into_iter()
                .map(|binding| RawPortInfo {
                    port_name: format!("BT:{}", binding.device),
                    mac_address: binding.mac,
                    ..Default::default()
                })
                .collect()),
            ScanTarget::Tcp => Ok(self
                .lan_hosts
                .iter()
                .filter(|host| probe(host, self.probe_timeout))
                .map(|host| RawPortInfo {
                    port_name: format!("TCP:{host}"),
                    ..Default::default()
                })
                .collect()),
            ScanTarget::Usb => Ok(usb::list_printers()?
                .into_iter()
                .map(|printer| RawPortInfo {
                    port_name: format!("USB:{}", printer.path),
                    model_name: printer.model,
                    usb_serial_number: printer.serial,
                    ..Default::default()
                })
                .collect()),
        }
    }
}

fn probe(host: &str, timeout: Duration) -> bool {
    match tcp::resolve(host) {
        Ok(addr) => std::net::TcpStream::connect_timeout(&addr, timeout).is_ok(),
        Err(e) => {
            tracing::debug!(host, error = %e, "skipping unresolvable host");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bt(port: &str, mac: &str) -> RawPortInfo {
        RawPortInfo {
            port_name: port.into(),
            mac_address: mac.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_bluetooth_rewritten_to_mac() {
        let ports = normalize(
            &[bt("BT:TSP100-A0012", "00:12:F3:1E:2B:9A")],
            InterfaceFilter::Bluetooth,
        );
        assert_eq!(
            ports,
            vec![PortDescriptor {
                port_name: "BT:00:12:F3:1E:2B:9A".into(),
                mac_address: Some("00:12:F3:1E:2B:9A".into()),
                model_name: Some("BT:TSP100-A0012".into()),
                usb_serial_number: None,
            }]
        );
    }

    #[test]
    fn test_lan_entry_with_mac_uses_model() {
        let raw = RawPortInfo {
            port_name: "TCP:192.168.1.20".into(),
            mac_address: "00:11:62:00:00:01".into(),
            model_name: "TSP654".into(),
            ..Default::default()
        };
        let ports = normalize(&[raw], InterfaceFilter::Lan);
        assert_eq!(ports[0].port_name, "TCP:192.168.1.20");
        assert_eq!(ports[0].model_name.as_deref(), Some("TSP654"));
    }

    #[test]
    fn test_usb_serial_placeholder_suppressed() {
        let raw = |serial: &str| RawPortInfo {
            port_name: "USB:/dev/usb/lp0".into(),
            model_name: "TSP143IIIU".into(),
            usb_serial_number: serial.into(),
            ..Default::default()
        };
        let ports = normalize(&[raw(NO_SERIAL), raw(" SN:123")], InterfaceFilter::Usb);
        assert_eq!(ports[0].usb_serial_number, None);
        assert_eq!(ports[1].usb_serial_number.as_deref(), Some(" SN:123"));
        assert_eq!(ports[0].model_name.as_deref(), Some("TSP143IIIU"));

        // LAN filter never reports USB details
        let ports = normalize(&[raw(" SN:123")], InterfaceFilter::Lan);
        assert_eq!(ports[0].model_name, None);
        assert_eq!(ports[0].usb_serial_number, None);
    }

    #[test]
    fn test_json_shape() {
        let port = PortDescriptor {
            port_name: "USB:/dev/usb/lp0".into(),
            usb_serial_number: Some(" SN:1".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&port).unwrap(),
            serde_json::json!({"portName": "USB:/dev/usb/lp0", "USBSerialNumber": " SN:1"})
        );
    }

    struct FakeScanner {
        usb_fails: bool,
        tcp_fails: bool,
    }

    impl PortScanner for FakeScanner {
        fn scan(&self, target: ScanTarget) -> Result<Vec<RawPortInfo>, CometaError> {
            match target {
                ScanTarget::Bluetooth => Ok(vec![bt("BT:a", "AA:AA:AA:AA:AA:AA")]),
                ScanTarget::Tcp if self.tcp_fails => {
                    Err(CometaError::Transport("network down".into()))
                }
                ScanTarget::Tcp => Ok(vec![bt("TCP:10.0.0.1", ""), bt("TCP:10.0.0.2", "")]),
                ScanTarget::Usb if self.usb_fails => {
                    Err(CometaError::Transport("no controller".into()))
                }
                ScanTarget::Usb => Ok(vec![bt("USB:/dev/usb/lp0", "")]),
            }
        }
    }

    fn names(ports: &[PortDescriptor]) -> Vec<&str> {
        ports.iter().map(|p| p.port_name.as_str()).collect()
    }

    #[test]
    fn test_discover_order_and_filter() {
        let scanner = FakeScanner {
            usb_fails: false,
            tcp_fails: false,
        };
        let all = discover(&scanner, InterfaceFilter::All).unwrap();
        assert_eq!(
            names(&all),
            vec![
                "BT:AA:AA:AA:AA:AA:AA",
                "TCP:10.0.0.1",
                "TCP:10.0.0.2",
                "USB:/dev/usb/lp0"
            ]
        );
        let lan = discover(&scanner, InterfaceFilter::Lan).unwrap();
        assert_eq!(names(&lan), vec!["TCP:10.0.0.1", "TCP:10.0.0.2"]);
    }

    #[test]
    fn test_usb_failure_is_swallowed() {
        let scanner = FakeScanner {
            usb_fails: true,
            tcp_fails: false,
        };
        assert_eq!(discover(&scanner, InterfaceFilter::All).unwrap().len(), 3);
        assert!(discover(&scanner, InterfaceFilter::Usb).unwrap().is_empty());
    }

    #[test]
    fn test_other_failures_propagate() {
        let scanner = FakeScanner {
            usb_fails: false,
            tcp_fails: true,
        };
        assert!(discover(&scanner, InterfaceFilter::All).is_err());
        assert!(discover(&scanner, InterfaceFilter::Bluetooth).is_ok());
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(InterfaceFilter::parse("LAN"), InterfaceFilter::Lan);
        assert_eq!(InterfaceFilter::parse("bogus"), InterfaceFilter::All);
    }
}
