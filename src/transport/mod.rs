//! # Transports
//!
//! A [`Port`] is an opened printer connection that understands the checked
//! block protocol: a status query before the write, the write itself, and a
//! status query after it. [`PortOpener`] turns a port name into a `Port`.
//!
//! ## Port names
//!
//! | Prefix | Backend | Example |
//! |--------|---------|---------|
//! | `BT:` | Bluetooth RFCOMM device bound to a MAC | `BT:00:11:62:AA:BB:CC` |
//! | `USB:` | USB line-printer node | `USB:/dev/usb/lp0` |
//! | `TCP:` | Raw TCP, port 9100 by default | `TCP:192.168.1.20` |
//!
//! Every concrete backend is a byte [`Link`]; [`StreamPort`] layers the
//! status protocol over it so Bluetooth, USB and TCP share one
//! implementation of the checked block.

pub mod bluetooth;
pub mod device;
pub mod mock;
pub mod status;
pub mod tcp;
pub mod usb;

use std::time::{Duration, Instant};

use crate::error::CometaError;
use crate::protocol::{commands, escpos};

pub use status::{FirmwareInfo, PrinterStatus, StatusProtocol};

/// An opened printer port.
pub trait Port: Send {
    /// Query status before writing.
    fn begin_checked_block(&mut self) -> Result<PrinterStatus, CometaError>;

    fn write(&mut self, data: &[u8]) -> Result<(), CometaError>;

    /// Deadline used by the next [`end_checked_block`](Port::end_checked_block).
    fn set_end_checked_block_timeout(&mut self, timeout: Duration);

    /// Query status after writing.
    fn end_checked_block(&mut self) -> Result<PrinterStatus, CometaError>;

    fn retrieve_status(&mut self) -> Result<PrinterStatus, CometaError>;

    fn firmware_information(&mut self) -> Result<FirmwareInfo, CometaError>;

    /// Close the underlying connection. Called once per opened port.
    fn release(&mut self) -> Result<(), CometaError>;
}

/// Opens ports by name.
pub trait PortOpener: Send + Sync {
    /// `settings` is the emulation's connection profile string.
    fn open(
        &self,
        port_name: &str,
        settings: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Port>, CometaError>;
}

/// A bidirectional byte channel to a printer.
pub trait Link: Send {
    fn send(&mut self, data: &[u8]) -> Result<(), CometaError>;

    /// Read what is available, waiting at most `timeout`. Returns 0 when
    /// nothing arrived in time; a closed peer is an error, never 0.
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, CometaError>;

    fn close(&mut self) -> Result<(), CometaError>;
}

/// [`Port`] implementation over any [`Link`].
pub struct StreamPort<L: Link> {
    link: L,
    protocol: StatusProtocol,
    timeout: Duration,
    end_timeout: Duration,
}

impl<L: Link> StreamPort<L> {
    pub fn new(link: L, protocol: StatusProtocol, timeout: Duration) -> Self {
        Self {
            link,
            protocol,
            timeout,
            end_timeout: timeout,
        }
    }

    fn query_status(&mut self, timeout: Duration) -> Result<PrinterStatus, CometaError> {
        let deadline = Instant::now() + timeout;
        match self.protocol {
            StatusProtocol::StarAsb => {
                self.link.send(&commands::status_request())?;
                let mut first = [0u8; 1];
                self.read_exact(&mut first, deadline)?;
                let len = status::asb_length(first[0]).max(1);
                let mut block = vec![0u8; len];
                block[0] = first[0];
                self.read_exact(&mut block[1..], deadline)?;
                status::parse_asb(&block)
            }
            StatusProtocol::EscPos => {
                let mut bytes = [0u8; 4];
                for (n, slot) in (1u8..=4).zip(bytes.iter_mut()) {
                    self.link.send(&escpos::status_request(n))?;
                    let mut answer = [0u8; 1];
                    self.read_exact(&mut answer, deadline)?;
                    *slot = answer[0];
                }
                Ok(status::parse_escpos(bytes))
            }
        }
    }

    fn read_exact(&mut self, buf: &mut [u8], deadline: Instant) -> Result<(), CometaError> {
        let mut filled = 0;
        while filled < buf.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(CometaError::Timeout(format!(
                    "printer answered {filled} of {} bytes",
                    buf.len()
                )));
            }
            filled += self.link.recv(&mut buf[filled..], remaining)?;
        }
        Ok(())
    }

    /// Read until a NUL terminator or the deadline.
    fn read_terminated(&mut self, deadline: Instant) -> Result<Vec<u8>, CometaError> {
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            self.read_exact(&mut byte, deadline)?;
            if byte[0] == commands::NUL {
                return Ok(out);
            }
            out.push(byte[0]);
        }
    }
}

impl<L: Link> Port for StreamPort<L> {
    fn begin_checked_block(&mut self) -> Result<PrinterStatus, CometaError> {
        self.query_status(self.timeout)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), CometaError> {
        self.link.send(data)
    }

    fn set_end_checked_block_timeout(&mut self, timeout: Duration) {
        self.end_timeout = timeout;
    }

    fn end_checked_block(&mut self) -> Result<PrinterStatus, CometaError> {
        self.query_status(self.end_timeout)
    }

    fn retrieve_status(&mut self) -> Result<PrinterStatus, CometaError> {
        self.query_status(self.timeout)
    }

    fn firmware_information(&mut self) -> Result<FirmwareInfo, CometaError> {
        let deadline = Instant::now() + self.timeout;
        match self.protocol {
            StatusProtocol::StarAsb => {
                self.link.send(&commands::firmware_request())?;
                let raw = self.read_terminated(deadline)?;
                status::parse_firmware(&raw)
            }
            StatusProtocol::EscPos => {
                self.link.send(&escpos::printer_id_request(67))?;
                let model_name = status::parse_escpos_id(&self.read_terminated(deadline)?);
                self.link.send(&escpos::printer_id_request(65))?;
                let firmware_version = status::parse_escpos_id(&self.read_terminated(deadline)?);
                Ok(FirmwareInfo {
                    model_name,
                    firmware_version,
                })
            }
        }
    }

    fn release(&mut self) -> Result<(), CometaError> {
        self.link.close()
    }
}

/// Where a port name points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortAddress {
    Bluetooth(String),
    Usb(String),
    Tcp(String),
}

impl PortAddress {
    pub fn parse(port_name: &str) -> Result<Self, CometaError> {
        let (prefix, rest) = port_name.split_once(':').ok_or_else(|| {
            CometaError::Transport(format!("Unsupported port name: {port_name}"))
        })?;
        let rest = rest.trim();
        match prefix.to_ascii_uppercase().as_str() {
            "BT" | "BLE" => Ok(PortAddress::Bluetooth(rest.to_string())),
            "USB" => Ok(PortAddress::Usb(rest.to_string())),
            "TCP" => Ok(PortAddress::Tcp(rest.to_string())),
            _ => Err(CometaError::Transport(format!(
                "Unsupported port name: {port_name}"
            ))),
        }
    }
}

/// Opens real devices: RFCOMM, USB line printers and TCP sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPortOpener;

impl PortOpener for SystemPortOpener {
    fn open(
        &self,
        port_name: &str,
        settings: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Port>, CometaError> {
        let protocol = StatusProtocol::from_settings(settings);
        tracing::debug!(port = port_name, settings, ?protocol, "opening port");
        match PortAddress::parse(port_name)? {
            PortAddress::Bluetooth(target) => {
                let link = bluetooth::open(&target)?;
                Ok(Box::new(StreamPort::new(link, protocol, timeout)))
            }
            PortAddress::Usb(path) => {
                let link = usb::open(&path)?;
                Ok(Box::new(StreamPort::new(link, protocol, timeout)))
            }
            PortAddress::Tcp(host) => {
                let link = tcp::TcpLink::connect(&host, timeout)?;
                Ok(Box::new(StreamPort::new(link, protocol, timeout)))
            }
        }
    }
}
