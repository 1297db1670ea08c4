//! # Persistent Connections
//!
//! A [`ConnectionManager`] keeps at most one port open between calls.
//! Connecting again first releases the current connection. Connect attempts
//! do not race: while one is in flight, a second one fails with
//! [`CometaError::Busy`] instead of interleaving with it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::emulation::{Emulation, EmulationSelector};
use crate::error::CometaError;
use crate::session::PortLease;
use crate::transport::{Port, PortOpener, PrinterStatus};

pub const CONNECTED_MESSAGE: &str = "Printer Connected";

/// What the current connection points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    #[serde(rename = "portName")]
    pub port_name: String,
    pub emulation: Emulation,
    #[serde(rename = "hasBarcodeReader")]
    pub has_barcode_reader: bool,
}

struct Connection {
    info: ConnectionInfo,
    lease: PortLease,
}

pub struct ConnectionManager {
    opener: Arc<dyn PortOpener>,
    config: SessionConfig,
    current: Mutex<Option<Connection>>,
    connecting: AtomicBool,
}

/// Clears the in-flight flag however `connect` returns.
struct ConnectingGuard<'a>(&'a AtomicBool);

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConnectionManager {
    pub fn new(opener: Arc<dyn PortOpener>, config: SessionConfig) -> Self {
        Self {
            opener,
            config,
            current: Mutex::new(None),
            connecting: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open `port_name`, replacing any existing connection.
    pub fn connect(
        &self,
        port_name: &str,
        selector: impl Into<EmulationSelector>,
        has_barcode_reader: bool,
    ) -> Result<String, CometaError> {
        let EmulationSelector {
            emulation,
            port_settings,
        } = selector.into();
        if self.connecting.swap(true, Ordering::AcqRel) {
            return Err(CometaError::Busy(
                "another connect is already in progress".to_string(),
            ));
        }
        let _guard = ConnectingGuard(&self.connecting);

        let previous = self.lock().take();
        if let Some(mut previous) = previous {
            info!(port = %previous.info.port_name, "replacing existing connection");
            if let Err(e) = previous.lease.release() {
                warn!(port = %previous.info.port_name, error = %e, "disconnect failed");
            }
        }

        let port = self
            .opener
            .open(port_name, &port_settings, self.config.open_timeout)
            .map_err(|e| match e {
                CometaError::Transport(_) | CometaError::Timeout(_) => e,
                other => CometaError::Transport(other.to_string()),
            })?;

        *self.lock() = Some(Connection {
            info: ConnectionInfo {
                port_name: port_name.to_string(),
                emulation,
                has_barcode_reader,
            },
            lease: PortLease::new(port),
        });
        info!(port = port_name, %emulation, has_barcode_reader, "printer connected");
        Ok(CONNECTED_MESSAGE.to_string())
    }

    /// Release the current connection.
    pub fn disconnect(&self) -> Result<(), CometaError> {
        let current = self.lock().take();
        let mut connection = current.ok_or(CometaError::NotConnected)?;
        info!(port = %connection.info.port_name, "disconnecting");
        connection.lease.release()
    }

    pub fn info(&self) -> Option<ConnectionInfo> {
        self.lock().as_ref().map(|c| c.info.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.lock().is_some()
    }

    /// Status of the connected printer.
    pub fn status(&self) -> Result<PrinterStatus, CometaError> {
        let mut current = self.lock();
        let connection = current.as_mut().ok_or(CometaError::NotConnected)?;
        connection.lease.retrieve_status()
    }
}
