//! # Scripted Mock Port
//!
//! A [`Port`]/[`PortOpener`] pair driven by a [`MockScript`]. Every call is
//! recorded in a shared [`MockLog`], so sessions can be exercised without
//! hardware.
//!
//! ```
//! use cometa::transport::mock::{MockOpener, MockScript};
//! use cometa::transport::{Port, PortOpener, PrinterStatus};
//! use std::time::Duration;
//!
//! let opener = MockOpener::new(MockScript {
//!     begin: PrinterStatus { cover_open: true, ..Default::default() },
//!     ..Default::default()
//! });
//! let mut port = opener.open("BT:00:11:62:00:00:01", "Portable;l", Duration::from_secs(1))?;
//! assert!(port.begin_checked_block()?.cover_open);
//! port.release()?;
//! assert_eq!(opener.log().releases, 1);
//! # Ok::<(), cometa::CometaError>(())
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{FirmwareInfo, Port, PortOpener, PrinterStatus};
use crate::error::CometaError;

/// What the mock port answers. A `fail_*` message turns that call into a
/// transport error.
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    pub begin: PrinterStatus,
    pub end: PrinterStatus,
    pub firmware: FirmwareInfo,
    pub fail_open: Option<String>,
    pub fail_begin: Option<String>,
    pub fail_write: Option<String>,
    pub fail_end: Option<String>,
    pub fail_status: Option<String>,
    pub fail_firmware: Option<String>,
    pub fail_release: Option<String>,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Open {
        port_name: String,
        settings: String,
        timeout: Duration,
    },
    BeginCheckedBlock,
    Write(usize),
    SetEndTimeout(Duration),
    EndCheckedBlock,
    RetrieveStatus,
    FirmwareInformation,
    Release,
}

#[derive(Debug, Clone, Default)]
pub struct MockLog {
    pub calls: Vec<MockCall>,
    pub written: Vec<u8>,
    pub opens: usize,
    pub releases: usize,
}

fn lock(log: &Mutex<MockLog>) -> MutexGuard<'_, MockLog> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn scripted(failure: &Option<String>) -> Result<(), CometaError> {
    match failure {
        Some(message) => Err(CometaError::Transport(message.clone())),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockOpener {
    script: MockScript,
    log: Arc<Mutex<MockLog>>,
}

impl MockOpener {
    pub fn new(script: MockScript) -> Self {
        Self {
            script,
            log: Arc::default(),
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn log(&self) -> MockLog {
        lock(&self.log).clone()
    }
}

impl PortOpener for MockOpener {
    fn open(
        &self,
        port_name: &str,
        settings: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Port>, CometaError> {
        {
            let mut log = lock(&self.log);
            log.calls.push(MockCall::Open {
                port_name: port_name.to_string(),
                settings: settings.to_string(),
                timeout,
            });
        }
        scripted(&self.script.fail_open)?;
        lock(&self.log).opens += 1;
        Ok(Box::new(MockPort {
            script: self.script.clone(),
            log: Arc::clone(&self.log),
        }))
    }
}

#[derive(Debug)]
pub struct MockPort {
    script: MockScript,
    log: Arc<Mutex<MockLog>>,
}

impl MockPort {
    fn record(&self, call: MockCall) {
        lock(&self.log).calls.push(call);
    }
}

impl Port for MockPort {
    fn begin_checked_block(&mut self) -> Result<PrinterStatus, CometaError> {
        self.record(MockCall::BeginCheckedBlock);
        scripted(&self.script.fail_begin)?;
        Ok(self.script.begin)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), CometaError> {
        self.record(MockCall::Write(data.len()));
        scripted(&self.script.fail_write)?;
        lock(&self.log).written.extend_from_slice(data);
        Ok(())
    }

    fn set_end_checked_block_timeout(&mut self, timeout: Duration) {
        self.record(MockCall::SetEndTimeout(timeout));
    }

    fn end_checked_block(&mut self) -> Result<PrinterStatus, CometaError> {
        self.record(MockCall::EndCheckedBlock);
        scripted(&self.script.fail_end)?;
        Ok(self.script.end)
    }

    fn retrieve_status(&mut self) -> Result<PrinterStatus, CometaError> {
        self.record(MockCall::RetrieveStatus);
        scripted(&self.script.fail_status)?;
        Ok(self.script.begin)
    }

    fn firmware_information(&mut self) -> Result<FirmwareInfo, CometaError> {
        self.record(MockCall::FirmwareInformation);
        scripted(&self.script.fail_firmware)?;
        Ok(self.script.firmware.clone())
    }

    fn release(&mut self) -> Result<(), CometaError> {
        {
            let mut log = lock(&self.log);
            log.calls.push(MockCall::Release);
            log.releases += 1;
        }
        scripted(&self.script.fail_release)
    }
}
