//! # Print Sessions
//!
//! A session owns one port for the duration of one call.
//!
//! ```text
//! open ──► settle ──► begin checked block ──► healthy? ──no──► release
//!                                               │
//!                                              yes
//!                                               ▼
//!                       write ──► end checked block ──► re-check ──► release
//! ```
//!
//! Each step reached is appended to a diagnostic trail. When a transport
//! error ends the session, the error carries the trail so the caller can
//! see how far it got. The port is released exactly once on every path.
//!
//! A failing end checked block does not end the session: the bytes are
//! already written, so the error is recorded as [`Recovered`] and the last
//! status obtained is judged again.

mod health;
mod lease;
mod outcome;

use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

pub use health::{evaluate, Fault};
pub use lease::PortLease;
pub use outcome::{Recovered, SessionError, SessionOutcome, StatusReport};

use crate::compiler::Compiler;
use crate::config::SessionConfig;
use crate::emulation::EmulationSelector;
use crate::error::CometaError;
use crate::job::CommandDescriptor;
use crate::transport::{Port, PortOpener, SystemPortOpener};

/// Comma-terminated list of the steps a session reached.
#[derive(Debug, Default)]
struct Trail(String);

impl Trail {
    fn mark(&mut self, step: &str) {
        debug!(step, "session step");
        self.0.push_str(step);
        self.0.push(',');
    }
}

/// Runs print jobs and status checks against ports from a [`PortOpener`].
#[derive(Clone)]
pub struct PrintSession {
    opener: Arc<dyn PortOpener>,
    compiler: Compiler,
    config: SessionConfig,
}

impl Default for PrintSession {
    fn default() -> Self {
        Self::new(Arc::new(SystemPortOpener))
    }
}

impl PrintSession {
    pub fn new(opener: Arc<dyn PortOpener>) -> Self {
        Self {
            opener,
            compiler: Compiler::default(),
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Compile `job` for the selected emulation and print it on `port_name`.
    ///
    /// An empty job succeeds immediately without opening the port.
    pub fn print(
        &self,
        port_name: &str,
        selector: impl Into<EmulationSelector>,
        job: &[CommandDescriptor],
    ) -> Result<SessionOutcome, SessionError> {
        if job.is_empty() {
            return Ok(SessionOutcome::no_data());
        }
        let selector = selector.into();
        let bytes = self.compiler.compile(job, selector.emulation);
        self.send(port_name, &selector.port_settings, &bytes)
    }

    /// Run the checked block protocol around an already compiled stream.
    pub fn send(
        &self,
        port_name: &str,
        settings: &str,
        bytes: &[u8],
    ) -> Result<SessionOutcome, SessionError> {
        let mut trail = Trail::default();
        let port = self
            .opener
            .open(port_name, settings, self.config.open_timeout)
            .map_err(|e| SessionError::Port {
                message: e.to_string(),
                trail: String::new(),
            })?;
        let mut lease = PortLease::new(port);
        trail.mark("Port Opened");

        let body = self.checked_write(&mut lease, bytes, &mut trail);
        let released = lease.release();

        match body {
            Ok(mut outcome) => {
                if let Err(e) = released {
                    warn!(port = port_name, error = %e, "release failed");
                    outcome.note_release_failure(e.to_string());
                }
                outcome.trail = trail.0;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(release) = released {
                    warn!(port = port_name, error = %release, "release failed after error");
                }
                Err(SessionError::Port {
                    message: e.to_string(),
                    trail: trail.0,
                })
            }
        }
    }

    fn checked_write(
        &self,
        lease: &mut PortLease,
        bytes: &[u8],
        trail: &mut Trail,
    ) -> Result<SessionOutcome, CometaError> {
        settle(self.config.print_settle);

        let mut status = lease.begin_checked_block()?;
        trail.mark("got status for begin Check");

        let mut outcome = SessionOutcome::default();
        let mut healthy = outcome.apply(&status);

        if healthy {
            trail.mark("Writing to port");
            lease.write(bytes)?;
            trail.mark("setting delay End check block");
            lease.set_end_checked_block_timeout(self.config.end_check_timeout);
            trail.mark("doing End check block");

            match lease.end_checked_block() {
                Ok(end) => status = end,
                Err(e) => {
                    warn!(error = %e, "end checked block failed after write");
                    trail.mark(&format!("End check block exception {e}"));
                    outcome.recovered = Some(Recovered {
                        step: "end_checked_block",
                        message: e.to_string(),
                    });
                }
            }
            healthy = outcome.apply(&status);
        } else {
            debug!(?status, "printer not ready, nothing written");
        }

        outcome.is_success = healthy;
        Ok(outcome)
    }

    /// Query status and firmware of `port_name` without printing.
    ///
    /// A firmware query failure is reported in `error_message`, not as an
    /// error.
    pub fn check_status(
        &self,
        port_name: &str,
        selector: impl Into<EmulationSelector>,
    ) -> Result<StatusReport, SessionError> {
        let selector = selector.into();
        let port = self
            .opener
            .open(port_name, &selector.port_settings, self.config.open_timeout)
            .map_err(|e| SessionError::Status(e.to_string()))?;
        let mut lease = PortLease::new(port);
        settle(self.config.status_settle);

        let body = lease.retrieve_status().map(|status| {
            let mut report = StatusReport::from_status(&status);
            match lease.firmware_information() {
                Ok(info) => report.set_firmware(info),
                Err(e) => {
                    debug!(error = %e, "firmware query failed");
                    report.error_message = Some(e.to_string());
                }
            }
            report
        });
        let released = lease.release();

        let mut report = body.map_err(|e| SessionError::Status(e.to_string()))?;
        if let Err(e) = released {
            warn!(port = port_name, error = %e, "release failed");
            report.note_release_failure(e.to_string());
        }
        Ok(report)
    }
}

fn settle(delay: std::time::Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
