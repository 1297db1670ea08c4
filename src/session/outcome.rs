//! Result records of print sessions and status checks.
//!
//! Both serialize to the JSON shape callers of the printing API expect
//! (`is_success`, `coverOpen`, `error_message`, ...).

use serde::Serialize;
use thiserror::Error;

use super::health;
use crate::transport::{FirmwareInfo, PrinterStatus};

/// Terminal failure of a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Transport failure while printing. `trail` lists every step reached.
    #[error("{message} Failed After {trail}")]
    Port { message: String, trail: String },

    /// Transport failure while checking status.
    #[error("{0}")]
    Status(String),
}

/// A transport error that did not end the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recovered {
    pub step: &'static str,
    pub message: String,
}

/// Outcome of a print session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub is_success: bool,
    pub offline: bool,
    #[serde(rename = "coverOpen")]
    pub cover_open: bool,
    #[serde(rename = "overTemp")]
    pub over_temp: bool,
    #[serde(rename = "cutterError")]
    pub cutter_error: bool,
    #[serde(rename = "receiptPaperEmpty")]
    pub receipt_paper_empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered: Option<Recovered>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_error: Option<String>,
    /// Steps reached, comma terminated.
    #[serde(skip)]
    pub trail: String,
}

impl SessionOutcome {
    /// Result for a job with nothing in it. No port is touched.
    pub fn no_data() -> Self {
        Self {
            is_success: true,
            info_message: Some("No data to print".to_string()),
            ..Default::default()
        }
    }

    /// Take the flags of `status` and judge it. Returns whether it was healthy.
    pub(crate) fn apply(&mut self, status: &PrinterStatus) -> bool {
        self.offline = status.offline;
        self.cover_open = status.cover_open;
        self.over_temp = status.over_temp;
        self.cutter_error = status.cutter_error;
        self.receipt_paper_empty = status.receipt_paper_empty;

        if status.paper_near_empty() {
            self.info_message = Some(health::NEAR_EMPTY_MESSAGE.to_string());
        }
        match health::evaluate(status) {
            Some(fault) => {
                self.error_message = Some(fault.message().to_string());
                false
            }
            None => true,
        }
    }

    pub(crate) fn note_release_failure(&mut self, message: String) {
        if self.error_message.is_none() {
            self.error_message = Some(message.clone());
        }
        self.release_error = Some(message);
    }
}

/// Outcome of a status check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub is_success: bool,
    pub offline: bool,
    #[serde(rename = "coverOpen")]
    pub cover_open: bool,
    #[serde(rename = "overTemp")]
    pub over_temp: bool,
    #[serde(rename = "cutterError")]
    pub cutter_error: bool,
    #[serde(rename = "receiptPaperEmpty")]
    pub receipt_paper_empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(rename = "ModelName", skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(rename = "FirmwareVersion", skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_error: Option<String>,
}

impl StatusReport {
    pub(crate) fn from_status(status: &PrinterStatus) -> Self {
        Self {
            is_success: true,
            offline: status.offline,
            cover_open: status.cover_open,
            over_temp: status.over_temp,
            cutter_error: status.cutter_error,
            receipt_paper_empty: status.receipt_paper_empty,
            ..Default::default()
        }
    }

    pub(crate) fn set_firmware(&mut self, info: FirmwareInfo) {
        self.model_name = Some(info.model_name);
        self.firmware_version = Some(info.firmware_version);
    }

    pub(crate) fn note_release_failure(&mut self, message: String) {
        if self.error_message.is_none() {
            self.error_message = Some(message.clone());
        }
        self.release_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_data_json() {
        let value = serde_json::to_value(SessionOutcome::no_data()).unwrap();
        assert_eq!(
            value,
            json!({
                "is_success": true,
                "offline": false,
                "coverOpen": false,
                "overTemp": false,
                "cutterError": false,
                "receiptPaperEmpty": false,
                "info_message": "No data to print",
            })
        );
    }

    #[test]
    fn test_apply_sets_single_message() {
        let mut outcome = SessionOutcome::default();
        let healthy = outcome.apply(&PrinterStatus {
            cover_open: true,
            receipt_paper_empty: true,
            paper_near_empty_inner: true,
            ..Default::default()
        });
        assert!(!healthy);
        assert_eq!(outcome.error_message.as_deref(), Some("Printer cover is open"));
        assert_eq!(outcome.info_message.as_deref(), Some("Paper near empty"));
    }

    #[test]
    fn test_release_failure_keeps_earlier_error() {
        let mut outcome = SessionOutcome {
            error_message: Some("Paper empty".into()),
            ..Default::default()
        };
        outcome.note_release_failure("close failed".into());
        assert_eq!(outcome.error_message.as_deref(), Some("Paper empty"));
        assert_eq!(outcome.release_error.as_deref(), Some("close failed"));
    }

    #[test]
    fn test_status_report_json_names() {
        let mut report = StatusReport::from_status(&PrinterStatus::default());
        report.set_firmware(FirmwareInfo {
            model_name: "TSP654".into(),
            firmware_version: "2.1".into(),
        });
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ModelName"], "TSP654");
        assert_eq!(value["FirmwareVersion"], "2.1");
        assert!(value.get("error_message").is_none());
    }

    #[test]
    fn test_port_error_display() {
        let err = SessionError::Port {
            message: "Transport error: boom".into(),
            trail: "Port Opened,".into(),
        };
        assert_eq!(err.to_string(), "Transport error: boom Failed After Port Opened,");
    }
}
