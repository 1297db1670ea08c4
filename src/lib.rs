//! # Cometa - Receipt Printer Job Compiler
//!
//! Cometa turns loosely-typed print job descriptors into the byte stream of
//! a Star Micronics or ESC/POS printer, and delivers it through a
//! transactional session that checks printer health before and after the
//! write.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cometa::{CommandDescriptor, Emulation, PrintSession};
//!
//! let job = vec![
//!     CommandDescriptor::new().with("appendAlignment", "Center").with("data", "Hello\n"),
//!     CommandDescriptor::new().with("appendBarcode", "4902720005049").with("BarcodeSymbology", "JAN13"),
//!     CommandDescriptor::new().with("appendCutPaper", "FullCutWithFeed"),
//! ];
//!
//! let outcome = PrintSession::default().print("BT:00:11:62:AA:BB:CC", Emulation::StarPrnt, &job)?;
//! if !outcome.is_success {
//!     eprintln!("{:?}", outcome.error_message);
//! }
//! # Ok::<(), cometa::session::SessionError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`job`] | Descriptors and the typed command union |
//! | [`compiler`] | Descriptor list → IR → bytes |
//! | [`ir`] | Intermediate representation and per-dialect codegen |
//! | [`protocol`] | Star Line, Star Graphic and ESC/POS command builders |
//! | [`render`] | Image decoding, text rasterizing, dithering |
//! | [`encoding`], [`options`], [`emulation`] | Name → value resolvers |
//! | [`transport`] | Ports: Bluetooth, USB, TCP, mock |
//! | [`session`] | Checked-block print sessions and status checks |
//! | [`discovery`] | Port scans and descriptor normalization |
//! | [`connection`] | Persistent connection manager |
//! | [`dispatch`] | Worker pool and completion channel |

pub mod compiler;
pub mod config;
pub mod connection;
pub mod discovery;
pub mod dispatch;
pub mod emulation;
pub mod encoding;
pub mod error;
pub mod ir;
pub mod job;
pub mod options;
pub mod protocol;
pub mod render;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use compiler::{compile, Compiler};
pub use config::SessionConfig;
pub use emulation::{Emulation, EmulationSelector};
pub use error::CometaError;
pub use job::{CommandDescriptor, PrintJob};
pub use session::{PrintSession, SessionOutcome, StatusReport};
