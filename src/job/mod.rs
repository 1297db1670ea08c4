//! Print jobs: loosely-typed descriptors and the typed commands built from them.

pub mod command;
pub mod descriptor;

pub use command::{BitmapParams, BitmapSource, Placement, PrintCommand, Skip, OPERATION_KEYS};
pub use descriptor::{parse_job, CommandDescriptor, Payload, PrintJob, Value};
