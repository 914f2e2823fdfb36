//! Logging for docqa.
//!
//! - [`init_telemetry`] / [`init_json_telemetry`] install the global
//!   subscriber used by the `docqa` binary
//! - [`CapturedEvents`] records events in memory so tests can assert on them

mod capture;
mod init;

pub use capture::{CaptureLayer, CapturedEvent, CapturedEvents, capture_events};
pub use init::{init_json_telemetry, init_telemetry};
