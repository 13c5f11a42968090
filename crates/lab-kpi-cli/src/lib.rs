//! Command-line front end for the lab KPI engine.
//!
//! Reads a JSON compute request, loads the KPI config once, and prints the
//! metrics report as JSON on stdout. Logs go to stderr.

pub mod commands;
pub mod logging;
pub mod request;

pub use commands::{CommandError, CommandResult};
pub use request::{parse_compute_request, read_request, ComputeRequest, RequestError};
