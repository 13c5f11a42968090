//! Domain models for the lab KPI engine.

mod period;
mod records;
mod report;

pub use period::*;
pub use records::*;
pub use report::*;
