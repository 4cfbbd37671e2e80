//! Inspection of program values for a debugger UI.

pub mod snapshot;

pub use snapshot::{Inspected, InspectionSnapshot};
