//! Execution control for a teaching-language runtime.
//!
//! A [`Supervisor`](runtime::Supervisor) owns one compiled program and runs
//! it on a pooled worker thread. While a run is active the supervisor can
//! pause it at breakpoints or step by step, feed it input through an
//! [`InputProvider`](runtime::InputProvider), interrupt it, and expose a live
//! [`InspectionSnapshot`](inspector::InspectionSnapshot) of selected values.
//! Every run ends with exactly one [`ExecutionResult`](runtime::ExecutionResult)
//! delivered to the registered observers.

pub mod cli;
pub mod config;
pub mod console;
pub mod debugger;
pub mod demos;
pub mod diagnostics;
pub mod error;
pub mod inspector;
pub mod protocol;
pub mod runtime;
pub mod value;

pub use error::{Result, RuntimeError};
