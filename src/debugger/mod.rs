//! Debugging state: breakpoints, debug mode and run observers.

pub mod breakpoint;
pub mod observer;

pub use breakpoint::{BreakpointTable, DebugMode};
pub use observer::{ExecutionObserver, ObserverSet};
