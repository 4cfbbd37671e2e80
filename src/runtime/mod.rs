//! Runtime execution sub-system.
//!
//! Sub-modules:
//! - [`supervisor`]: Controller-facing handle; starts, pauses and stops runs.
//! - [`worker`]: One run on a pooled thread, with fault classification.
//! - [`context`]: Callbacks the program body uses while it runs.
//! - [`input`]: Blocking reads mediated through an input provider.
//! - [`output`]: Output sink contract.
//! - [`library`]: Library initialize/finalize lifecycle.
//! - [`program`]: Program body trait and structural metadata.
//! - [`pool`]: Long-lived worker threads.
//! - [`parser`]: Text to value parsing for console input.
//! - [`result`]: Outcome of a finished run.

pub mod context;
pub mod input;
pub mod library;
pub mod output;
pub mod parser;
pub mod pool;
pub mod program;
pub mod result;
pub mod supervisor;
pub(crate) mod worker;

pub use context::ExecutionContext;
pub use input::{InputHandle, InputProvider};
pub use library::{Library, LibraryError};
pub use output::{OutputError, OutputSink};
pub use pool::WorkerPool;
pub use program::{from_fn, Program, ProgramInfo, WithLibraries};
pub use result::{ExecutionResult, TerminationMode};
pub use supervisor::{Supervisor, SupervisorBuilder};
