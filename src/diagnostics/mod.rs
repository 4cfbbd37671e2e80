//! Fault classification and positioned diagnostics.
//!
//! Sub-modules:
//! - [`fault`]: Faults a program body can raise.
//! - [`diagnostic`]: The positioned error reported to the controller.
//! - [`translator`]: Immutable fault-class → diagnostic lookup table.

pub mod diagnostic;
pub mod fault;
pub mod translator;

pub use diagnostic::{DiagnosticError, DiagnosticKind};
pub use fault::{Fault, FaultClass, RuntimeFault};
pub use translator::{Translator, TranslatorRegistry, TranslatorRegistryBuilder};
