use crate::diagnostics::Fault;
use crate::runtime::context::ExecutionContext;
use crate::runtime::library::Library;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Structural data about a compiled program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramInfo {
    pub name: String,
    /// Number of source lines; sizes the breakpoint table.
    pub line_count: usize,
    /// Functions declared in the program, in declaration order.
    pub functions: Vec<String>,
    /// The function where execution starts.
    pub entry_function: String,
    pub source_file: Option<PathBuf>,
}

impl ProgramInfo {
    pub fn new(name: impl Into<String>, line_count: usize) -> Self {
        Self {
            name: name.into(),
            line_count,
            functions: Vec::new(),
            entry_function: "main".to_string(),
            source_file: None,
        }
    }

    pub fn with_functions<I, S>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions = functions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_entry_function(mut self, entry: impl Into<String>) -> Self {
        self.entry_function = entry.into();
        self
    }

    pub fn with_source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = Some(path.into());
        self
    }
}

/// The executable body of a compiled program.
///
/// Generated code implements this trait. The body reports every pausable
/// position through [`ExecutionContext::pause_point`], reads input through
/// the context's `read*` methods and writes output through
/// [`ExecutionContext::write`].
pub trait Program: Send + Sync {
    fn execute(&self, ctx: &mut ExecutionContext, args: &[String]) -> Result<(), Fault>;

    /// Libraries attached to this program when it was generated.
    fn libraries(&self) -> &[Arc<dyn Library>] {
        &[]
    }
}

impl<F> Program for F
where
    F: Fn(&mut ExecutionContext, &[String]) -> Result<(), Fault> + Send + Sync,
{
    fn execute(&self, ctx: &mut ExecutionContext, args: &[String]) -> Result<(), Fault> {
        self(ctx, args)
    }
}

/// Use a closure as a program body, with its argument types inferred.
pub fn from_fn<F>(body: F) -> F
where
    F: Fn(&mut ExecutionContext, &[String]) -> Result<(), Fault> + Send + Sync,
{
    body
}

/// A program body bundled with the libraries it includes.
pub struct WithLibraries<P> {
    body: P,
    libraries: Vec<Arc<dyn Library>>,
}

impl<P: Program> WithLibraries<P> {
    pub fn new(body: P, libraries: Vec<Arc<dyn Library>>) -> Self {
        Self { body, libraries }
    }
}

impl<P: Program> Program for WithLibraries<P> {
    fn execute(&self, ctx: &mut ExecutionContext, args: &[String]) -> Result<(), Fault> {
        self.body.execute(ctx, args)
    }

    fn libraries(&self) -> &[Arc<dyn Library>] {
        &self.libraries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_info_builders() {
        let info = ProgramInfo::new("game", 40)
            .with_functions(["start", "draw"])
            .with_entry_function("start")
            .with_source_file("game.step");
        assert_eq!(info.entry_function, "start");
        assert_eq!(info.functions, vec!["start", "draw"]);
        assert_eq!(info.source_file, Some(PathBuf::from("game.step")));
        assert_eq!(ProgramInfo::new("plain", 1).entry_function, "main");
    }
}
