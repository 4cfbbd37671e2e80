//! Library lifecycle around a run.
//!
//! Libraries are listed explicitly by the program. Every library is
//! initialized before the body runs and finalized afterwards, whatever the
//! outcome; finalization failures are logged and never replace the run's
//! own result.

use crate::runtime::program::ProgramInfo;
use crate::runtime::worker::panic_message;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Library '{library}' failed: {message}")]
pub struct LibraryError {
    pub library: String,
    pub message: String,
}

impl LibraryError {
    pub fn new(library: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            message: message.into(),
        }
    }
}

/// A capability object a program can include (math, text, files, ...).
pub trait Library: Send + Sync {
    fn name(&self) -> &str;

    /// Called before the program body runs. `libraries` lists every library
    /// attached to the program, this one included.
    fn initialize(
        &self,
        program: &ProgramInfo,
        libraries: &[Arc<dyn Library>],
    ) -> Result<(), LibraryError>;

    /// Called after the run, even when it failed or was interrupted.
    fn finalize(&self) -> Result<(), LibraryError>;
}

pub(crate) fn initialize_all(
    program: &ProgramInfo,
    libraries: &[Arc<dyn Library>],
) -> Result<(), LibraryError> {
    for library in libraries {
        debug!(library = library.name(), "Initializing library");
        match panic::catch_unwind(AssertUnwindSafe(|| library.initialize(program, libraries))) {
            Ok(result) => result?,
            Err(payload) => {
                return Err(LibraryError::new(
                    library.name(),
                    format!("panicked during initialization: {}", panic_message(payload)),
                ))
            }
        }
    }
    Ok(())
}

pub(crate) fn finalize_all(libraries: &[Arc<dyn Library>]) {
    for library in libraries {
        match panic::catch_unwind(AssertUnwindSafe(|| library.finalize())) {
            Ok(Ok(())) => debug!(library = library.name(), "Library finalized"),
            Ok(Err(e)) => error!(library = library.name(), error = %e, "Library finalization failed"),
            Err(_) => error!(library = library.name(), "Library panicked during finalization"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        finalized: AtomicUsize,
        fail: bool,
    }

    impl Library for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn initialize(&self, _: &ProgramInfo, _: &[Arc<dyn Library>]) -> Result<(), LibraryError> {
            if self.fail {
                Err(LibraryError::new("flaky", "init refused"))
            } else {
                Ok(())
            }
        }

        fn finalize(&self) -> Result<(), LibraryError> {
            self.finalized.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                panic!("finalize blew up");
            }
            Ok(())
        }
    }

    #[test]
    fn test_initialize_stops_at_first_failure() {
        let libs: Vec<Arc<dyn Library>> = vec![Arc::new(Flaky {
            finalized: AtomicUsize::new(0),
            fail: true,
        })];
        let err = initialize_all(&ProgramInfo::new("p", 1), &libs).unwrap_err();
        assert_eq!(err.library, "flaky");
    }

    struct Exploding;

    impl Library for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn initialize(&self, _: &ProgramInfo, _: &[Arc<dyn Library>]) -> Result<(), LibraryError> {
            panic!("no device");
        }

        fn finalize(&self) -> Result<(), LibraryError> {
            Ok(())
        }
    }

    #[test]
    fn test_initialize_panic_becomes_error() {
        let libs: Vec<Arc<dyn Library>> = vec![Arc::new(Exploding)];
        let err = initialize_all(&ProgramInfo::new("p", 1), &libs).unwrap_err();
        assert_eq!(err.library, "exploding");
        assert!(err.message.contains("no device"));
    }

    #[test]
    fn test_finalize_swallows_panics() {
        let first = Arc::new(Flaky {
            finalized: AtomicUsize::new(0),
            fail: true,
        });
        let second = Arc::new(Flaky {
            finalized: AtomicUsize::new(0),
            fail: false,
        });
        let libs: Vec<Arc<dyn Library>> = vec![first.clone(), second.clone()];
        finalize_all(&libs);
        assert_eq!(first.finalized.load(Ordering::SeqCst), 1);
        assert_eq!(second.finalized.load(Ordering::SeqCst), 1);
    }
}
