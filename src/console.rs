//! Line-oriented console backend used when no input provider or output sink
//! is installed.

use crate::runtime::parser::parse_value;
use crate::runtime::{InputHandle, InputProvider, OutputError, OutputSink};
use crate::value::{DataType, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Reads input lines from stdin and writes output to stdout (or stderr,
/// when stdout is reserved for machine-readable output).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleIo {
    use_stderr: bool,
}

impl ConsoleIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stderr() -> Self {
        Self { use_stderr: true }
    }

    fn emit(&self, text: &str) -> io::Result<()> {
        if self.use_stderr {
            let mut err = io::stderr().lock();
            err.write_all(text.as_bytes())?;
            err.flush()
        } else {
            let mut out = io::stdout().lock();
            out.write_all(text.as_bytes())?;
            out.flush()
        }
    }
}

impl InputProvider for ConsoleIo {
    fn request_input(&self, data_type: DataType, handle: InputHandle) {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => {
                debug!("stdin closed while reading input");
                handle.cancel();
            }
            Ok(_) => match parse_value(&line, data_type) {
                Ok(value) => handle.supply(value),
                Err(e) => {
                    warn!(error = %e, "Rejected console input");
                    handle.cancel();
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to read from stdin");
                handle.cancel();
            }
        }
    }
}

impl OutputSink for ConsoleIo {
    fn write(&self, value: &Value) -> Result<(), OutputError> {
        self.emit(&value.to_string())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), OutputError> {
        self.emit(CLEAR_SCREEN)?;
        Ok(())
    }
}
