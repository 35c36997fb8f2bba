//! ConsoleDestination - writes messages to stdout or stderr

use contracts::{ContractError, Destination};
use std::collections::HashMap;
use std::io::{self, Write};
use tracing::{debug, warn};

/// Which standard stream to write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

impl ConsoleStream {
    /// Parse the `stream` property; anything but `stderr` means stdout
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        match params.get("stream").map(String::as_str) {
            Some("stderr") => Self::Stderr,
            _ => Self::Stdout,
        }
    }
}

/// Destination printing one line per message
pub struct ConsoleDestination {
    name: String,
    stream: ConsoleStream,
}

impl ConsoleDestination {
    /// Create a new ConsoleDestination
    pub fn new(name: impl Into<String>, stream: ConsoleStream) -> Self {
        Self {
            name: name.into(),
            stream,
        }
    }

    /// Create from properties (for factory)
    pub fn from_params(name: impl Into<String>, params: &HashMap<String, String>) -> Self {
        Self::new(name, ConsoleStream::from_params(params))
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    fn emit(&self, message: &str) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => writeln!(io::stdout().lock(), "{message}"),
            ConsoleStream::Stderr => writeln!(io::stderr().lock(), "{message}"),
        }
    }
}

impl Destination for ConsoleDestination {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, message: &str) {
        if let Err(e) = self.emit(message) {
            warn!(destination = %self.name, error = %e, "Console write failed");
        }
    }

    fn close(&mut self) -> Result<(), ContractError> {
        let flushed = match self.stream {
            ConsoleStream::Stdout => io::stdout().flush(),
            ConsoleStream::Stderr => io::stderr().flush(),
        };
        flushed.map_err(|e| ContractError::destination_close(&self.name, e.to_string()))?;
        debug!(destination = %self.name, "ConsoleDestination closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_from_params() {
        let mut params = HashMap::new();
        assert_eq!(ConsoleStream::from_params(&params), ConsoleStream::Stdout);

        params.insert("stream".to_string(), "stderr".to_string());
        let dest = ConsoleDestination::from_params("stderr", &params);
        assert_eq!(dest.stream(), ConsoleStream::Stderr);
        assert_eq!(dest.name(), "stderr");
    }

    #[test]
    fn test_console_close_twice() {
        let mut dest = ConsoleDestination::new("console", ConsoleStream::Stderr);
        dest.write("console destination test line");
        assert!(dest.close().is_ok());
        assert!(dest.close().is_ok());
    }
}
