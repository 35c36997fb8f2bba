//! # Sawmill
//!
//! Leveled logging with an asynchronous dispatcher.
//!
//! Logging calls capture their call site, build a [`LogRecord`] and enqueue it
//! without waiting. A single dispatcher thread fans each record out to the
//! registered destinations whose threshold it passes.
//!
//! ```no_run
//! use sawmill::{ConsoleDestination, ConsoleStream, Level, Logger, PatternFormatter, RegistryEntry};
//!
//! let logger = Logger::new();
//! logger
//!     .add_entry(RegistryEntry::new(
//!         ConsoleDestination::new("stdout", ConsoleStream::Stdout),
//!         Level::Info,
//!         PatternFormatter::default(),
//!     ))
//!     .unwrap();
//!
//! sawmill::info!(logger: &logger, "started on port {}", 8080);
//! logger.close();
//! ```

mod callsite;
mod error;
mod hostname;
mod logger;
mod macros;

use std::sync::LazyLock;

pub use callsite::{parse_function_path, BacktraceResolver, Capturer, Frame, FrameResolver};
pub use contracts::{CallSite, Destination, Extra, Formatter, Level, LogRecord};
pub use dispatcher::destinations::ConsoleStream;
pub use dispatcher::{
    ConsoleDestination, DispatchError, DispatchHandle, FileDestination, JsonFormatter,
    MetricsSnapshot, PatternFormatter, RegistryEntry, SocketDestination,
};
pub use error::{LogError, SawmillError};
pub use hostname::system_hostname;
pub use logger::{Logger, LoggerBuilder, DEFAULT_FILE_DEPTH, WRITER_DEPTH};

static GLOBAL: LazyLock<Logger> = LazyLock::new(Logger::new);

/// The process-wide logger used by the macros when no `logger:` is given.
///
/// Created on first use with no destinations; it is never dropped, so call
/// `global().close()` before exit to flush it.
pub fn global() -> &'static Logger {
    &GLOBAL
}
