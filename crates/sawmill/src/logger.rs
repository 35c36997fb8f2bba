//! Logger - the synchronous facade over a dispatcher
//!
//! Every call shape ends in [`Logger::submit`], which captures the call site,
//! stamps the record and hands it to the dispatcher without waiting.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use config_loader::ConfigLoader;
use contracts::{Extra, Formatter, Level, LogRecord};
use dispatcher::{
    create_dispatcher, create_entries, DispatchHandle, DispatcherConfig, MetricsSnapshot,
    RegistryEntry,
};
use tracing::{debug, info};

use crate::callsite::{BacktraceResolver, Capturer, FrameResolver};
use crate::error::{LogError, SawmillError};
use crate::hostname::system_hostname;

/// Frames between [`Logger::submit`] and user code for the level methods
pub const DEFAULT_FILE_DEPTH: usize = 1;

/// Frames between [`Logger::submit`] and user code for the `io::Write`
/// adapter, assuming the caller goes through `write_all`
pub const WRITER_DEPTH: usize = 2;

/// A logger instance owning one dispatcher.
///
/// Dropping the logger closes it. Use [`crate::global`] for the process-wide
/// instance.
pub struct Logger {
    handle: DispatchHandle,
    capturer: Capturer,
    host_name: String,
    file_depth: usize,
}

/// Builder for [`Logger`]
#[derive(Default)]
pub struct LoggerBuilder {
    config: DispatcherConfig,
    resolver: Option<Arc<dyn FrameResolver>>,
    host_name: Option<Box<dyn FnOnce() -> String>>,
    file_depth: Option<usize>,
}

impl LoggerBuilder {
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_queue_capacity(capacity);
        self
    }

    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_thread_name(name);
        self
    }

    /// Replace the stack walker used for call-site capture
    pub fn resolver(mut self, resolver: Arc<dyn FrameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Fixed host name instead of detecting it
    pub fn hostname(self, host_name: impl Into<String>) -> Self {
        let host_name = host_name.into();
        self.hostname_provider(move || host_name)
    }

    /// Function called once at build time to look up the host name.
    /// Defaults to [`system_hostname`].
    pub fn hostname_provider(mut self, provider: impl FnOnce() -> String + 'static) -> Self {
        self.host_name = Some(Box::new(provider));
        self
    }

    /// Extra frames to skip in the level methods, for wrappers around the logger
    pub fn file_depth(mut self, depth: usize) -> Self {
        self.file_depth = Some(depth);
        self
    }

    pub fn build(self) -> Logger {
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(BacktraceResolver));
        let host_name = match self.host_name {
            Some(provider) => provider(),
            None => system_hostname(),
        };

        debug!(
            host_name = %host_name,
            queue_capacity = self.config.queue_capacity,
            "Logger created"
        );

        Logger {
            handle: create_dispatcher(&self.config),
            capturer: Capturer::new(resolver),
            host_name,
            file_depth: self.file_depth.unwrap_or(DEFAULT_FILE_DEPTH),
        }
    }
}

macro_rules! level_methods {
    ($($name:ident, $name_ex:ident => $level:expr;)+) => {$(
        #[doc = concat!("Log at `", stringify!($level), "`")]
        #[inline(never)]
        pub fn $name(&self, args: fmt::Arguments<'_>) {
            self.submit($level, None, args.to_string(), self.file_depth);
        }

        #[doc = concat!("Log at `", stringify!($level), "` with extra fields")]
        #[inline(never)]
        pub fn $name_ex(&self, extra: Extra, args: fmt::Arguments<'_>) {
            self.submit($level, Some(extra), args.to_string(), self.file_depth);
        }
    )+};
}

macro_rules! error_level_methods {
    ($($name:ident, $name_ex:ident => $level:expr;)+) => {$(
        #[doc = concat!("Log at `", stringify!($level), "` and return the message as an error")]
        #[inline(never)]
        pub fn $name(&self, args: fmt::Arguments<'_>) -> LogError {
            let message = args.to_string();
            self.submit($level, None, message.clone(), self.file_depth);
            LogError::new($level, message)
        }

        #[inline(never)]
        pub fn $name_ex(&self, extra: Extra, args: fmt::Arguments<'_>) -> LogError {
            let message = args.to_string();
            self.submit($level, Some(extra), message.clone(), self.file_depth);
            LogError::new($level, message)
        }
    )+};
}

impl Logger {
    /// Logger with a detected host name and the backtrace resolver
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// The underlying dispatcher handle, for async control operations
    pub fn handle(&self) -> &DispatchHandle {
        &self.handle
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.handle.metrics()
    }

    /// Build and submit one record.
    ///
    /// `depth` counts frames above the caller of this method: 0 attributes
    /// the record to whoever called `submit`. Records are dropped silently
    /// once the logger is closed or while the queue is full.
    #[inline(never)]
    pub fn submit(&self, level: Level, extra: Option<Extra>, message: String, depth: usize) {
        if self.handle.is_closed() {
            return;
        }

        let site = self.capturer.capture(depth + 1);
        let mut record = LogRecord::new(level, message)
            .at(site)
            .with_host_name(self.host_name.as_str());
        if let Some(extra) = extra {
            record = record.with_extra(extra);
        }
        self.handle.submit(record);
    }

    level_methods! {
        finest, finest_ex => Level::Finest;
        fine, fine_ex => Level::Fine;
        debug, debug_ex => Level::Debug;
        trace, trace_ex => Level::Trace;
        info, info_ex => Level::Info;
    }

    error_level_methods! {
        warn, warn_ex => Level::Warning;
        error, error_ex => Level::Error;
        critical, critical_ex => Level::Critical;
    }

    /// Log at an arbitrary level
    #[inline(never)]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.submit(level, None, args.to_string(), self.file_depth);
    }

    #[inline(never)]
    pub fn log_ex(&self, level: Level, extra: Extra, args: fmt::Arguments<'_>) {
        self.submit(level, Some(extra), args.to_string(), self.file_depth);
    }

    /// Log at `Debug`
    #[inline(never)]
    pub fn print(&self, args: fmt::Arguments<'_>) {
        self.submit(Level::Debug, None, args.to_string(), self.file_depth);
    }

    /// Log at `Debug` with a trailing newline
    #[inline(never)]
    pub fn println(&self, args: fmt::Arguments<'_>) {
        self.submit(Level::Debug, None, format!("{args}\n"), self.file_depth);
    }

    /// Log at `Critical`, then panic with the same message.
    ///
    /// The logger stays open; queued records are delivered as long as the
    /// process keeps running.
    #[inline(never)]
    pub fn panic(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        self.submit(Level::Critical, None, message.clone(), self.file_depth);
        panic!("{message}")
    }

    #[inline(never)]
    pub fn panicln(&self, args: fmt::Arguments<'_>) -> ! {
        let message = format!("{args}\n");
        self.submit(Level::Critical, None, message.clone(), self.file_depth);
        panic!("{message}")
    }

    /// Log at `Critical`, close the logger and exit the process with status 1
    #[inline(never)]
    pub fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
        self.submit(Level::Critical, None, args.to_string(), self.file_depth);
        self.close();
        std::process::exit(1)
    }

    #[inline(never)]
    pub fn fatalln(&self, args: fmt::Arguments<'_>) -> ! {
        self.submit(Level::Critical, None, format!("{args}\n"), self.file_depth);
        self.close();
        std::process::exit(1)
    }

    /// Register a destination; returns its stable index
    pub fn add_entry(&self, entry: RegistryEntry) -> Result<usize, SawmillError> {
        Ok(self.handle.add_entry_blocking(entry)?)
    }

    /// Swap the entry at `index`, closing the old destination
    pub fn replace_entry(&self, index: usize, entry: RegistryEntry) -> Result<(), SawmillError> {
        Ok(self.handle.replace_entry_blocking(index, entry)?)
    }

    pub fn set_level(&self, index: usize, level: Level) -> Result<(), SawmillError> {
        Ok(self.handle.set_level_blocking(index, level)?)
    }

    pub fn set_formatter(
        &self,
        index: usize,
        formatter: impl Formatter + 'static,
    ) -> Result<(), SawmillError> {
        Ok(self
            .handle
            .set_formatter_blocking(index, Arc::new(formatter))?)
    }

    /// Add every enabled filter of a configuration file.
    ///
    /// All destinations are created before any is registered, so a bad
    /// filter leaves the logger unchanged.
    pub fn load_configuration(&self, path: impl AsRef<Path>) -> Result<Vec<usize>, SawmillError> {
        let path = path.as_ref();
        let blueprint = ConfigLoader::load_from_path(path)?;
        let entries = create_entries(&blueprint)?;

        let indices = entries
            .into_iter()
            .map(|entry| self.add_entry(entry))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            path = %path.display(),
            entries = indices.len(),
            "Logging configuration applied"
        );
        Ok(indices)
    }

    /// Stop accepting records, deliver what is queued and close every
    /// destination. Returns once that is done; later calls return at once.
    pub fn close(&self) {
        self.handle.close_blocking();
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("host_name", &self.host_name)
            .field("file_depth", &self.file_depth)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Each `write` call is one `Info` record with surrounding whitespace trimmed.
///
/// Meant for line-oriented producers; `write!` splits its output into several
/// writes and therefore several records.
impl io::Write for &Logger {
    #[inline(never)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.submit(Level::Info, None, text.trim().to_string(), WRITER_DEPTH);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Write for Logger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
