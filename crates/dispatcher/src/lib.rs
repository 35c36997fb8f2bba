//! # Dispatcher
//!
//! The sequential dispatch actor.
//!
//! Responsibilities:
//! - Own the registry of configured destinations
//! - Apply control operations (add / replace / set / close) in arrival order
//! - Fan each record out to the entries whose threshold it passes
//! - Drain queued records and close every destination exactly once on shutdown

pub mod destinations;
pub mod dispatcher;
pub mod entry;
pub mod error;
pub mod fanout;
pub mod formatters;
pub mod handle;
pub mod metrics;

pub use contracts::{Destination, Formatter, Level, LogRecord};
pub use dispatcher::{
    create_dispatcher, create_entries, create_entry, Dispatcher, DispatcherConfig,
    DEFAULT_QUEUE_CAPACITY,
};
pub use entry::RegistryEntry;
pub use error::DispatchError;
pub use handle::DispatchHandle;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use destinations::{ConsoleDestination, FileDestination, SocketDestination};
pub use formatters::{JsonFormatter, PatternFormatter};
