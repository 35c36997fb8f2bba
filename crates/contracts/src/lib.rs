//! # Contracts
//!
//! Frozen interface contracts shared by every sawmill crate: the severity
//! taxonomy, the log record, the two capability traits implemented by
//! destinations and formatters, and the configuration blueprint.
//! Business crates depend on this crate, never the other way around.
//!
//! ## Time Model
//! - Record timestamps are UTC wall-clock time truncated to microseconds
//! - Ordering between records is queue order, not timestamp order

mod blueprint;
mod destination;
mod error;
mod formatter;
mod level;
mod record;

pub use blueprint::*;
pub use destination::Destination;
pub use error::*;
pub use formatter::Formatter;
pub use level::{Level, LEVEL_CODES, LEVEL_NAMES};
pub use record::*;
