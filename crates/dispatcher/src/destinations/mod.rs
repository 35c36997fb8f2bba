//! Destination implementations
//!
//! Contains ConsoleDestination, FileDestination, and SocketDestination.

mod console;
mod file;
mod socket;

pub use self::console::{ConsoleDestination, ConsoleStream};
pub use self::file::{FileDestination, FileDestinationConfig};
pub use self::socket::{SocketDestination, SocketDestinationConfig, SocketProtocol};
