//! Destination trait - dispatcher output interface
//!
//! Defines the abstract interface for log destinations.

use crate::ContractError;

/// Log output endpoint.
///
/// Destinations are owned by exactly one registry entry and are only ever
/// driven from the dispatch thread, so implementations need `Send` but not
/// `Sync`.
pub trait Destination: Send {
    /// Destination name (used for diagnostics)
    fn name(&self) -> &str;

    /// Write one fully formatted message.
    ///
    /// Must not fail: a destination that cannot write handles that itself
    /// (report it, fall back, or drop the message).
    fn write(&mut self, message: &str);

    /// Flush and release resources.
    ///
    /// Called exactly once by the dispatcher, but must tolerate repeated
    /// calls.
    ///
    /// # Errors
    /// Returns close error (should include context)
    fn close(&mut self) -> Result<(), ContractError>;
}
