//! RegistryEntry - one configured destination

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use contracts::{Destination, Formatter, Level};

/// A destination bundled with its threshold, formatter and granular overrides.
///
/// Entries are handed to the dispatcher by value and only ever touched by the
/// dispatch thread afterwards.
pub struct RegistryEntry {
    /// Where formatted output goes
    pub destination: Box<dyn Destination>,
    /// Default threshold
    pub level: Level,
    /// Renderer; may be shared with other entries
    pub formatter: Arc<dyn Formatter>,
    /// Exact function / method / module path → threshold
    pub granulars: HashMap<String, Level>,
}

impl RegistryEntry {
    /// Create an entry without granular overrides
    pub fn new<D, F>(destination: D, level: Level, formatter: F) -> Self
    where
        D: Destination + 'static,
        F: Formatter + 'static,
    {
        Self::from_parts(Box::new(destination), level, Arc::new(formatter))
    }

    /// Create an entry from already boxed / shared parts
    pub fn from_parts(
        destination: Box<dyn Destination>,
        level: Level,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            destination,
            level,
            formatter,
            granulars: HashMap::new(),
        }
    }

    /// Builder-style method for adding one granular override
    pub fn with_granular(mut self, path: impl Into<String>, level: Level) -> Self {
        self.granulars.insert(path.into(), level);
        self
    }

    /// Builder-style method for replacing all granular overrides
    pub fn with_granulars(mut self, granulars: HashMap<String, Level>) -> Self {
        self.granulars = granulars;
        self
    }

    /// Destination name
    pub fn name(&self) -> &str {
        self.destination.name()
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("destination", &self.destination.name())
            .field("level", &self.level)
            .field("granulars", &self.granulars)
            .finish_non_exhaustive()
    }
}
