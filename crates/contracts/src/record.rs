//! LogRecord - the immutable value produced per logging call

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::ser::{Error as _, SerializeMap};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::Level;

/// Marker used for call-site fields that could not be resolved
pub const UNRESOLVED: &str = "_";

/// A value that can ride along in [`Extra`].
///
/// Blanket-implemented for every `Serialize + Debug` type, so callers can put
/// strings, numbers, maps or their own structs in there. Conversion may fail
/// (e.g. a map with non-string keys); formatters deal with that.
pub trait FieldValue: fmt::Debug + Send + Sync {
    /// Convert to a JSON value
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<T> FieldValue for T
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Structured extra fields attached to a record
#[derive(Clone, Default)]
pub struct Extra(BTreeMap<String, Arc<dyn FieldValue>>);

impl Extra {
    /// Empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl FieldValue + 'static) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite a field
    pub fn insert(&mut self, key: impl Into<String>, value: impl FieldValue + 'static) {
        self.0.insert(key.into(), Arc::new(value));
    }

    pub fn get(&self, key: &str) -> Option<&dyn FieldValue> {
        self.0.get(key).map(|value| value.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

impl fmt::Debug for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl Serialize for Extra {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            let json = value
                .to_json()
                .map_err(|e| S::Error::custom(format!("extra field '{key}': {e}")))?;
            map.serialize_entry(key, &json)?;
        }
        map.end()
    }
}

impl<K, V> FromIterator<(K, V)> for Extra
where
    K: Into<String>,
    V: FieldValue + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut extra = Extra::new();
        for (key, value) in iter {
            extra.insert(key, value);
        }
        extra
    }
}

/// Where a record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    /// Fully qualified function identity
    pub func_path: String,
    /// Type-qualified method identity; empty when not called from a method
    pub method_path: String,
    /// Module identity
    pub package_path: String,
}

impl CallSite {
    /// The sentinel call site used when no frame could be resolved
    pub fn unresolved() -> Self {
        Self {
            file: UNRESOLVED.to_string(),
            line: 0,
            func_path: UNRESOLVED.to_string(),
            method_path: UNRESOLVED.to_string(),
            package_path: UNRESOLVED.to_string(),
        }
    }
}

impl Default for CallSite {
    fn default() -> Self {
        Self::unresolved()
    }
}

/// One log event, fully rendered.
///
/// Serializes to the JSON wire shape consumed by log collectors; the key
/// names are part of that contract.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    #[serde(rename = "Level")]
    pub level: Level,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "SourceFile")]
    pub source_file: String,
    #[serde(rename = "SourceLine")]
    pub source_line: u32,
    pub message: String,
    #[serde(rename = "FuncPath")]
    pub func_path: String,
    #[serde(rename = "MethodPath")]
    pub method_path: String,
    #[serde(rename = "PackagePath")]
    pub package_path: String,
    #[serde(rename = "HostName")]
    pub host_name: String,
    #[serde(skip_serializing_if = "Extra::is_empty")]
    pub extra: Extra,
}

impl LogRecord {
    /// Create a record stamped with the current time and an unresolved call site
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        let site = CallSite::unresolved();
        Self {
            level,
            timestamp: micros_timestamp(Utc::now()),
            source_file: site.file,
            source_line: site.line,
            message: message.into(),
            func_path: site.func_path,
            method_path: site.method_path,
            package_path: site.package_path,
            host_name: String::new(),
            extra: Extra::new(),
        }
    }

    /// Builder-style method for setting the call site
    pub fn at(mut self, site: CallSite) -> Self {
        self.source_file = site.file;
        self.source_line = site.line;
        self.func_path = site.func_path;
        self.method_path = site.method_path;
        self.package_path = site.package_path;
        self
    }

    /// Builder-style method for setting the host name
    pub fn with_host_name(mut self, host_name: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self
    }

    /// Builder-style method for attaching extra fields
    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = extra;
        self
    }

    /// Builder-style method for overriding the timestamp (truncated to microseconds)
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = micros_timestamp(timestamp);
        self
    }
}

/// Drop sub-microsecond precision; some collectors reject nanoseconds
pub fn micros_timestamp(t: DateTime<Utc>) -> DateTime<Utc> {
    t.trunc_subsecs(6)
}

/// RFC 3339 with exactly six fractional digits, `Z` suffix
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn serialize_timestamp<S: Serializer>(t: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(t))
}
