//! LoggingBlueprint - Config Loader output
//!
//! Describes the full logging configuration: one filter per registry entry,
//! each naming a destination, a threshold, a format and granular overrides.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Filter (registry entry) definitions
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

impl LoggingBlueprint {
    /// Filters that should be turned into registry entries
    pub fn enabled_filters(&self) -> impl Iterator<Item = &FilterConfig> {
        self.filters.iter().filter(|filter| filter.enabled)
    }
}

/// One destination with its threshold, format and overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Free-form label, informational only
    #[serde(default)]
    pub tag: String,

    /// Disabled filters are skipped at load time
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Destination type
    #[serde(rename = "type")]
    pub destination_type: DestinationType,

    /// Default threshold, as a long level name
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format (pattern when omitted)
    #[serde(default)]
    pub format: Option<FormatConfig>,

    /// Per call-site threshold overrides
    #[serde(default)]
    pub granulars: Vec<GranularConfig>,

    /// Destination-specific parameters
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

fn default_level() -> String {
    "NONE".to_string()
}

impl FilterConfig {
    /// Pattern for the pattern formatter.
    ///
    /// An explicit `format.pattern` wins over the legacy `format` property;
    /// an empty result means "message only".
    pub fn pattern(&self) -> &str {
        self.format
            .as_ref()
            .and_then(|format| format.pattern.as_deref())
            .or_else(|| self.properties.get("format").map(String::as_str))
            .unwrap_or("")
    }

    /// Selected formatter kind
    pub fn format_kind(&self) -> FormatKind {
        self.format
            .as_ref()
            .map(|format| format.name)
            .unwrap_or_default()
    }

    /// Display label for diagnostics
    pub fn label(&self) -> &str {
        if self.tag.is_empty() {
            self.destination_type.as_str()
        } else {
            &self.tag
        }
    }
}

/// Destination type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationType {
    /// Standard output / error
    Console,
    /// Append-only file
    File,
    /// Datagram or stream socket
    Socket,
}

impl DestinationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::File => "file",
            Self::Socket => "socket",
        }
    }
}

/// Output format selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Formatter kind
    #[serde(default)]
    pub name: FormatKind,

    /// Pattern string (pattern formatter only)
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Formatter kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// `%`-directive pattern
    #[default]
    Pattern,
    /// One JSON object per record
    Json,
}

/// Threshold override for one function, method or module path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GranularConfig {
    /// Long level name
    pub level: String,

    /// Exact function, method or module path
    pub path: String,
}
